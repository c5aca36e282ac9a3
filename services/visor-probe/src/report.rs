//! Plain-text rendering of probe results.

use std::fmt::Write;

use data_access::CacheStats;
use field_combiner::{FieldSummary, WindGlyph};
use projection::Extent;
use visor_state::{Selection, SessionSeries};

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn format_selection(selection: &Selection, instances: &[String], variables: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "domain:    {}", or_dash(selection.domain()));
    let _ = writeln!(out, "instance:  {}", or_dash(selection.instance()));
    let _ = writeln!(out, "variable:  {}", or_dash(selection.variable()));
    let _ = writeln!(out, "frame:     {}", selection.frame());
    let _ = writeln!(out, "level:     {}", selection.level());
    let _ = writeln!(out, "instances: [{}]", instances.join(", "));
    let _ = write!(out, "variables: [{}]", variables.join(", "));
    out
}

pub fn format_summary(frame: usize, level: usize, summary: Option<&FieldSummary>) -> String {
    match summary {
        Some(s) => format!(
            "frame {} level {}: min {:.4} max {:.4} mean {:.4} over {} cells",
            frame, level, s.min, s.max, s.mean, s.count
        ),
        None => format!("frame {} level {}: no finite values", frame, level),
    }
}

/// One line per time step: timestamp (or step index), total, then each
/// project bucket.
pub fn format_series(series: &SessionSeries) -> String {
    let mut out = String::new();
    let _ = write!(out, "node ({:.4}, {:.4})\nstep", series.lon, series.lat);
    let _ = write!(out, "\ttotal");
    for project in &series.series.projects {
        let label = if project.project.is_empty() {
            "(none)"
        } else {
            project.project.as_str()
        };
        let _ = write!(out, "\t{}", label);
    }

    for t in 0..series.series.len() {
        let step = match series.times.get(t) {
            Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
            None => t.to_string(),
        };
        let _ = write!(out, "\n{}\t{:.4}", step, series.series.total[t]);
        for project in &series.series.projects {
            let _ = write!(out, "\t{:.4}", project.values[t]);
        }
    }
    out
}

pub fn format_extent(extent: &Extent) -> String {
    format!(
        "lon [{:.4}, {:.4}] lat [{:.4}, {:.4}]",
        extent.min_lon, extent.max_lon, extent.min_lat, extent.max_lat
    )
}

pub fn format_wind(glyphs: &[WindGlyph]) -> String {
    if glyphs.is_empty() {
        return "no wind glyphs".to_string();
    }
    let strongest = glyphs.iter().map(|g| g.magnitude).fold(0.0, f64::max);
    format!("{} glyphs, strongest {:.2} m/s", glyphs.len(), strongest)
}

pub fn format_stats(stats: &CacheStats) -> String {
    format!(
        "cache: {} entries ({} negative), {} hits, {} misses, {} coalesced, {} evictions, hit rate {:.1}%",
        stats.entries,
        stats.negative_entries,
        stats.hits,
        stats.misses,
        stats.coalesced,
        stats.evictions,
        stats.hit_rate()
    )
}
