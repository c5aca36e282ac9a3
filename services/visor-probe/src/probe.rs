//! Probe commands run against a session.

use anyhow::{anyhow, bail, Context, Result};
use field_combiner::FieldSummary;
use tracing::info;
use visor_state::VisorSession;

use crate::report::{format_extent, format_selection, format_series, format_summary, format_wind};

/// Selection requested on the command line; unset parts keep the session's
/// start-up choice.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub domain: Option<String>,
    pub instance: Option<String>,
    pub variable: Option<String>,
}

/// Drive the cascade to `target`, one link at a time.
pub async fn select(session: &VisorSession, target: &Target) {
    if let Some(domain) = &target.domain {
        session.set_domain(domain).await;
    }
    if let Some(instance) = &target.instance {
        session.set_instance(instance).await;
    }
    if let Some(variable) = &target.variable {
        session.set_variable(variable).await;
    }
    let selection = session.selection().await;
    info!(
        domain = ?selection.domain(),
        instance = ?selection.instance(),
        variable = ?selection.variable(),
        "Selection settled"
    );
}

pub async fn browse_report(session: &VisorSession) -> String {
    format_selection(
        &session.selection().await,
        &session.instances().await,
        &session.variables().await,
    )
}

pub async fn field_report(session: &VisorSession, frame: usize, level: usize) -> Result<String> {
    session.set_frame(frame).await;
    session.set_level(level).await;
    let field = session
        .current_field()
        .await
        .context("combining the current field")?
        .ok_or_else(|| anyhow!("no data loaded for the current selection"))?;
    Ok(format_summary(frame, level, FieldSummary::of(&field).as_ref()))
}

/// Series at `(lon, lat)`, or at the context's default point.
pub async fn series_report(
    session: &VisorSession,
    lon: Option<f64>,
    lat: Option<f64>,
) -> Result<String> {
    let (lon, lat) = match (lon, lat, session.default_point()) {
        (Some(lon), Some(lat), _) => (lon, lat),
        (None, None, Some(point)) => point,
        (None, None, None) => bail!("no point given and the context offers no default"),
        _ => bail!("--lon and --lat must be given together"),
    };
    let series = session
        .point_series(lon, lat)
        .await
        .context("sampling the point series")?
        .ok_or_else(|| anyhow!("no data loaded for the current selection"))?;
    Ok(format_series(&series))
}

pub async fn outline_report(session: &VisorSession) -> Result<String> {
    let outline = session
        .domain_outline()
        .await
        .ok_or_else(|| anyhow!("no outline variable available for the current domain"))?;
    Ok(format!(
        "{} border nodes, {}",
        outline.ring.len(),
        format_extent(&outline.extent)
    ))
}

pub async fn wind_report(session: &VisorSession) -> Result<String> {
    let glyphs = session
        .wind_glyphs()
        .await
        .context("deriving wind glyphs")?
        .unwrap_or_default();
    Ok(format_wind(&glyphs))
}
