//! Session defaults.

use field_combiner::DEFAULT_MAX_SPEED;
use serde::{Deserialize, Serialize};

/// Start-up selection and auxiliary variable names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Variable selected at start-up when the context names none.
    pub default_variable: String,

    /// Instance selected at start-up when listed; otherwise the latest.
    pub default_instance: Option<String>,

    /// Eastward wind component.
    pub wind_u_variable: String,

    /// Northward wind component.
    pub wind_v_variable: String,

    /// Speed in m/s at which wind glyphs reach full size.
    pub wind_max_speed: f64,

    /// Take the full-size speed from the components' `vmax` attributes
    /// instead of `wind_max_speed`.
    pub wind_speed_from_vmax: bool,

    /// Substring locating the variable whose grid outlines the domain.
    pub outline_hint: String,

    /// Level sampled by point series.
    pub series_level: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_variable: "mp10_hd_species".to_string(),
            default_instance: None,
            wind_u_variable: "mp10_ld_u10".to_string(),
            wind_v_variable: "mp10_ld_v10".to_string(),
            wind_max_speed: DEFAULT_MAX_SPEED,
            wind_speed_from_vmax: false,
            outline_hint: "lon".to_string(),
            series_level: 0,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("VISOR_DEFAULT_VARIABLE") {
            config.default_variable = val;
        }

        if let Ok(val) = std::env::var("VISOR_DEFAULT_INSTANCE") {
            if !val.is_empty() {
                config.default_instance = Some(val);
            }
        }

        if let Ok(val) = std::env::var("VISOR_WIND_U") {
            config.wind_u_variable = val;
        }

        if let Ok(val) = std::env::var("VISOR_WIND_V") {
            config.wind_v_variable = val;
        }

        if let Ok(val) = std::env::var("VISOR_WIND_MAX_SPEED") {
            if let Ok(speed) = val.parse() {
                config.wind_max_speed = speed;
            }
        }

        if let Ok(val) = std::env::var("VISOR_WIND_SPEED_FROM_VMAX") {
            config.wind_speed_from_vmax = val.parse().unwrap_or(false);
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_variable.is_empty() {
            return Err("default_variable must not be empty".to_string());
        }
        if self.wind_u_variable.is_empty() || self.wind_v_variable.is_empty() {
            return Err("wind component variables must not be empty".to_string());
        }
        if !(self.wind_max_speed.is_finite() && self.wind_max_speed > 0.0) {
            return Err("wind_max_speed must be a positive speed".to_string());
        }
        if self.outline_hint.is_empty() {
            return Err("outline_hint must not be empty".to_string());
        }
        Ok(())
    }
}
