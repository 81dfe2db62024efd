use crate::error::ConvertError;
use serde::{Deserialize, Serialize};

/// Per-conversion defaults and switches.
///
/// The six numeric defaults and `highlight_incomplete` have no serde default:
/// a configuration file must name all of them. Lengths are meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversionConfig {
    pub default_invert_elevation: f64,
    pub default_shaft_diameter: f64,
    pub default_shaft_height: f64,
    pub default_wall_thickness: f64,
    pub default_bottom_thickness: f64,
    pub default_pipe_wall_thickness: f64,
    pub highlight_incomplete: bool,
    /// Grade pipe runs red when an endpoint falls outside its connected shaft.
    #[serde(default)]
    pub validate_pipe_endpoints: bool,
    #[serde(default = "enabled")]
    pub shaft_centroid_fallback: bool,
    #[serde(default = "enabled")]
    pub clamp_interpolated_elevation: bool,
    #[serde(default)]
    pub cut_pipe_openings: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_invert_elevation: 100.0,
            default_shaft_diameter: 0.8,
            default_shaft_height: 0.8,
            default_wall_thickness: 0.04,
            default_bottom_thickness: 0.02,
            default_pipe_wall_thickness: 0.02,
            highlight_incomplete: false,
            validate_pipe_endpoints: false,
            shaft_centroid_fallback: true,
            clamp_interpolated_elevation: true,
            cut_pipe_openings: false,
        }
    }
}

impl ConversionConfig {
    pub fn validate(&self) -> Result<(), ConvertError> {
        if !self.default_invert_elevation.is_finite() {
            return Err(ConvertError::InvalidConfig(format!(
                "default_invert_elevation must be finite, got {}",
                self.default_invert_elevation
            )));
        }
        let lengths = [
            ("default_shaft_diameter", self.default_shaft_diameter),
            ("default_shaft_height", self.default_shaft_height),
            ("default_wall_thickness", self.default_wall_thickness),
            ("default_bottom_thickness", self.default_bottom_thickness),
            ("default_pipe_wall_thickness", self.default_pipe_wall_thickness),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(ConvertError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative length, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn default_shaft_diameter_mm(&self) -> f64 {
        self.default_shaft_diameter * 1000.0
    }

    pub fn default_shaft_height_mm(&self) -> f64 {
        self.default_shaft_height * 1000.0
    }

    /// Invert elevation actually used for geometry: a surveyed nonzero value,
    /// otherwise the configured default.
    pub fn effective_invert(&self, surveyed: Option<f64>) -> f64 {
        match surveyed {
            Some(z) if z != 0.0 && z.is_finite() => z,
            _ => self.default_invert_elevation,
        }
    }

    /// True when an invert elevation carries no survey information: absent,
    /// zero, or equal to the configured default.
    pub fn is_missing_invert(&self, surveyed: Option<f64>) -> bool {
        match surveyed {
            Some(z) => z == 0.0 || !z.is_finite() || z == self.default_invert_elevation,
            None => true,
        }
    }
}
