//! Shared types for the XTF to IFC conversion: geometry helpers, the survey
//! entity model, conversion configuration, the error taxonomy, report types
//! and the model normalizer.

pub mod config;
pub mod error;
pub mod geom;
pub mod model;
pub mod normalize;
pub mod report;

pub use config::ConversionConfig;
pub use error::{ConvertError, Result};
