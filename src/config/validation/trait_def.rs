//! Validation trait definition

/// Checked once at startup for every configuration section
///
/// Errors are human-readable and name the offending setting.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
