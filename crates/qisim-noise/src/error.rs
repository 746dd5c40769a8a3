//! Error types for calibration loading and channel synthesis.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading calibration data or building noise channels.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NoiseError {
    /// Parameter file could not be read.
    #[error("Failed to read parameter file {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON parameter document.
    #[error("Invalid JSON parameter document: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML parameter document.
    #[error("Invalid YAML parameter document: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Named backend is missing from a multi-backend parameter file.
    #[error("Backend '{name}' not found in parameter file (available: {})", available.join(", "))]
    UnknownBackend {
        /// Requested backend name.
        name: String,
        /// Backends present in the file.
        available: Vec<String>,
    },

    /// Malformed or physically inconsistent calibration input.
    #[error("Invalid calibration parameter '{parameter}'{}: {reason}", format_qubit_context(.qubit))]
    Validation {
        /// Parameter name as it appears in the calibration data.
        parameter: String,
        /// Qubit label or pair the parameter belongs to, if any.
        qubit: Option<String>,
        /// What is wrong with the value.
        reason: String,
    },

    /// Channel formula evaluated outside its physical domain.
    #[error("Parameter '{parameter}' outside channel domain: {reason}")]
    Domain {
        /// Offending argument.
        parameter: &'static str,
        /// Constraint that was violated.
        reason: String,
    },

    /// A synthesized channel failed its completeness or normalization check.
    #[error("Channel '{channel}' is not a valid quantum channel: {reason}")]
    ModelConstruction {
        /// Channel being built.
        channel: String,
        /// Failed check.
        reason: String,
    },
}

impl NoiseError {
    /// Shorthand for a [`NoiseError::Validation`] error.
    pub fn validation(
        parameter: impl Into<String>,
        qubit: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        NoiseError::Validation {
            parameter: parameter.into(),
            qubit: qubit.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`NoiseError::ModelConstruction`] error.
    pub fn construction(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        NoiseError::ModelConstruction {
            channel: channel.into(),
            reason: reason.into(),
        }
    }
}

#[allow(clippy::ref_option)]
fn format_qubit_context(qubit: &Option<String>) -> String {
    match qubit {
        Some(label) => format!(" (qubit {label})"),
        None => String::new(),
    }
}

/// Result type for noise operations.
pub type NoiseResult<T> = Result<T, NoiseError>;
