//! Backend parameter files.
//!
//! A parameter file describes one or more processors. Each record carries the
//! per-qubit calibration, the two-qubit gate errors, timing constants and the
//! processor description (native operations, coupling map, register size and
//! shot limits). Files are JSON or YAML; either a single record or a map from
//! backend name to record is accepted.
//!
//! ```json
//! {
//!   "Tuna-5": {
//!     "Qubits": { "Q0": { "Frequency [Hz]": 5.0e9, "T1 [s]": 2.0e-5, "T2 [s]": 1.5e-5,
//!                          "RB error": 0.001, "SSRO": {"p1given0": 0.02, "p0given1": 0.05} } },
//!     "CZ IRB errors": {},
//!     "Base temperature [K]": 0.02,
//!     "Delay duration [s]": 1.0e-6,
//!     "Measurement duration [s]": 2.0e-6,
//!     "Native operations": ["x", "ry", "cz", "measure"],
//!     "Coupling map": [],
//!     "Qubit register": 1,
//!     "Default shots": 1024,
//!     "Max shots": 4096
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NoiseError, NoiseResult};

/// Readout (single-shot readout) error rates of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SsroParameters {
    /// Probability of declaring 1 when 0 was prepared.
    #[serde(rename = "p1given0")]
    pub p1_given_0: f64,
    /// Probability of declaring 0 when 1 was prepared.
    #[serde(rename = "p0given1")]
    pub p0_given_1: f64,
}

/// Calibration record of one qubit as stored in the parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QubitParameters {
    /// Qubit transition frequency.
    #[serde(rename = "Frequency [Hz]")]
    pub frequency_hz: f64,
    /// Energy relaxation time.
    #[serde(rename = "T1 [s]")]
    pub t1_s: f64,
    /// Coherence time.
    #[serde(rename = "T2 [s]")]
    pub t2_s: f64,
    /// Average error per Clifford from randomized benchmarking.
    #[serde(rename = "RB error")]
    pub rb_error: f64,
    /// Readout error rates.
    #[serde(rename = "SSRO")]
    pub ssro: SsroParameters,
}

/// One backend record of a parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendParameters {
    /// Per-qubit calibration keyed by qubit label.
    #[serde(rename = "Qubits")]
    pub qubits: BTreeMap<String, QubitParameters>,
    /// Interleaved RB errors of CZ gates keyed by `"(i, j)"` physical pairs.
    #[serde(rename = "CZ IRB errors", default)]
    pub cz_irb_errors: BTreeMap<String, f64>,
    /// Cryostat base temperature.
    #[serde(rename = "Base temperature [K]")]
    pub base_temperature_k: f64,
    /// Duration of one delay unit.
    #[serde(rename = "Delay duration [s]")]
    pub delay_duration_s: f64,
    /// Duration of a measurement.
    #[serde(rename = "Measurement duration [s]")]
    pub measurement_duration_s: f64,
    /// Operation names accepted by the processor.
    #[serde(rename = "Native operations", default)]
    pub native_operations: Vec<String>,
    /// Coupled physical qubit pairs.
    #[serde(rename = "Coupling map", default)]
    pub coupling_map: Vec<[u32; 2]>,
    /// Size of the qubit register.
    #[serde(rename = "Qubit register")]
    pub qubit_register: u32,
    /// Shots used when a run does not request a count.
    #[serde(rename = "Default shots")]
    pub default_shots: u32,
    /// Largest shot count accepted per run.
    #[serde(rename = "Max shots")]
    pub max_shots: u32,
    /// Explicit label to physical index layout.
    #[serde(rename = "Layout", default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<BTreeMap<String, u32>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterDocument {
    Single(Box<BackendParameters>),
    Named(BTreeMap<String, BackendParameters>),
}

/// Supported parameter file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl ParameterFormat {
    /// Pick the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => ParameterFormat::Yaml,
            _ => ParameterFormat::Json,
        }
    }
}

impl BackendParameters {
    /// Parse a parameter document and select one backend record.
    ///
    /// With a multi-backend document, `backend` must name a record unless the
    /// document holds exactly one. A single-record document ignores `backend`.
    pub fn parse(text: &str, format: ParameterFormat, backend: Option<&str>) -> NoiseResult<Self> {
        let document: ParameterDocument = match format {
            ParameterFormat::Json => serde_json::from_str(text)?,
            ParameterFormat::Yaml => serde_yaml_ng::from_str(text)?,
        };

        match document {
            ParameterDocument::Single(params) => Ok(*params),
            ParameterDocument::Named(mut backends) => {
                let available: Vec<String> = backends.keys().cloned().collect();
                let name = match backend {
                    Some(name) => name.to_string(),
                    None if backends.len() == 1 => available[0].clone(),
                    None => {
                        return Err(NoiseError::UnknownBackend {
                            name: String::new(),
                            available,
                        });
                    }
                };
                backends
                    .remove(&name)
                    .ok_or(NoiseError::UnknownBackend { name, available })
            }
        }
    }

    /// Parse a JSON parameter document.
    pub fn from_json_str(text: &str, backend: Option<&str>) -> NoiseResult<Self> {
        Self::parse(text, ParameterFormat::Json, backend)
    }

    /// Parse a YAML parameter document.
    pub fn from_yaml_str(text: &str, backend: Option<&str>) -> NoiseResult<Self> {
        Self::parse(text, ParameterFormat::Yaml, backend)
    }

    /// Load a parameter file, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>, backend: Option<&str>) -> NoiseResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| NoiseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), backend = ?backend, "Loading backend parameters");
        Self::parse(&text, ParameterFormat::from_path(path), backend)
    }

    /// Parsed `"CZ IRB errors"` entries as physical index pairs.
    pub fn cz_pairs(&self) -> NoiseResult<Vec<((u32, u32), f64)>> {
        self.cz_irb_errors
            .iter()
            .map(|(key, &error)| Ok((parse_pair_key(key)?, error)))
            .collect()
    }
}

/// Parse a pair key of the form `"(i, j)"`, `"(i,j)"` or `"i,j"`.
pub fn parse_pair_key(key: &str) -> NoiseResult<(u32, u32)> {
    let invalid = || {
        NoiseError::validation(
            "CZ IRB errors",
            Some(key),
            "pair key must look like \"(i, j)\" with integer qubit indices",
        )
    };
    let trimmed = key.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);
    let mut parts = inner.split(',').map(str::trim);
    let a = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let b = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "Qubits": {
            "Q0": {"Frequency [Hz]": 5.0e9, "T1 [s]": 2.0e-5, "T2 [s]": 1.5e-5,
                   "RB error": 0.001, "SSRO": {"p1given0": 0.02, "p0given1": 0.05}}
        },
        "CZ IRB errors": {"(0, 1)": 0.02},
        "Base temperature [K]": 0.02,
        "Delay duration [s]": 1.0e-6,
        "Measurement duration [s]": 2.0e-6,
        "Native operations": ["x", "cz", "measure"],
        "Coupling map": [[0, 1]],
        "Qubit register": 2,
        "Default shots": 1024,
        "Max shots": 4096
    }"#;

    #[test]
    fn test_single_record() {
        let params = BackendParameters::from_json_str(RECORD, None).unwrap();
        assert_eq!(params.qubits["Q0"].ssro.p0_given_1, 0.05);
        assert_eq!(params.coupling_map, vec![[0, 1]]);
        assert!(params.layout.is_none());
        assert_eq!(params.cz_pairs().unwrap(), vec![((0, 1), 0.02)]);
    }

    #[test]
    fn test_named_records() {
        let doc = format!("{{\"Tuna-5\": {RECORD}, \"Spin-2\": {RECORD}}}");
        let params = BackendParameters::from_json_str(&doc, Some("Spin-2")).unwrap();
        assert_eq!(params.max_shots, 4096);

        let err = BackendParameters::from_json_str(&doc, Some("Starmon-7")).unwrap_err();
        match err {
            NoiseError::UnknownBackend { name, available } => {
                assert_eq!(name, "Starmon-7");
                assert_eq!(available, vec!["Spin-2", "Tuna-5"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(BackendParameters::from_json_str(&doc, None).is_err());
    }

    #[test]
    fn test_yaml_record() {
        let json: serde_json::Value = serde_json::from_str(RECORD).unwrap();
        let yaml = serde_yaml_ng::to_string(&json).unwrap();
        let params = BackendParameters::from_yaml_str(&yaml, None).unwrap();
        assert_eq!(params.qubit_register, 2);
    }

    #[test]
    fn test_pair_keys() {
        assert_eq!(parse_pair_key("(2, 3)").unwrap(), (2, 3));
        assert_eq!(parse_pair_key("(2,3)").unwrap(), (2, 3));
        assert_eq!(parse_pair_key("4,1").unwrap(), (4, 1));
        assert!(parse_pair_key("(a, b)").is_err());
        assert!(parse_pair_key("(1, 2, 3)").is_err());
        assert!(parse_pair_key("(1)").is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ParameterFormat::from_path(Path::new("p.yml")), ParameterFormat::Yaml);
        assert_eq!(ParameterFormat::from_path(Path::new("p.json")), ParameterFormat::Json);
        assert_eq!(ParameterFormat::from_path(Path::new("params")), ParameterFormat::Json);
    }
}
