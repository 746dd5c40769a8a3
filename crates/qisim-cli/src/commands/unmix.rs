//! Unmix command implementation.

use anyhow::Result;
use console::style;
use serde::Deserialize;

use qisim_hal::Counts;
use qisim_mitigation::{
    AssignmentMatrix, CorrectedDistribution, MitigationError, correct_probabilities,
    expectation_z, probabilities_from_counts,
};

use super::common::{read_json, write_json};

/// Observed outcomes: a probability vector or a counts map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Observed {
    /// Probabilities indexed by basis state.
    Probabilities(Vec<f64>),
    /// Counts keyed by bitstring.
    Counts(Counts),
}

impl Observed {
    /// Probability vector over `num_bits` bits.
    pub fn into_probabilities(self, num_bits: usize) -> Result<Vec<f64>> {
        match self {
            Observed::Probabilities(probabilities) => Ok(probabilities),
            Observed::Counts(counts) => Ok(probabilities_from_counts(&counts, num_bits)?),
        }
    }
}

/// Summary line; a stopped solver is never reported as corrected.
fn correction_header(corrected: &CorrectedDistribution) -> String {
    if corrected.converged {
        format!(
            "{} Corrected ({} iterations, residual {:.3e}):",
            style("✓").green().bold(),
            corrected.iterations,
            corrected.residual
        )
    } else {
        format!(
            "{} Not converged, last estimate ({} iterations, residual {:.3e}):",
            style("✗").red().bold(),
            corrected.iterations,
            corrected.residual
        )
    }
}

/// Execute the unmix command.
pub fn execute(
    matrix: &str,
    probs: &str,
    observables: &[String],
    output: Option<&str>,
) -> Result<()> {
    let assignment: AssignmentMatrix = read_json(matrix)?;
    let observed = read_json::<Observed>(probs)?.into_probabilities(assignment.num_qubits())?;

    println!(
        "{} Correcting {} outcome probabilities",
        style("→").cyan().bold(),
        observed.len()
    );

    let corrected = match correct_probabilities(&observed, &assignment) {
        Ok(corrected) => corrected,
        Err(MitigationError::Convergence {
            iterations,
            estimate,
        }) => {
            eprintln!(
                "{} solver stopped after {iterations} iterations; reporting last estimate",
                style("Warning:").yellow().bold()
            );
            estimate
        }
        Err(e) => return Err(e.into()),
    };

    let width = assignment.num_qubits();
    println!("\n{}", correction_header(&corrected));
    for (index, (raw, fixed)) in observed.iter().zip(&corrected.probabilities).enumerate() {
        println!(
            "  {}: {:>8.5} → {:>8.5}",
            style(qisim_hal::format_bitstring(index, width)).cyan(),
            raw,
            fixed
        );
    }

    for observable in observables {
        let before = expectation_z(&observed, observable)?;
        let after = expectation_z(&corrected.probabilities, observable)?;
        println!(
            "  ⟨{}⟩: {before:+.5} → {}",
            style(observable).cyan(),
            style(format!("{after:+.5}")).yellow()
        );
    }

    if let Some(path) = output {
        write_json(path, &corrected)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution(converged: bool) -> CorrectedDistribution {
        CorrectedDistribution {
            probabilities: vec![0.5, 0.5],
            iterations: 3,
            residual: 0.1,
            converged,
        }
    }

    #[test]
    fn test_header_marks_unconverged_estimate() {
        let header = correction_header(&distribution(false));
        assert!(header.contains("Not converged"));
        assert!(!header.contains("Corrected"));

        let header = correction_header(&distribution(true));
        assert!(header.contains("Corrected"));
        assert!(!header.contains("Not converged"));
    }

    #[test]
    fn test_observed_formats() {
        let probabilities: Observed = serde_json::from_str("[0.25, 0.75]").unwrap();
        assert_eq!(probabilities.into_probabilities(1).unwrap(), vec![0.25, 0.75]);

        let counts: Observed = serde_json::from_str(r#"{"0": 1, "1": 3}"#).unwrap();
        assert_eq!(counts.into_probabilities(1).unwrap(), vec![0.25, 0.75]);
    }
}
