//! Reduction of trial outcomes into the baryon asymmetry and a conservation report.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{BaryogenesisError, Result};
use crate::quantum::{Classification, ConservationRule, RegisterConfiguration, TrialOutcomeSet};

/// A sampled configuration outside both valid terminal patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub configuration: RegisterConfiguration,
    pub count: u64,
    pub rules: Vec<ConservationRule>,
}

/// Raw per-class counts. Always computable, even when the asymmetry is not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub n_q: u64,
    pub n_qbar: u64,
    pub total_shots: u64,
    pub violations: Vec<Violation>,
}

fn checked_total<I: IntoIterator<Item = u64>>(counts: I) -> Result<u64> {
    counts.into_iter().try_fold(0u64, |acc, n| {
        acc.checked_add(n).ok_or_else(|| {
            BaryogenesisError::invalid_parameter("counts", "shot counts overflow a 64-bit total")
        })
    })
}

impl Tally {
    pub fn valid_shots(&self) -> Result<u64> {
        checked_total([self.n_q, self.n_qbar])
    }

    pub fn violating_shots(&self) -> Result<u64> {
        checked_total(self.violations.iter().map(|v| v.count))
    }

    /// `(N_q - N_qbar) / (N_q + N_qbar)`; `DegenerateSample` when both are zero.
    pub fn asymmetry(&self) -> Result<f64> {
        let valid = self.valid_shots()?;
        if valid == 0 {
            return Err(BaryogenesisError::DegenerateSample {
                total_shots: self.total_shots,
                violating_shots: self.violating_shots()?,
            });
        }
        Ok((self.n_q as f64 - self.n_qbar as f64) / valid as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsymmetryReport {
    pub n_q: u64,
    pub n_qbar: u64,
    pub asymmetry: f64,
    /// Binomial standard error, `sqrt((1 - A^2) / (N_q + N_qbar))`
    pub standard_error: f64,
    pub matter_fraction: f64,
    pub total_shots: u64,
    pub violations: Vec<Violation>,
}

impl AsymmetryReport {
    pub fn conserves(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violating_shots(&self) -> Result<u64> {
        checked_total(self.violations.iter().map(|v| v.count))
    }

    pub fn deviation_from(&self, expected: f64) -> f64 {
        (self.asymmetry - expected).abs()
    }

    pub fn within_tolerance(&self, expected: f64, tolerance: f64) -> bool {
        self.deviation_from(expected) <= tolerance
    }

    /// Turns a non-empty violation list into `ConservationViolation`.
    pub fn require_conservation(&self) -> Result<()> {
        if self.conserves() {
            return Ok(());
        }
        Err(BaryogenesisError::ConservationViolation {
            configurations: self.violations.len(),
            shots: self.violating_shots()?,
        })
    }
}

/// Expected asymmetry for a decay with CP-violation parameter `epsilon`:
/// `(1+e)/2 - (1-e)/2 = e`.
pub fn expected_asymmetry(epsilon: f64) -> f64 {
    epsilon
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer;

impl Analyzer {
    pub fn tally(outcomes: &TrialOutcomeSet) -> Tally {
        let mut tally = Tally {
            total_shots: outcomes.total_shots(),
            ..Tally::default()
        };
        for (configuration, count) in outcomes.iter() {
            // Bounded by the outcome set's checked total
            match configuration.classify() {
                Classification::Matter => tally.n_q += count,
                Classification::Antimatter => tally.n_qbar += count,
                Classification::Violation => tally.violations.push(Violation {
                    configuration,
                    count,
                    rules: configuration.broken_rules(),
                }),
            }
        }
        for violation in &tally.violations {
            warn!(
                "conservation violated by {} ({} shots): {}",
                violation.configuration,
                violation.count,
                violation
                    .rules
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        tally
    }

    pub fn analyze(outcomes: &TrialOutcomeSet) -> Result<AsymmetryReport> {
        let tally = Self::tally(outcomes);
        let asymmetry = tally.asymmetry()?;
        let valid = tally.valid_shots()? as f64;
        let standard_error = ((1.0 - asymmetry * asymmetry).max(0.0) / valid).sqrt();
        debug!(
            "N_q={} N_qbar={} asymmetry={:.6} +/- {:.6}",
            tally.n_q, tally.n_qbar, asymmetry, standard_error
        );
        Ok(AsymmetryReport {
            n_q: tally.n_q,
            n_qbar: tally.n_qbar,
            asymmetry,
            standard_error,
            matter_fraction: tally.n_q as f64 / valid,
            total_shots: tally.total_shots,
            violations: tally.violations,
        })
    }
}
