use rand::Rng;
use serde::{Deserialize, Serialize};

use super::register::RegisterConfiguration;
use crate::error::{BaryogenesisError, Result};

/// Probabilities at or below this are floating-point residue of an exact zero
/// (e.g. `cos(pi/2)^2`) and are dropped before sampling.
pub const PROBABILITY_FLOOR: f64 = 1e-12;

/// Allowed drift of the summed probabilities away from 1.0
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// A single weighted draw over register configurations.
#[derive(Debug, Clone, Serialize)]
pub struct ProbabilisticOperation {
    pub description: String,
    pub outcomes: Vec<OperationOutcome>,
    #[serde(skip)]
    cumulative: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub label: String,
    pub probability: f64,
    pub value: RegisterConfiguration,
}

impl ProbabilisticOperation {
    /// Builds the operation from `(configuration, probability)` pairs.
    /// Negligible outcomes are pruned; the rest must sum to 1.
    pub fn from_distribution<I>(description: &str, distribution: I) -> Result<Self>
    where
        I: IntoIterator<Item = (RegisterConfiguration, f64)>,
    {
        let labelled = distribution
            .into_iter()
            .map(|(config, p)| (config.to_bitstring(), config, p));
        Self::from_labelled(description, labelled)
    }

    pub fn from_labelled<I>(description: &str, outcomes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, RegisterConfiguration, f64)>,
    {
        let mut kept = Vec::new();
        let mut total = 0.0;
        for (label, value, probability) in outcomes {
            if !probability.is_finite() || probability < -PROBABILITY_FLOOR {
                return Err(BaryogenesisError::invalid_parameter(
                    "probability",
                    format!("outcome {} has probability {}", label, probability),
                ));
            }
            total += probability.max(0.0);
            if probability > PROBABILITY_FLOOR {
                kept.push(OperationOutcome { label, probability, value });
            }
        }
        if kept.is_empty() || (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
            return Err(BaryogenesisError::invalid_parameter(
                "probability",
                format!("outcome probabilities of {:?} sum to {}", description, total),
            ));
        }

        let mut running = 0.0;
        let cumulative = kept
            .iter()
            .map(|o| {
                running += o.probability;
                running
            })
            .collect();

        Ok(Self {
            description: description.to_string(),
            outcomes: kept,
            cumulative,
        })
    }

    /// Probability assigned to `config` after pruning
    pub fn probability_of(&self, config: RegisterConfiguration) -> f64 {
        self.outcomes
            .iter()
            .filter(|o| o.value == config)
            .map(|o| o.probability)
            .sum()
    }

    pub fn execute<R: Rng + ?Sized>(&self, rng: &mut R) -> &OperationOutcome {
        let total = self.cumulative.last().copied().unwrap_or(1.0);
        let random = rng.gen_range(0.0..total);
        // Strict comparison so a zero-width outcome can never be hit by random == 0.0
        let index = self.cumulative.partition_point(|&c| c <= random);
        // Summation drift can leave `random` past the last boundary
        &self.outcomes[index.min(self.outcomes.len() - 1)]
    }
}
