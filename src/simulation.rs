//! Initializer -> decay -> executor -> analyzer, for one value of epsilon or a sweep.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{expected_asymmetry, Analyzer, AsymmetryReport};
use crate::config::{SimulationConfig, DEFAULT_TOLERANCE};
use crate::error::{BaryogenesisError, Result};
use crate::execution::Executor;
use crate::quantum::{Circuit, DecayOperator, TrialOutcomeSet};

pub struct Simulation {
    operator: DecayOperator,
    shots: u64,
    tolerance: f64,
    executor: Box<dyn Executor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub epsilon: f64,
    pub shots: u64,
    pub executor: String,
    pub expected_asymmetry: f64,
    pub tolerance: f64,
    pub within_tolerance: bool,
    #[serde(flatten)]
    pub result: AsymmetryReport,
}

impl Simulation {
    /// Validates `epsilon` and `shots` before anything is sampled.
    pub fn new(epsilon: f64, shots: u64, executor: Box<dyn Executor>) -> Result<Self> {
        let operator = DecayOperator::new(epsilon)?;
        if shots == 0 {
            return Err(BaryogenesisError::invalid_parameter("shots", "shot count must be positive"));
        }
        Ok(Self {
            operator,
            shots,
            tolerance: DEFAULT_TOLERANCE,
            executor,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let executor = config.executor.build(config.sharding());
        Ok(Self::new(config.epsilon, config.shots, executor)?.with_tolerance(config.tolerance))
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn operator(&self) -> &DecayOperator {
        &self.operator
    }

    pub fn program(&self) -> Result<Circuit> {
        self.operator.program()
    }

    pub fn sample(&self) -> Result<TrialOutcomeSet> {
        let outcomes = self.executor.run(&self.program()?, self.shots)?;
        if outcomes.total_shots() != self.shots {
            return Err(BaryogenesisError::ShotCountMismatch {
                executor: self.executor.name().to_string(),
                expected: self.shots,
                actual: outcomes.total_shots(),
            });
        }
        Ok(outcomes)
    }

    pub fn run(&self) -> Result<SimulationReport> {
        let outcomes = self.sample()?;
        let result = Analyzer::analyze(&outcomes)?;
        let expected = expected_asymmetry(self.operator.epsilon());
        let within_tolerance = result.within_tolerance(expected, self.tolerance);
        info!(
            "epsilon={} shots={} executor={}: asymmetry={:.4} (expected {:.4}, tolerance {}){}",
            self.operator.epsilon(),
            self.shots,
            self.executor.name(),
            result.asymmetry,
            expected,
            self.tolerance,
            if within_tolerance { "" } else { " OUT OF TOLERANCE" }
        );
        Ok(SimulationReport {
            epsilon: self.operator.epsilon(),
            shots: self.shots,
            executor: self.executor.name().to_string(),
            expected_asymmetry: expected,
            tolerance: self.tolerance,
            within_tolerance,
            result,
        })
    }
}

/// `steps` evenly spaced values from `start` to `stop` inclusive.
pub fn epsilon_grid(start: f64, stop: f64, steps: usize) -> Result<Vec<f64>> {
    for (name, value) in [("start", start), ("stop", stop)] {
        DecayOperator::new(value).map_err(|_| {
            BaryogenesisError::invalid_parameter(name, format!("sweep bound {} is outside [-1, 1]", value))
        })?;
    }
    match steps {
        0 => Err(BaryogenesisError::invalid_parameter("steps", "a sweep needs at least one point")),
        1 => Ok(vec![start]),
        _ => {
            let step = (stop - start) / (steps - 1) as f64;
            Ok((0..steps)
                .map(|i| if i + 1 == steps { stop } else { start + step * i as f64 })
                .collect())
        }
    }
}

/// Runs one simulation per epsilon in parallel. Seeded configs give every point
/// its own seed derived from the base seed.
pub fn sweep(config: &SimulationConfig, epsilons: &[f64]) -> Result<Vec<SimulationReport>> {
    epsilons
        .par_iter()
        .enumerate()
        .map(|(i, &epsilon)| {
            let point = SimulationConfig {
                epsilon,
                seed: config.seed.map(|s| s.wrapping_add((i as u64) << 32)),
                ..config.clone()
            };
            Simulation::from_config(&point)?.run()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ExecutorKind, ShotSharding};
    use crate::quantum::RegisterConfiguration;

    /// Always reports a single matter shot, whatever was asked for
    struct SingleShot;

    impl Executor for SingleShot {
        fn name(&self) -> &'static str {
            "single-shot"
        }

        fn run(&self, _circuit: &Circuit, _shots: u64) -> Result<TrialOutcomeSet> {
            TrialOutcomeSet::from_counts([(RegisterConfiguration::MATTER, 1)])
        }
    }

    #[test]
    fn executor_shot_count_is_checked() {
        let simulation = Simulation::new(0.1, 100, Box::new(SingleShot)).unwrap();
        assert!(matches!(
            simulation.run(),
            Err(BaryogenesisError::ShotCountMismatch { expected: 100, actual: 1, .. })
        ));
    }

    #[test]
    fn rejects_invalid_parameters_before_sampling() {
        let executor = || ExecutorKind::Statevector.build(ShotSharding::new(1, Some(0)));
        assert!(matches!(
            Simulation::new(1.5, 100, executor()),
            Err(BaryogenesisError::InvalidParameter { name: "epsilon", .. })
        ));
        assert!(matches!(
            Simulation::new(0.1, 0, executor()),
            Err(BaryogenesisError::InvalidParameter { name: "shots", .. })
        ));
    }

    #[test]
    fn grid_hits_both_ends() {
        let grid = epsilon_grid(-1.0, 1.0, 5).unwrap();
        assert_eq!(grid, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(epsilon_grid(0.3, 0.3, 1).unwrap(), vec![0.3]);
        assert!(epsilon_grid(-1.0, 2.0, 3).is_err());
        assert!(epsilon_grid(-1.0, 1.0, 0).is_err());
    }
}
