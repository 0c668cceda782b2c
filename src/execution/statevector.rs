use log::info;

use super::{sample_sharded, validate_run, Executor, ShotSharding};
use crate::error::Result;
use crate::quantum::{Circuit, ProbabilisticOperation, StateVector, TrialOutcomeSet};

/// Exact amplitude simulation followed by measurement sampling of all qubits.
#[derive(Debug, Clone, Default)]
pub struct StatevectorExecutor {
    sharding: ShotSharding,
}

impl StatevectorExecutor {
    pub fn new(sharding: ShotSharding) -> Self {
        Self { sharding }
    }
}

impl Executor for StatevectorExecutor {
    fn name(&self) -> &'static str {
        "statevector"
    }

    fn run(&self, circuit: &Circuit, shots: u64) -> Result<TrialOutcomeSet> {
        validate_run(&self.sharding, shots)?;
        let state = StateVector::evolve(circuit);
        let measurement = ProbabilisticOperation::from_distribution(&circuit.label, state.probabilities())?;
        info!(
            "statevector: {} gates, {} reachable outcomes, {} shots over {} workers",
            circuit.len(),
            measurement.outcomes.len(),
            shots,
            self.sharding.workers
        );
        sample_sharded(&measurement, shots, &self.sharding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::{initial_state_circuit, RegisterConfiguration};

    #[test]
    fn preparation_alone_yields_one_outcome() {
        let executor = StatevectorExecutor::new(ShotSharding::new(2, Some(3)));
        let counts = executor.run(&initial_state_circuit(), 1024).unwrap();
        assert_eq!(counts.iter().count(), 1);
        assert_eq!(counts.count(RegisterConfiguration::INITIAL), 1024);
    }
}
