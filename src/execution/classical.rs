//! Probabilistic-bit execution: a distribution over basis states instead of
//! amplitudes. Permutation gates move probability mass, rotations split it.
//! This matches the amplitude picture only while no rotation acts on a qubit
//! that is already split, which the executor checks for.

use log::info;

use super::{sample_sharded, validate_run, Executor, ShotSharding};
use crate::error::{BaryogenesisError, Result};
use crate::quantum::circuit::BaseOperation;
use crate::quantum::prob_ops::PROBABILITY_FLOOR;
use crate::quantum::register::CONFIGURATION_COUNT;
use crate::quantum::{Circuit, Gate, ProbabilisticOperation, RegisterConfiguration, TrialOutcomeSet};

#[derive(Debug, Clone, Default)]
pub struct ClassicalExecutor {
    sharding: ShotSharding,
}

impl ClassicalExecutor {
    pub fn new(sharding: ShotSharding) -> Self {
        Self { sharding }
    }

    /// Exact final distribution of `circuit`, ascending mask order
    pub fn distribution(circuit: &Circuit) -> Result<Vec<(RegisterConfiguration, f64)>> {
        let mut mass = [0.0f64; CONFIGURATION_COUNT];
        mass[0] = 1.0;
        for gate in circuit.gates() {
            apply(&mut mass, gate)?;
        }
        Ok(RegisterConfiguration::all().zip(mass).collect())
    }
}

fn apply(mass: &mut [f64; CONFIGURATION_COUNT], gate: &Gate) -> Result<()> {
    let target_bit = 1usize << gate.target();
    let controls = gate.control_mask();

    for index in 0..CONFIGURATION_COUNT {
        if index & target_bit != 0 || index & controls != controls {
            continue;
        }
        let partner = index | target_bit;
        let (zero, one) = (mass[index], mass[partner]);
        match gate.base_operation() {
            BaseOperation::Flip => {
                mass[index] = one;
                mass[partner] = zero;
            }
            BaseOperation::Rotate(theta) => {
                if zero > PROBABILITY_FLOOR && one > PROBABILITY_FLOOR {
                    return Err(BaryogenesisError::UnsupportedGate(format!(
                        "{} rotates a qubit that is already in superposition",
                        gate
                    )));
                }
                let (s, c) = (theta / 2.0).sin_cos();
                let (stay, shift) = (c * c, s * s);
                mass[index] = zero * stay + one * shift;
                mass[partner] = zero * shift + one * stay;
            }
        }
    }
    Ok(())
}

impl Executor for ClassicalExecutor {
    fn name(&self) -> &'static str {
        "classical"
    }

    fn run(&self, circuit: &Circuit, shots: u64) -> Result<TrialOutcomeSet> {
        validate_run(&self.sharding, shots)?;
        let draw = ProbabilisticOperation::from_distribution(&circuit.label, Self::distribution(circuit)?)?;
        info!(
            "classical: {} gates, {} reachable outcomes, {} shots over {} workers",
            circuit.len(),
            draw.outcomes.len(),
            shots,
            self.sharding.workers
        );
        sample_sharded(&draw, shots, &self.sharding)
    }
}
