//! Execution substrates: anything that turns a circuit and a shot count into
//! counts per final configuration.

pub mod classical;
pub mod statevector;

use std::fmt;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{BaryogenesisError, Result};
use crate::quantum::register::CONFIGURATION_COUNT;
use crate::quantum::{Circuit, ProbabilisticOperation, RegisterConfiguration, TrialOutcomeSet};

pub use classical::ClassicalExecutor;
pub use statevector::StatevectorExecutor;

/// The one contract the simulation needs from a sampling backend.
///
/// Implementations must return counts summing to exactly `shots`.
pub trait Executor: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, circuit: &Circuit, shots: u64) -> Result<TrialOutcomeSet>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Complex-amplitude simulation
    Statevector,
    /// Probabilistic-bit simulation without interference
    Classical,
}

impl ExecutorKind {
    pub fn build(self, sharding: ShotSharding) -> Box<dyn Executor> {
        match self {
            ExecutorKind::Statevector => Box::new(StatevectorExecutor::new(sharding)),
            ExecutorKind::Classical => Box::new(ClassicalExecutor::new(sharding)),
        }
    }
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorKind::Statevector => f.write_str("statevector"),
            ExecutorKind::Classical => f.write_str("classical"),
        }
    }
}

/// How shots are split across rayon workers.
///
/// Worker `i` draws from `StdRng::seed_from_u64(seed + i)` when a seed is set,
/// so seeded runs are reproducible for a fixed worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotSharding {
    pub workers: usize,
    pub seed: Option<u64>,
}

impl Default for ShotSharding {
    fn default() -> Self {
        Self {
            workers: rayon::current_num_threads().max(1),
            seed: None,
        }
    }
}

impl ShotSharding {
    pub fn new(workers: usize, seed: Option<u64>) -> Self {
        Self { workers, seed }
    }

    /// Shot count per worker; the first `shots % workers` workers take one extra.
    /// No more workers than shots are used, so every shard is non-empty.
    pub fn split(&self, shots: u64) -> Vec<u64> {
        let workers = u64::try_from(self.workers).unwrap_or(u64::MAX).min(shots);
        if workers == 0 {
            return Vec::new();
        }
        let base = shots / workers;
        let extra = shots % workers;
        (0..workers).map(|i| base + u64::from(i < extra)).collect()
    }

    fn rng_for(&self, worker: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

pub(crate) fn validate_run(sharding: &ShotSharding, shots: u64) -> Result<()> {
    if shots == 0 {
        return Err(BaryogenesisError::invalid_parameter(
            "shots",
            "shot count must be positive",
        ));
    }
    if sharding.workers == 0 {
        return Err(BaryogenesisError::invalid_parameter(
            "workers",
            "worker count must be positive",
        ));
    }
    Ok(())
}

/// Draws `shots` independent trials from `operation`, sharded across workers,
/// and sums the per-worker counts.
pub fn sample_sharded(
    operation: &ProbabilisticOperation,
    shots: u64,
    sharding: &ShotSharding,
) -> Result<TrialOutcomeSet> {
    validate_run(sharding, shots)?;
    let shards = sharding.split(shots);

    let merged = shards
        .par_iter()
        .enumerate()
        .map(|(worker, &worker_shots)| {
            let mut rng = sharding.rng_for(worker);
            let mut local = [0u64; CONFIGURATION_COUNT];
            for _ in 0..worker_shots {
                let outcome = operation.execute(&mut rng);
                local[usize::from(outcome.value.bits())] += 1;
            }
            debug!("worker {} sampled {} shots", worker, worker_shots);
            TrialOutcomeSet::from_counts(RegisterConfiguration::all().zip(local))
        })
        .try_reduce(TrialOutcomeSet::new, |mut acc, shard| {
            acc.merge(shard)?;
            Ok(acc)
        })?;

    Ok(merged)
}
