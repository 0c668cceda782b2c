//! Run configuration: defaults, then an optional JSON file, then `BARYOGEN_*`
//! environment variables, then command-line flags.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BaryogenesisError, Result};
use crate::execution::{ExecutorKind, ShotSharding};

pub const DEFAULT_EPSILON: f64 = 0.1;
pub const DEFAULT_SHOTS: u64 = 10_000;
/// Acceptable distance between measured and expected asymmetry
pub const DEFAULT_TOLERANCE: f64 = 0.02;

const ENV_PREFIX: &str = "BARYOGEN_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub epsilon: f64,
    pub shots: u64,
    pub tolerance: f64,
    pub executor: ExecutorKind,
    pub workers: usize,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let sharding = ShotSharding::default();
        Self {
            epsilon: DEFAULT_EPSILON,
            shots: DEFAULT_SHOTS,
            tolerance: DEFAULT_TOLERANCE,
            executor: ExecutorKind::Statevector,
            workers: sharding.workers,
            seed: sharding.seed,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            BaryogenesisError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| BaryogenesisError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overrides fields from `BARYOGEN_EPSILON`, `BARYOGEN_SHOTS`, `BARYOGEN_TOLERANCE`,
    /// `BARYOGEN_EXECUTOR`, `BARYOGEN_WORKERS` and `BARYOGEN_SEED`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| env::var(key).ok())
    }

    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = var("EPSILON") {
            self.epsilon = parse_var("EPSILON", &v)?;
        }
        if let Some(v) = var("SHOTS") {
            self.shots = parse_var("SHOTS", &v)?;
        }
        if let Some(v) = var("TOLERANCE") {
            self.tolerance = parse_var("TOLERANCE", &v)?;
        }
        if let Some(v) = var("WORKERS") {
            self.workers = parse_var("WORKERS", &v)?;
        }
        if let Some(v) = var("SEED") {
            self.seed = Some(parse_var("SEED", &v)?);
        }
        if let Some(v) = var("EXECUTOR") {
            self.executor = <ExecutorKind as clap::ValueEnum>::from_str(&v, true)
                .map_err(|e| BaryogenesisError::Config(format!("{}EXECUTOR: {}", ENV_PREFIX, e)))?;
        }
        debug!("configuration after environment: {:?}", self);
        Ok(())
    }

    /// Checks every field before any sampling happens.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || !(-1.0..=1.0).contains(&self.epsilon) {
            return Err(BaryogenesisError::invalid_parameter(
                "epsilon",
                format!("CP-violation parameter must lie in [-1, 1], got {}", self.epsilon),
            ));
        }
        if self.shots == 0 {
            return Err(BaryogenesisError::invalid_parameter("shots", "shot count must be positive"));
        }
        if self.workers == 0 {
            return Err(BaryogenesisError::invalid_parameter("workers", "worker count must be positive"));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(BaryogenesisError::invalid_parameter(
                "tolerance",
                format!("tolerance must be positive, got {}", self.tolerance),
            ));
        }
        Ok(())
    }

    pub fn sharding(&self) -> ShotSharding {
        ShotSharding::new(self.workers, self.seed)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        BaryogenesisError::Config(format!("{}{}={:?}: {}", ENV_PREFIX, name, value, e))
    })
}
