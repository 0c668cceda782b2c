//! Quantum-circuit model of GUT baryogenesis: an X boson decays into quark +
//! lepton or antiquark + antilepton with a CP-violating bias, and repeated
//! trials are reduced into a baryon asymmetry and a conservation report.

pub mod error;
pub mod config;
pub mod quantum;
pub mod execution;
pub mod analysis;
pub mod simulation;

#[cfg(test)]
mod tests;

pub use analysis::{Analyzer, AsymmetryReport, Violation};
pub use config::SimulationConfig;
pub use error::{BaryogenesisError, Result};
pub use execution::{ClassicalExecutor, Executor, ExecutorKind, ShotSharding, StatevectorExecutor};
pub use quantum::{DecayChannel, DecayOperator, RegisterConfiguration, TrialOutcomeSet};
pub use simulation::{Simulation, SimulationReport};
