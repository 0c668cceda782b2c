pub mod register;
pub mod circuit;
pub mod statevector;
pub mod prob_ops;
pub mod decay;
pub mod outcomes;

pub use register::{
    initial_configuration, Classification, ConservationRule, Particle, RegisterConfiguration,
    REGISTER_WIDTH,
};
pub use circuit::{initial_state_circuit, preparation_circuit, Circuit, Gate};
pub use statevector::StateVector;
pub use prob_ops::{OperationOutcome, ProbabilisticOperation};
pub use decay::{DecayChannel, DecayOperator};
pub use outcomes::TrialOutcomeSet;
