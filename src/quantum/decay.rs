//! X boson decay with a tunable CP-violation parameter.
//!
//! The decay is one weighted binary choice. A controlled RY on the quark qubit,
//! keyed to the X boson, sets the quark with probability `(1 + epsilon) / 2`.
//! Every other indicator is then derived from that choice by permutation gates:
//! the lepton copies the quark, the antiquark is set only when the X boson is
//! present and the quark is absent, the antilepton copies the antiquark, and the
//! X boson is flipped off by whichever quark flavour appeared. Since exactly one
//! of quark and antiquark ends up set, no reachable terminal state can break
//! the pairing rules.

use log::debug;
use serde::{Deserialize, Serialize};

use super::circuit::{initial_state_circuit, Circuit};
use super::prob_ops::ProbabilisticOperation;
use super::register::{Particle, RegisterConfiguration};
use crate::error::{BaryogenesisError, Result};

const X: usize = Particle::XBoson.index();
const Q: usize = Particle::Quark.index();
const QBAR: usize = Particle::Antiquark.index();
const L: usize = Particle::Lepton.index();
const LBAR: usize = Particle::Antilepton.index();

/// The two conservation-respecting decay products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecayChannel {
    /// X -> q + l
    Matter,
    /// X -> qbar + lbar
    Antimatter,
}

impl DecayChannel {
    pub fn configuration(self) -> RegisterConfiguration {
        match self {
            DecayChannel::Matter => RegisterConfiguration::MATTER,
            DecayChannel::Antimatter => RegisterConfiguration::ANTIMATTER,
        }
    }

    pub fn from_configuration(config: RegisterConfiguration) -> Option<Self> {
        match config {
            RegisterConfiguration::MATTER => Some(DecayChannel::Matter),
            RegisterConfiguration::ANTIMATTER => Some(DecayChannel::Antimatter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecayOperator {
    epsilon: f64,
}

impl DecayOperator {
    /// Fails with `InvalidParameter` unless `epsilon` is a finite value in [-1, 1].
    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || !(-1.0..=1.0).contains(&epsilon) {
            return Err(BaryogenesisError::invalid_parameter(
                "epsilon",
                format!("CP-violation parameter must lie in [-1, 1], got {}", epsilon),
            ));
        }
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// P(X -> q + l) = (1 + epsilon) / 2
    pub fn matter_probability(&self) -> f64 {
        (1.0 + self.epsilon) / 2.0
    }

    /// P(X -> qbar + lbar) = (1 - epsilon) / 2
    pub fn antimatter_probability(&self) -> f64 {
        (1.0 - self.epsilon) / 2.0
    }

    pub fn channel_probability(&self, channel: DecayChannel) -> f64 {
        match channel {
            DecayChannel::Matter => self.matter_probability(),
            DecayChannel::Antimatter => self.antimatter_probability(),
        }
    }

    /// RY angle with sin^2(theta / 2) equal to the matter probability
    pub fn rotation_angle(&self) -> f64 {
        2.0 * self.matter_probability().sqrt().asin()
    }

    /// The decay as gates over the register. Acts only when the X boson is present.
    pub fn circuit(&self) -> Result<Circuit> {
        let theta = self.rotation_angle();
        debug!("decay circuit: epsilon={} theta={:.6}", self.epsilon, theta);

        let mut circuit = Circuit::new(format!("decay(epsilon={})", self.epsilon));
        circuit
            .cry(theta, X, Q)?
            .cx(Q, L)?
            .x(Q)?
            .ccx(X, Q, QBAR)?
            .x(Q)?
            .cx(QBAR, LBAR)?
            .cx(Q, X)?
            .cx(QBAR, X)?;
        Ok(circuit)
    }

    /// Initializer followed by the decay: the full program an executor runs.
    pub fn program(&self) -> Result<Circuit> {
        Ok(initial_state_circuit().compose(&self.circuit()?))
    }

    /// The decay collapsed to a single weighted draw over the two channels.
    pub fn channel_operation(&self) -> Result<ProbabilisticOperation> {
        let outcomes = [DecayChannel::Matter, DecayChannel::Antimatter].map(|channel| {
            (
                format!("{:?}", channel),
                channel.configuration(),
                self.channel_probability(channel),
            )
        });
        ProbabilisticOperation::from_labelled("X boson decay", outcomes)
    }
}
