//! Gate-level circuit description handed to an executor.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::register::{Particle, RegisterConfiguration, REGISTER_WIDTH};
use crate::error::{BaryogenesisError, Result};

/// Every gate is a (possibly controlled) single-qubit operation on `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "lowercase")]
pub enum Gate {
    X { target: usize },
    Cx { control: usize, target: usize },
    Ccx { controls: [usize; 2], target: usize },
    Ry { theta: f64, target: usize },
    Cry { theta: f64, control: usize, target: usize },
}

/// The single-qubit operation a gate applies once its controls are satisfied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaseOperation {
    Flip,
    Rotate(f64),
}

impl Gate {
    pub fn name(&self) -> &'static str {
        match self {
            Gate::X { .. } => "x",
            Gate::Cx { .. } => "cx",
            Gate::Ccx { .. } => "ccx",
            Gate::Ry { .. } => "ry",
            Gate::Cry { .. } => "cry",
        }
    }

    pub fn target(&self) -> usize {
        match *self {
            Gate::X { target }
            | Gate::Cx { target, .. }
            | Gate::Ccx { target, .. }
            | Gate::Ry { target, .. }
            | Gate::Cry { target, .. } => target,
        }
    }

    pub fn controls(&self) -> Vec<usize> {
        match *self {
            Gate::X { .. } | Gate::Ry { .. } => Vec::new(),
            Gate::Cx { control, .. } | Gate::Cry { control, .. } => vec![control],
            Gate::Ccx { controls, .. } => controls.to_vec(),
        }
    }

    /// Bit mask of every control qubit
    pub fn control_mask(&self) -> usize {
        self.controls().iter().fold(0, |mask, &c| mask | (1 << c))
    }

    pub fn base_operation(&self) -> BaseOperation {
        match *self {
            Gate::X { .. } | Gate::Cx { .. } | Gate::Ccx { .. } => BaseOperation::Flip,
            Gate::Ry { theta, .. } | Gate::Cry { theta, .. } => BaseOperation::Rotate(theta),
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = Vec::with_capacity(3);
        for qubit in self.controls().into_iter().chain(std::iter::once(self.target())) {
            if qubit >= REGISTER_WIDTH || seen.contains(&qubit) {
                return Err(BaryogenesisError::QubitOutOfRange {
                    gate: self.to_string(),
                    qubit,
                });
            }
            seen.push(qubit);
        }
        if let BaseOperation::Rotate(theta) = self.base_operation() {
            if !theta.is_finite() {
                return Err(BaryogenesisError::invalid_parameter(
                    "theta",
                    format!("rotation angle must be finite, got {}", theta),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Gate::X { target } => write!(f, "x q[{}]", target),
            Gate::Cx { control, target } => write!(f, "cx q[{}], q[{}]", control, target),
            Gate::Ccx { controls, target } => {
                write!(f, "ccx q[{}], q[{}], q[{}]", controls[0], controls[1], target)
            }
            Gate::Ry { theta, target } => write!(f, "ry({:.6}) q[{}]", theta, target),
            Gate::Cry { theta, control, target } => {
                write!(f, "cry({:.6}) q[{}], q[{}]", theta, control, target)
            }
        }
    }
}

/// Ordered gate list over the fixed five-qubit register.
///
/// Deserialized circuits go through [`Circuit::push`] gate by gate, so a
/// circuit can only ever hold validated gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedCircuit")]
pub struct Circuit {
    pub label: String,
    gates: Vec<Gate>,
}

#[derive(Deserialize)]
struct UncheckedCircuit {
    label: String,
    gates: Vec<Gate>,
}

impl TryFrom<UncheckedCircuit> for Circuit {
    type Error = BaryogenesisError;

    fn try_from(raw: UncheckedCircuit) -> Result<Self> {
        let mut circuit = Circuit::new(raw.label);
        for gate in raw.gates {
            circuit.push(gate)?;
        }
        Ok(circuit)
    }
}

impl Circuit {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            gates: Vec::new(),
        }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn push(&mut self, gate: Gate) -> Result<&mut Self> {
        gate.validate()?;
        self.gates.push(gate);
        Ok(self)
    }

    pub fn x(&mut self, target: usize) -> Result<&mut Self> {
        self.push(Gate::X { target })
    }

    pub fn cx(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.push(Gate::Cx { control, target })
    }

    pub fn ccx(&mut self, first: usize, second: usize, target: usize) -> Result<&mut Self> {
        self.push(Gate::Ccx {
            controls: [first, second],
            target,
        })
    }

    pub fn ry(&mut self, theta: f64, target: usize) -> Result<&mut Self> {
        self.push(Gate::Ry { theta, target })
    }

    pub fn cry(&mut self, theta: f64, control: usize, target: usize) -> Result<&mut Self> {
        self.push(Gate::Cry { theta, control, target })
    }

    /// Appends `other` after this circuit's gates.
    pub fn compose(mut self, other: &Circuit) -> Self {
        self.gates.extend_from_slice(&other.gates);
        self.label = format!("{} + {}", self.label, other.label);
        self
    }
}

/// Preparation circuit for an arbitrary starting configuration: one X per set indicator.
pub fn preparation_circuit(config: RegisterConfiguration) -> Circuit {
    let mut circuit = Circuit::new(format!("prepare {}", config));
    circuit.gates = Particle::ALL
        .iter()
        .filter(|&&p| config.has(p))
        .map(|p| Gate::X { target: p.index() })
        .collect();
    circuit
}

/// The Initializer as a circuit.
pub fn initial_state_circuit() -> Circuit {
    preparation_circuit(RegisterConfiguration::INITIAL)
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// {} ({} qubits, {} gates)", self.label, REGISTER_WIDTH, self.gates.len())?;
        for gate in &self.gates {
            writeln!(f, "{};", gate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_circuit_is_single_x_on_boson() {
        let circuit = initial_state_circuit();
        assert_eq!(circuit.gates(), &[Gate::X { target: 0 }]);
    }

    #[test]
    fn rejects_out_of_range_and_repeated_qubits() {
        let mut circuit = Circuit::new("bad");
        assert!(matches!(
            circuit.x(5),
            Err(BaryogenesisError::QubitOutOfRange { qubit: 5, .. })
        ));
        assert!(circuit.cx(2, 2).is_err());
        assert!(circuit.ccx(0, 1, 1).is_err());
        assert!(circuit.ry(f64::NAN, 0).is_err());
        assert!(circuit.is_empty());
    }

    #[test]
    fn compose_appends_gates_in_order() {
        let mut decay = Circuit::new("decay");
        decay.cx(0, 1).unwrap().x(0).unwrap();
        let composed = initial_state_circuit().compose(&decay);
        assert_eq!(
            composed.gates(),
            &[
                Gate::X { target: 0 },
                Gate::Cx { control: 0, target: 1 },
                Gate::X { target: 0 }
            ]
        );
        assert_eq!(composed.gates()[1].control_mask(), 0b1);
    }

    #[test]
    fn deserialization_validates_every_gate() {
        for json in [
            r#"{"label":"ext","gates":[{"gate":"x","target":9}]}"#,
            r#"{"label":"ext","gates":[{"gate":"x","target":99}]}"#,
            r#"{"label":"ext","gates":[{"gate":"cx","control":1,"target":1}]}"#,
        ] {
            let err = serde_json::from_str::<Circuit>(json).unwrap_err();
            assert!(err.to_string().contains("invalid qubit"), "{}", err);
        }
    }

    #[test]
    fn json_round_trip_keeps_gates() {
        let mut circuit = initial_state_circuit();
        circuit.cry(1.2, 0, 1).unwrap().ccx(0, 1, 2).unwrap();
        let json = serde_json::to_string(&circuit).unwrap();
        assert_eq!(serde_json::from_str::<Circuit>(&json).unwrap(), circuit);
    }
}
