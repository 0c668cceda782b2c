//! Dense complex-amplitude state over the five-qubit register.

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;

use super::circuit::{BaseOperation, Circuit, Gate};
use super::register::{RegisterConfiguration, CONFIGURATION_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amplitudes: Vec<Complex64>,
}

impl Default for StateVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl StateVector {
    /// All qubits |0>, amplitude 1 on the empty register
    pub fn zero() -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); CONFIGURATION_COUNT];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self { amplitudes }
    }

    /// Applies every gate of `circuit` to the zero state
    pub fn evolve(circuit: &Circuit) -> Self {
        let mut state = Self::zero();
        for gate in circuit.gates() {
            state.apply(gate);
        }
        state
    }

    pub fn amplitude(&self, config: RegisterConfiguration) -> Complex64 {
        self.amplitudes[usize::from(config.bits())]
    }

    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    pub fn apply(&mut self, gate: &Gate) {
        let matrix = base_matrix(gate.base_operation());
        let target_bit = 1usize << gate.target();
        let controls = gate.control_mask();

        for index in 0..CONFIGURATION_COUNT {
            if index & target_bit != 0 || index & controls != controls {
                continue;
            }
            let partner = index | target_bit;
            let pair = Vector2::new(self.amplitudes[index], self.amplitudes[partner]);
            let out = matrix * pair;
            self.amplitudes[index] = out[0];
            self.amplitudes[partner] = out[1];
        }
    }

    /// Born-rule probability of every configuration, ascending mask order
    pub fn probabilities(&self) -> Vec<(RegisterConfiguration, f64)> {
        RegisterConfiguration::all()
            .zip(self.amplitudes.iter())
            .map(|(config, amp)| (config, amp.norm_sqr()))
            .collect()
    }
}

fn base_matrix(op: BaseOperation) -> Matrix2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    match op {
        BaseOperation::Flip => Matrix2::new(zero, one, one, zero),
        BaseOperation::Rotate(theta) => {
            let (s, c) = (theta / 2.0).sin_cos();
            Matrix2::new(
                Complex64::new(c, 0.0),
                Complex64::new(-s, 0.0),
                Complex64::new(s, 0.0),
                Complex64::new(c, 0.0),
            )
        }
    }
}
