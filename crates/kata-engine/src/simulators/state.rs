//! Real-amplitude state vector shared by the reference backends.
//!
//! Supports the snippet language's gate set (I, X, Z, H, CNOT) over small
//! registers. All amplitudes stay real under this gate set, which keeps the
//! representation to one `f64` per basis state.
//!
//! Bit convention: qubit `q` is bit `q` of the basis index (least significant
//! first); rendered labels put qubit 0 leftmost.

use anyhow::{anyhow, Result};
use kata_grader_types::{
    Gate, OperationBody, StateDump, StateExpectation, Verdict, MAX_QUBITS,
};

use crate::channel::basis_label;

/// Probabilities within this distance of the expectation count as matching.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Simulator register state.
#[derive(Debug, Clone)]
pub struct StateVector {
    qubit_count: u8,
    amps: Vec<f64>,
}

impl StateVector {
    /// Allocate a register in `∣0…0⟩`.
    pub fn new(qubit_count: u8) -> Result<Self> {
        if qubit_count == 0 || qubit_count > MAX_QUBITS {
            return Err(anyhow!(
                "register width {qubit_count} outside supported range 1..={MAX_QUBITS}"
            ));
        }
        let mut amps = vec![0.0; 1 << qubit_count];
        amps[0] = 1.0;
        Ok(StateVector { qubit_count, amps })
    }

    pub fn qubit_count(&self) -> u8 {
        self.qubit_count
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amps
    }

    /// Apply one gate to the register.
    pub fn apply(&mut self, gate: Gate, targets: &[u8]) -> Result<()> {
        for &t in targets {
            if t >= self.qubit_count {
                return Err(anyhow!(
                    "qubit index {t} out of range for {}-qubit register",
                    self.qubit_count
                ));
            }
        }
        match gate {
            Gate::I => {}
            Gate::X => self.apply_x(targets[0]),
            Gate::Z => self.apply_z(targets[0]),
            Gate::H => self.apply_h(targets[0]),
            Gate::Cnot => {
                let (control, target) = (targets[0], targets[1]);
                if control == target {
                    return Err(anyhow!("CNOT control and target must differ"));
                }
                self.apply_cnot(control, target);
            }
        }
        Ok(())
    }

    /// Run a compiled gate program in order.
    pub fn run(&mut self, body: &OperationBody) -> Result<()> {
        for call in &body.0 {
            self.apply(call.gate, &call.targets)?;
        }
        Ok(())
    }

    /// Measurement probability per basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a * a).collect()
    }

    /// Snapshot for diagnostics.
    pub fn dump(&self) -> StateDump {
        StateDump {
            qubit_count: self.qubit_count,
            amplitudes: self.amps.clone(),
        }
    }

    fn apply_x(&mut self, q: u8) {
        let bit = 1usize << q;
        for i in 0..self.amps.len() {
            if i & bit == 0 {
                self.amps.swap(i, i | bit);
            }
        }
    }

    fn apply_z(&mut self, q: u8) {
        let bit = 1usize << q;
        for i in 0..self.amps.len() {
            if i & bit != 0 {
                self.amps[i] = -self.amps[i];
            }
        }
    }

    fn apply_h(&mut self, q: u8) {
        let bit = 1usize << q;
        let norm = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..self.amps.len() {
            if i & bit == 0 {
                let low = self.amps[i];
                let high = self.amps[i | bit];
                self.amps[i] = (low + high) * norm;
                self.amps[i | bit] = (low - high) * norm;
            }
        }
    }

    fn apply_cnot(&mut self, control: u8, target: u8) {
        let cbit = 1usize << control;
        let tbit = 1usize << target;
        for i in 0..self.amps.len() {
            if i & cbit != 0 && i & tbit == 0 {
                self.amps.swap(i, i | tbit);
            }
        }
    }
}

/// Compare the register against an exercise expectation.
///
/// The first basis state whose probability falls outside
/// [`PROBABILITY_TOLERANCE`] produces the failing verdict; expected and
/// actual values ride along for the caller's report.
pub fn verify(state: &StateVector, expectation: &StateExpectation) -> Verdict {
    let probabilities = state.probabilities();
    let width = state.qubit_count() as usize;
    for (basis, (&actual, &expected)) in probabilities
        .iter()
        .zip(expectation.basis_probabilities.iter())
        .enumerate()
    {
        if (actual - expected).abs() > PROBABILITY_TOLERANCE {
            return Verdict::Fail {
                message: format!(
                    "Register in invalid state for basis state ∣{}⟩",
                    basis_label(basis, width)
                ),
                expected,
                actual,
            };
        }
    }
    Verdict::Pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use kata_grader_types::GateCall;
    use smallvec::smallvec;

    fn expectation(probabilities: Vec<f64>, qubit_count: u8) -> StateExpectation {
        StateExpectation {
            qubit_count,
            basis_probabilities: probabilities,
        }
    }

    #[test]
    fn fresh_register_is_all_zeros() {
        let state = StateVector::new(2).expect("register");
        assert_eq!(state.amplitudes(), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn x_flips_the_qubit() {
        let mut state = StateVector::new(1).expect("register");
        state.apply(Gate::X, &[0]).expect("apply");
        assert_eq!(state.amplitudes(), &[0.0, 1.0]);
        assert!(verify(&state, &expectation(vec![0.0, 1.0], 1)).is_pass());
    }

    #[test]
    fn h_creates_equal_superposition() {
        let mut state = StateVector::new(1).expect("register");
        state.apply(Gate::H, &[0]).expect("apply");
        let probabilities = state.probabilities();
        assert!((probabilities[0] - 0.5).abs() < 1e-12);
        assert!((probabilities[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn h_z_h_equals_x() {
        let mut state = StateVector::new(1).expect("register");
        for gate in [Gate::H, Gate::Z, Gate::H] {
            state.apply(gate, &[0]).expect("apply");
        }
        assert!(verify(&state, &expectation(vec![0.0, 1.0], 1)).is_pass());
    }

    #[test]
    fn h_cnot_creates_bell_pair() {
        let mut state = StateVector::new(2).expect("register");
        state.apply(Gate::H, &[0]).expect("apply");
        state.apply(Gate::Cnot, &[0, 1]).expect("apply");
        assert!(verify(&state, &expectation(vec![0.5, 0.0, 0.0, 0.5], 2)).is_pass());
    }

    #[test]
    fn mismatch_reports_first_bad_basis_state() {
        let mut state = StateVector::new(1).expect("register");
        state.apply(Gate::H, &[0]).expect("apply");
        let verdict = verify(&state, &expectation(vec![0.0, 1.0], 1));
        match verdict {
            Verdict::Fail {
                expected, actual, ..
            } => {
                assert_eq!(expected, 0.0);
                assert!((actual - 0.5).abs() < 1e-12);
            }
            Verdict::Pass => panic!("expected a failing verdict"),
        }
    }

    #[test]
    fn out_of_range_target_is_a_fault() {
        let mut state = StateVector::new(1).expect("register");
        assert!(state.apply(Gate::X, &[1]).is_err());
    }

    #[test]
    fn oversized_register_is_rejected() {
        assert!(StateVector::new(MAX_QUBITS + 1).is_err());
        assert!(StateVector::new(0).is_err());
    }

    #[test]
    fn runs_compiled_bodies() {
        let body = OperationBody(vec![
            GateCall {
                gate: Gate::H,
                targets: smallvec![0],
            },
            GateCall {
                gate: Gate::Cnot,
                targets: smallvec![0, 1],
            },
        ]);
        let mut state = StateVector::new(2).expect("register");
        state.run(&body).expect("run");
        assert!(verify(&state, &expectation(vec![0.5, 0.0, 0.0, 0.5], 2)).is_pass());
    }
}
