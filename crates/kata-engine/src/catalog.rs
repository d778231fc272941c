//! Built-in exercise catalog.
//!
//! Each exercise carries the skeleton placeholder the harness invokes, the
//! identifier a submission must declare, and the state check run after the
//! bound operation returns.

use kata_grader_types::{
    Exercise, Gate, GateCall, OperationBody, OperationInfo, StateExpectation,
};
use smallvec::smallvec;

/// All built-in exercises, in curriculum order.
pub fn builtin_exercises() -> Vec<Exercise> {
    vec![state_flip(), sign_flip(), basis_change(), bell_pair()]
}

/// Look up an exercise by id.
pub fn find_exercise(id: &str) -> Option<Exercise> {
    builtin_exercises().into_iter().find(|e| e.id == id)
}

fn gate1(gate: Gate, target: u8) -> GateCall {
    GateCall {
        gate,
        targets: smallvec![target],
    }
}

fn state_flip() -> Exercise {
    Exercise {
        id: "T101_StateFlip".to_string(),
        skeleton: OperationInfo::placeholder("T101_StateFlip", &["q"]),
        solution_name: "StateFlip".to_string(),
        summary: "Change the qubit state from ∣0⟩ to ∣1⟩.".to_string(),
        prelude: OperationBody::default(),
        postlude: OperationBody::default(),
        expectation: StateExpectation {
            qubit_count: 1,
            basis_probabilities: vec![0.0, 1.0],
        },
        dump_machine: true,
    }
}

fn sign_flip() -> Exercise {
    // The harness conjugates with H so a phase flip becomes measurable.
    Exercise {
        id: "T102_SignFlip".to_string(),
        skeleton: OperationInfo::placeholder("T102_SignFlip", &["q"]),
        solution_name: "SignFlip".to_string(),
        summary: "Flip the sign of the ∣1⟩ component.".to_string(),
        prelude: OperationBody(vec![gate1(Gate::H, 0)]),
        postlude: OperationBody(vec![gate1(Gate::H, 0)]),
        expectation: StateExpectation {
            qubit_count: 1,
            basis_probabilities: vec![0.0, 1.0],
        },
        dump_machine: false,
    }
}

fn basis_change() -> Exercise {
    Exercise {
        id: "T103_BasisChange".to_string(),
        skeleton: OperationInfo::placeholder("T103_BasisChange", &["q"]),
        solution_name: "BasisChange".to_string(),
        summary: "Put the qubit into an equal superposition of ∣0⟩ and ∣1⟩.".to_string(),
        prelude: OperationBody::default(),
        postlude: OperationBody::default(),
        expectation: StateExpectation {
            qubit_count: 1,
            basis_probabilities: vec![0.5, 0.5],
        },
        dump_machine: true,
    }
}

fn bell_pair() -> Exercise {
    Exercise {
        id: "T201_BellPair".to_string(),
        skeleton: OperationInfo::placeholder("T201_BellPair", &["q1", "q2"]),
        solution_name: "BellPair".to_string(),
        summary: "Entangle two qubits into (∣00⟩ + ∣11⟩) / √2.".to_string(),
        prelude: OperationBody::default(),
        postlude: OperationBody::default(),
        expectation: StateExpectation {
            qubit_count: 2,
            basis_probabilities: vec![0.5, 0.0, 0.0, 0.5],
        },
        dump_machine: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn ids_are_unique() {
        let exercises = builtin_exercises();
        let ids: BTreeSet<_> = exercises.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), exercises.len());
    }

    #[test]
    fn skeleton_id_matches_exercise_id() {
        for exercise in builtin_exercises() {
            assert_eq!(exercise.id, exercise.skeleton.name);
            assert!(exercise.skeleton.body.is_empty());
        }
    }

    #[test]
    fn expectations_cover_the_register() {
        for exercise in builtin_exercises() {
            let states = 1usize << exercise.expectation.qubit_count;
            assert_eq!(
                exercise.expectation.basis_probabilities.len(),
                states,
                "{}",
                exercise.id
            );
        }
    }

    #[test]
    fn lookup_by_id() {
        assert!(find_exercise("T101_StateFlip").is_some());
        assert!(find_exercise("T999_Missing").is_none());
    }
}
