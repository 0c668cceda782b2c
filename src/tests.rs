use crate::analysis::Analyzer;
use crate::config::SimulationConfig;
use crate::error::BaryogenesisError;
use crate::execution::{ExecutorKind, ShotSharding};
use crate::quantum::{
    initial_configuration, initial_state_circuit, preparation_circuit, Circuit, DecayOperator,
    RegisterConfiguration, TrialOutcomeSet,
};
use crate::simulation::{sweep, Simulation};

const KINDS: [ExecutorKind; 2] = [ExecutorKind::Statevector, ExecutorKind::Classical];

fn simulate(kind: ExecutorKind, epsilon: f64, shots: u64, seed: u64) -> crate::AsymmetryReport {
    let executor = kind.build(ShotSharding::new(4, Some(seed)));
    Simulation::new(epsilon, shots, executor)
        .unwrap()
        .run()
        .unwrap()
        .result
}

#[test]
fn test_initializer() {
    assert_eq!(initial_configuration().indicators(), [true, false, false, false, false]);

    // Preparation alone measures as a single outcome, "00001"
    for kind in KINDS {
        let executor = kind.build(ShotSharding::new(2, Some(5)));
        let counts = executor.run(&initial_state_circuit(), 1_000).unwrap();
        assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(RegisterConfiguration::INITIAL, 1_000)]);
    }
}

#[test]
fn test_conservation_for_every_epsilon() {
    let epsilons = [-1.0, -0.75, -0.2, 0.0, 0.1, 0.5, 0.999, 1.0];
    for kind in KINDS {
        for (i, &eps) in epsilons.iter().enumerate() {
            for shots in [1, 7, 2_000] {
                let executor = kind.build(ShotSharding::new(3, Some(i as u64)));
                let program = DecayOperator::new(eps).unwrap().program().unwrap();
                let counts = executor.run(&program, shots).unwrap();
                assert_eq!(counts.total_shots(), shots);
                let tally = Analyzer::tally(&counts);
                assert!(
                    tally.violations.is_empty(),
                    "{} eps={} shots={} violations={:?}",
                    kind,
                    eps,
                    shots,
                    tally.violations
                );
            }
        }
    }
}

#[test]
fn test_asymmetry_converges_to_epsilon() {
    for kind in KINDS {
        let report = simulate(kind, 0.1, 100_000, 11);
        assert!(report.within_tolerance(0.1, 0.02), "{} asymmetry {}", kind, report.asymmetry);
        assert_eq!(report.n_q + report.n_qbar, 100_000);
    }
}

#[test]
fn test_cp_violation_sign() {
    let positive = simulate(ExecutorKind::Statevector, 0.2, 10_000, 21);
    assert!((positive.asymmetry - 0.2).abs() < 0.05);
    assert!(positive.n_q > positive.n_qbar);

    let negative = simulate(ExecutorKind::Statevector, -0.2, 10_000, 22);
    assert!((negative.asymmetry + 0.2).abs() < 0.05);
    assert!(negative.n_qbar > negative.n_q);
}

#[test]
fn test_zero_cp_violation() {
    let report = simulate(ExecutorKind::Classical, 0.0, 10_000, 31);
    assert!(report.asymmetry.abs() < 0.05);
    assert!((report.matter_fraction - 0.5).abs() < 0.05);
}

#[test]
fn test_boundary_epsilons() {
    for kind in KINDS {
        let all_matter = simulate(kind, 1.0, 5_000, 41);
        assert_eq!(all_matter.n_qbar, 0);
        assert_eq!(all_matter.asymmetry, 1.0);

        let all_antimatter = simulate(kind, -1.0, 5_000, 42);
        assert_eq!(all_antimatter.n_q, 0);
        assert_eq!(all_antimatter.asymmetry, -1.0);
    }
}

#[test]
fn test_symmetry_under_cp_mirror() {
    for eps in [0.1, 0.35, 0.8] {
        let a = simulate(ExecutorKind::Statevector, eps, 100_000, 51);
        let b = simulate(ExecutorKind::Statevector, -eps, 100_000, 52);
        assert!((a.asymmetry + b.asymmetry).abs() < 0.03, "eps={} {} vs {}", eps, a.asymmetry, b.asymmetry);
    }
}

#[test]
fn test_fault_injection_is_never_silent() {
    // An executor that ignores the decay and returns the prepared state
    let executor = ExecutorKind::Statevector.build(ShotSharding::new(1, Some(61)));
    let stuck = executor.run(&preparation_circuit(RegisterConfiguration::INITIAL), 500).unwrap();
    let tally = Analyzer::tally(&stuck);
    assert_eq!(tally.violating_shots().unwrap(), 500);
    assert!(matches!(
        Analyzer::analyze(&stuck),
        Err(BaryogenesisError::DegenerateSample { violating_shots: 500, .. })
    ));

    // Quark without its lepton, as a broken pairing gate would produce
    let mut unpaired = TrialOutcomeSet::new();
    unpaired.record("00010".parse().unwrap(), 10).unwrap();
    unpaired.record(RegisterConfiguration::MATTER, 90).unwrap();
    let report = Analyzer::analyze(&unpaired).unwrap();
    assert!(!report.conserves());
    assert!(report.require_conservation().is_err());
}

#[test]
fn test_invalid_parameters() {
    let executor = || ExecutorKind::Classical.build(ShotSharding::default());
    assert!(matches!(DecayOperator::new(1.5), Err(BaryogenesisError::InvalidParameter { .. })));
    assert!(matches!(
        Simulation::new(0.1, 0, executor()),
        Err(BaryogenesisError::InvalidParameter { .. })
    ));
    let program = DecayOperator::new(0.1).unwrap().program().unwrap();
    assert!(matches!(
        executor().run(&program, 0),
        Err(BaryogenesisError::InvalidParameter { .. })
    ));
}

#[test]
fn test_sharding_does_not_change_totals() {
    let program = DecayOperator::new(0.4).unwrap().program().unwrap();
    for workers in [1, 2, 5, 16] {
        let executor = ExecutorKind::Statevector.build(ShotSharding::new(workers, Some(71)));
        let counts = executor.run(&program, 12_345).unwrap();
        assert_eq!(counts.total_shots(), 12_345);
    }
}

#[test]
fn test_sweep_tracks_epsilon() {
    let config = SimulationConfig {
        shots: 50_000,
        seed: Some(81),
        workers: 2,
        tolerance: 0.03,
        ..SimulationConfig::default()
    };
    let epsilons = [-0.6, 0.0, 0.6];
    let reports = sweep(&config, &epsilons).unwrap();
    assert_eq!(reports.len(), 3);
    for (report, eps) in reports.iter().zip(epsilons) {
        assert_eq!(report.epsilon, eps);
        assert!(report.within_tolerance, "eps={} asymmetry={}", eps, report.result.asymmetry);
        assert!(report.result.conserves());
    }
}

#[test]
fn test_circuits_from_json() {
    let program = DecayOperator::new(0.5).unwrap().program().unwrap();
    let json = serde_json::to_string(&program).unwrap();
    let loaded: Circuit = serde_json::from_str(&json).unwrap();
    for kind in KINDS {
        let executor = kind.build(ShotSharding::new(2, Some(91)));
        let counts = executor.run(&loaded, 2_000).unwrap();
        assert!(Analyzer::tally(&counts).violations.is_empty());
    }

    // A gate outside the register never reaches an executor
    let bad = r#"{"label":"ext","gates":[{"gate":"x","target":9}]}"#;
    assert!(serde_json::from_str::<Circuit>(bad).is_err());
}
