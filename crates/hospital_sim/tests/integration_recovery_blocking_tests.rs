mod support;

use std::sync::Arc;

use hospital_sim::distributions::FixedServiceTime;
use hospital_sim::ecs::PatientStage;
use hospital_sim::runner::run_until_end_with_hook;
use hospital_sim::scenario::{ScenarioParams, SurgeryTheatre};
use hospital_sim::telemetry::HospitalMetrics;
use hospital_sim::test_helpers::build_simulation;

// One recovery bed and a recovery time (50) far beyond the arrival gap (10):
// the bed saturates, the patient whose surgery finished keeps the theatre
// slot while polling for a bed, and later surgery requests pile up behind it.
fn saturated_recovery_params() -> ScenarioParams {
    ScenarioParams::default()
        .with_rooms(3, 1)
        .with_interarrival(Arc::new(FixedServiceTime::new(10.0)))
        .with_service_times(
            Arc::new(FixedServiceTime::new(5.0)),
            Arc::new(FixedServiceTime::new(5.0)),
            Arc::new(FixedServiceTime::new(50.0)),
        )
        .with_severe_probability(1.0)
        .with_run_length(100.0)
}

#[test]
fn theatre_is_held_while_recovery_is_full() {
    let (mut world, mut schedule) =
        build_simulation(&saturated_recovery_params()).expect("simulation");

    run_until_end_with_hook(&mut world, &mut schedule, |world, _| {
        support::assert_capacity_invariant(world);
    })
    .expect("run");

    // Arrivals at 10..90: nine patients. Only the first two ever reach a
    // recovery bed; the theatre is then held by a polling patient for the
    // rest of the run, so every later request queues behind it.
    let metrics = world.resource::<HospitalMetrics>();
    assert_eq!(metrics.total_patients, 9);
    assert_eq!(metrics.completed_surgeries, 2);
    assert_eq!(metrics.departed_patients, 1);
    assert_eq!(metrics.blocked_surgeries, 6);

    let report = metrics.report();
    assert!(report.blocking_rate > 0.5);
    assert!(report.recovery_busy_probability > 75.0);

    // The theatre slot is never released while the admission guard polls.
    let surgery = world.resource::<SurgeryTheatre>();
    assert_eq!(surgery.0.in_use(), 1);
    assert_eq!(surgery.0.waiting_len(), 6);

    let stages = support::patient_stages(&mut world);
    assert!(stages
        .iter()
        .any(|&(_, stage)| stage == PatientStage::WaitingForRecoveryBed));
}

#[test]
fn recovery_full_fraction_grows_while_saturated() {
    let (mut world, mut schedule) =
        build_simulation(&saturated_recovery_params()).expect("simulation");

    // Fraction of "recovery full" samples over time; strictly increasing
    // once the single bed is occupied for good.
    let mut fractions = Vec::new();
    run_until_end_with_hook(&mut world, &mut schedule, |world, _| {
        let metrics = world.resource::<HospitalMetrics>();
        let total = metrics.recovery_full_samples.len();
        if total > 0 {
            let full = metrics
                .recovery_full_samples
                .iter()
                .filter(|&&b| b)
                .count();
            fractions.push(full as f64 / total as f64);
        }
    })
    .expect("run");

    let early = fractions[fractions.len() / 4];
    let late = *fractions.last().expect("samples");
    assert!(late > early);
    assert!(late > 0.75);
}
