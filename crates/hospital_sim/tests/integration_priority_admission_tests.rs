mod support;

use bevy_ecs::prelude::{Entity, World};

use hospital_sim::clock::{EventKind, SimulationClock, VirtualTime};
use hospital_sim::ecs::{Patient, PatientStage, Severity, StageDurations};
use hospital_sim::runner::{run_next_event_with_hook, simulation_schedule};
use hospital_sim::scenario::{build_world, PreparationRooms};
use hospital_sim::telemetry::HospitalMetrics;
use hospital_sim::test_helpers::fixed_scenario;

// Builds a world without the arrival generator and injects patients by hand,
// so severity classes are exact rather than drawn.
fn spawn_prepared_patient(world: &mut World, id: u64, severity: Severity, ready_at: f64) -> Entity {
    let entity = world
        .spawn(Patient {
            id,
            severity,
            stage: PatientStage::Preparing,
            durations: StageDurations {
                preparation: 0.0,
                surgery: 10.0,
                recovery: 1.0,
            },
            arrival_time: VirtualTime::ZERO,
            departed_at: None,
        })
        .id();

    world
        .resource_mut::<PreparationRooms>()
        .0
        .request(entity, severity.priority(), VirtualTime::ZERO);
    world.resource_mut::<SimulationClock>().schedule_at(
        VirtualTime(ready_at),
        EventKind::PreparationDone,
        Some(entity),
    );
    entity
}

fn surgery_admissions(world: &mut World) -> Vec<u64> {
    let mut schedule = simulation_schedule();
    let mut admitted = Vec::new();
    while run_next_event_with_hook(world, &mut schedule, |world, event| {
        support::assert_capacity_invariant(world);
        if event.kind != EventKind::EnterSurgery {
            return;
        }
        let entity = event.patient.expect("surgery event has a patient");
        admitted.push(world.get::<Patient>(entity).expect("patient").id);
    }) {}
    admitted
}

#[test]
fn severe_patient_overtakes_earlier_mild_request() {
    let mut world = build_world(&fixed_scenario(3, 3, 100.0)).expect("world");

    // The theatre is taken at t=0; a mild request queues at t=1, a severe
    // one at t=2. The release must admit the severe patient first even
    // though it arrived later.
    spawn_prepared_patient(&mut world, 0, Severity::Severe, 0.0);
    spawn_prepared_patient(&mut world, 1, Severity::Mild, 1.0);
    spawn_prepared_patient(&mut world, 2, Severity::Severe, 2.0);

    let admitted = surgery_admissions(&mut world);
    assert_eq!(admitted, vec![0, 2, 1]);

    // Only the t=2 request saw a non-empty queue.
    let metrics = world.resource::<HospitalMetrics>();
    assert_eq!(metrics.blocked_surgeries, 1);
    assert_eq!(metrics.completed_surgeries, 3);
}

#[test]
fn equal_priority_requests_admit_in_arrival_order() {
    let mut world = build_world(&fixed_scenario(3, 3, 100.0)).expect("world");

    spawn_prepared_patient(&mut world, 0, Severity::Severe, 0.0);
    spawn_prepared_patient(&mut world, 1, Severity::Mild, 1.0);
    spawn_prepared_patient(&mut world, 2, Severity::Mild, 2.0);

    let admitted = surgery_admissions(&mut world);
    assert_eq!(admitted, vec![0, 1, 2]);
}
