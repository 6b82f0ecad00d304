#![allow(dead_code)]

use bevy_ecs::prelude::World;

use hospital_sim::ecs::{Patient, PatientStage};
use hospital_sim::scenario::{PreparationRooms, RecoveryBeds, SurgeryTheatre};

/// Panics if any facility holds more slots than its capacity. Intended for
/// use inside a runner hook so the invariant is checked after every event.
pub fn assert_capacity_invariant(world: &World) {
    let prep = world.resource::<PreparationRooms>();
    assert!(
        prep.0.in_use() <= prep.0.capacity(),
        "preparation rooms over capacity"
    );
    let surgery = world.resource::<SurgeryTheatre>();
    assert!(
        surgery.0.in_use() <= surgery.0.capacity(),
        "surgery theatre over capacity"
    );
    let recovery = world.resource::<RecoveryBeds>();
    assert!(
        recovery.0.in_use() <= recovery.0.capacity(),
        "recovery beds over capacity"
    );
}

/// All patients as (id, stage), sorted by id.
pub fn patient_stages(world: &mut World) -> Vec<(u64, PatientStage)> {
    let mut query = world.query::<&Patient>();
    let mut stages: Vec<_> = query.iter(world).map(|p| (p.id, p.stage)).collect();
    stages.sort_by_key(|&(id, _)| id);
    stages
}

/// Number of patients not yet departed.
pub fn patients_in_flight(world: &mut World) -> usize {
    patient_stages(world)
        .into_iter()
        .filter(|&(_, stage)| stage != PatientStage::Departed)
        .count()
}
