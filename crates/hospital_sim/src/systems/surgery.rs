//! Surgery stage. The theatre has a single slot; when surgery finishes the
//! slot is kept until a recovery bed is available (see the admission guard
//! in the recovery module).

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Patient, PatientStage};
use crate::scenario::{RecoveryBeds, SurgeryTheatre};
use crate::systems::recovery::try_admit_to_recovery;
use crate::telemetry::HospitalMetrics;

/// The patient was granted the theatre; operate for the sampled duration.
pub fn enter_surgery_system(
    mut clock: ResMut<SimulationClock>,
    mut patients: Query<&mut Patient>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::EnterSurgery {
        return;
    }
    let Some(entity) = event.0.patient else {
        return;
    };
    let Ok(mut patient) = patients.get_mut(entity) else {
        return;
    };

    patient.stage = PatientStage::InSurgery;
    let now = clock.now();
    tracing::debug!(patient = patient.id, time = now.value(), "entered surgery");
    clock.schedule_at(
        now.after(patient.durations.surgery),
        EventKind::SurgeryDone,
        Some(entity),
    );
}

/// Surgery finished: try to move into recovery. If every bed is taken the
/// patient keeps the theatre slot and polls until one frees.
pub fn surgery_done_system(
    mut clock: ResMut<SimulationClock>,
    mut surgery: ResMut<SurgeryTheatre>,
    mut recovery: ResMut<RecoveryBeds>,
    mut metrics: ResMut<HospitalMetrics>,
    mut patients: Query<&mut Patient>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::SurgeryDone {
        return;
    }
    let Some(entity) = event.0.patient else {
        return;
    };
    let Ok(mut patient) = patients.get_mut(entity) else {
        return;
    };

    try_admit_to_recovery(
        &mut clock,
        &mut surgery,
        &mut recovery,
        &mut metrics,
        entity,
        &mut patient,
    );
}
