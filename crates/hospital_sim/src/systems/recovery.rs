//! Recovery stage and the theatre-blocking admission guard.
//!
//! The guard couples the theatre to downstream capacity: a patient whose
//! surgery has finished keeps the theatre slot while every recovery bed is
//! occupied, re-checking once per poll interval. Only on admission is the
//! surgery counted complete and the theatre released.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Patient, PatientStage};
use crate::scenario::{RecoveryBeds, SurgeryTheatre};
use crate::telemetry::HospitalMetrics;

/// Gap between re-checks of recovery-bed availability, virtual time units.
pub const RECOVERY_POLL_INTERVAL: f64 = 1.0;

/// Admission guard shared by SurgeryDone and RecoveryCheck. The theatre slot
/// is released only after admission succeeds.
pub(crate) fn try_admit_to_recovery(
    clock: &mut SimulationClock,
    surgery: &mut SurgeryTheatre,
    recovery: &mut RecoveryBeds,
    metrics: &mut HospitalMetrics,
    entity: Entity,
    patient: &mut Patient,
) {
    let now = clock.now();
    if recovery.0.is_full() {
        patient.stage = PatientStage::WaitingForRecoveryBed;
        tracing::debug!(
            patient = patient.id,
            time = now.value(),
            "theatre held waiting for a recovery bed"
        );
        clock.schedule_at(
            now.after(RECOVERY_POLL_INTERVAL),
            EventKind::RecoveryCheck,
            Some(entity),
        );
        return;
    }

    metrics.record_completed_surgery();
    if let Some(next) = surgery.0.release(entity) {
        clock.schedule_at(now, EventKind::EnterSurgery, Some(next));
    }
    if let Some(granted) = recovery.0.request(entity, patient.priority(), now) {
        clock.schedule_at(now, EventKind::EnterRecovery, Some(granted));
    }
}

/// Periodic re-check while the theatre is blocked on recovery capacity.
pub fn recovery_check_system(
    mut clock: ResMut<SimulationClock>,
    mut surgery: ResMut<SurgeryTheatre>,
    mut recovery: ResMut<RecoveryBeds>,
    mut metrics: ResMut<HospitalMetrics>,
    mut patients: Query<&mut Patient>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::RecoveryCheck {
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

/// The patient was granted a recovery bed; recover for the sampled duration.
pub fn enter_recovery_system(
    mut clock: ResMut<SimulationClock>,
    mut patients: Query<&mut Patient>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::EnterRecovery {
        return;
    }
    let Some(entity) = event.0.patient else {
        return;
    };
    let Ok(mut patient) = patients.get_mut(entity) else {
        return;
    };

    patient.stage = PatientStage::Recovering;
    let now = clock.now();
    tracing::debug!(patient = patient.id, time = now.value(), "entered recovery");
    clock.schedule_at(
        now.after(patient.durations.recovery),
        EventKind::RecoveryDone,
        Some(entity),
    );
}

/// Recovery finished: free the bed, record the sojourn and depart.
pub fn recovery_done_system(
    mut clock: ResMut<SimulationClock>,
    mut recovery: ResMut<RecoveryBeds>,
    mut metrics: ResMut<HospitalMetrics>,
    mut patients: Query<&mut Patient>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::RecoveryDone {
        return;
    }
    let Some(entity) = event.0.patient else {
        return;
    };
    let Ok(mut patient) = patients.get_mut(entity) else {
        return;
    };

    let now = clock.now();
    if let Some(next) = recovery.0.release(entity) {
        clock.schedule_at(now, EventKind::EnterRecovery, Some(next));
    }

    patient.stage = PatientStage::Departed;
    patient.departed_at = Some(now);
    let sojourn = now.value() - patient.arrival_time.value();
    metrics.record_departure(sojourn);
    tracing::debug!(patient = patient.id, time = now.value(), sojourn, "patient departed");
}
