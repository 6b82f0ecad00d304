//! Periodic monitor: samples the preparation queue length and whether every
//! recovery bed is occupied, then reschedules itself.

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::scenario::{MonitorConfig, PreparationRooms, RecoveryBeds};
use crate::telemetry::HospitalMetrics;

pub fn monitor_tick_system(
    mut clock: ResMut<SimulationClock>,
    prep: Res<PreparationRooms>,
    recovery: Res<RecoveryBeds>,
    mut metrics: ResMut<HospitalMetrics>,
    monitor: Res<MonitorConfig>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::MonitorTick {
        return;
    }

    metrics.record_sample(prep.0.waiting_len(), recovery.0.is_full());

    let now = clock.now();
    clock.schedule_at(now.after(monitor.interval), EventKind::MonitorTick, None);
}
