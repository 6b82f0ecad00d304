use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::error::SimulationError;

/// Virtual simulation time, unrelated to wall-clock time. Non-negative and
/// monotonically non-decreasing over a run; totally ordered via `total_cmp`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualTime(pub f64);

impl VirtualTime {
    pub const ZERO: VirtualTime = VirtualTime(0.0);

    pub fn value(self) -> f64 {
        self.0
    }

    /// The instant `delay` time units after this one.
    pub fn after(self, delay: f64) -> VirtualTime {
        VirtualTime(self.0 + delay)
    }
}

impl Eq for VirtualTime {}

impl Ord for VirtualTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for VirtualTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SimulationStarted,
    PatientArrival,
    EnterPreparation,
    PreparationDone,
    EnterSurgery,
    SurgeryDone,
    RecoveryCheck,
    EnterRecovery,
    RecoveryDone,
    MonitorTick,
}

/// A pending wake-up. `seq` is assigned at schedule time, so two events due
/// at the same instant are popped in the order they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub due: VirtualTime,
    pub seq: u64,
    pub kind: EventKind,
    /// The patient this wake-up resumes; `None` for the recurring
    /// arrival-generator and monitor events.
    pub patient: Option<Entity>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (due, seq).
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being dispatched; inserted by the runner before each
/// schedule pass so systems can gate on its kind.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Virtual clock plus the time-ordered set of pending wake-ups.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: VirtualTime,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> VirtualTime {
        self.now
    }

    /// Schedule a wake-up `delay` time units from now. Rejects negative or
    /// non-finite delays; a zero delay is valid and resumes at the current
    /// instant, after every same-instant event scheduled earlier.
    pub fn schedule_in(
        &mut self,
        delay: f64,
        kind: EventKind,
        patient: Option<Entity>,
    ) -> Result<(), SimulationError> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SimulationError::InvalidDelay { delay });
        }
        self.push(self.now.after(delay), kind, patient);
        Ok(())
    }

    /// Schedule a wake-up at an absolute instant, which must not precede the
    /// current time.
    pub fn schedule_at(&mut self, due: VirtualTime, kind: EventKind, patient: Option<Entity>) {
        debug_assert!(due >= self.now, "event due time must be >= current time");
        self.push(due, kind, patient);
    }

    fn push(&mut self, due: VirtualTime, kind: EventKind, patient: Option<Entity>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            due,
            seq,
            kind,
            patient,
        });
    }

    /// Remove and return the earliest event, advancing the clock to its due
    /// time. Equal due times come out in schedule order.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.due;
        Some(event)
    }

    /// Due time of the earliest pending event, without popping it.
    pub fn next_event_time(&self) -> Option<VirtualTime> {
        self.events.peek().map(|e| e.due)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(VirtualTime(10.0), EventKind::PatientArrival, None);
        clock.schedule_at(VirtualTime(5.0), EventKind::MonitorTick, None);
        clock.schedule_at(VirtualTime(20.0), EventKind::PatientArrival, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.due, VirtualTime(5.0));
        assert_eq!(clock.now(), VirtualTime(5.0));

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.due, VirtualTime(10.0));
        assert_eq!(clock.now(), VirtualTime(10.0));

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.due, VirtualTime(20.0));

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn same_instant_events_pop_in_schedule_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(VirtualTime(7.0), EventKind::SurgeryDone, None);
        clock.schedule_at(VirtualTime(7.0), EventKind::MonitorTick, None);
        clock.schedule_at(VirtualTime(7.0), EventKind::PatientArrival, None);

        assert_eq!(clock.pop_next().expect("event").kind, EventKind::SurgeryDone);
        assert_eq!(clock.pop_next().expect("event").kind, EventKind::MonitorTick);
        assert_eq!(
            clock.pop_next().expect("event").kind,
            EventKind::PatientArrival
        );
    }

    #[test]
    fn zero_delay_runs_before_later_scheduled_same_instant_event() {
        let mut clock = SimulationClock::default();
        clock.schedule_in(0.0, EventKind::EnterSurgery, None).expect("zero delay");
        clock.schedule_in(0.0, EventKind::MonitorTick, None).expect("zero delay");

        assert_eq!(clock.pop_next().expect("event").kind, EventKind::EnterSurgery);
        assert_eq!(clock.now(), VirtualTime::ZERO);
        assert_eq!(clock.pop_next().expect("event").kind, EventKind::MonitorTick);
    }

    #[test]
    fn negative_delay_is_rejected() {
        let mut clock = SimulationClock::default();
        let err = clock
            .schedule_in(-1.0, EventKind::PatientArrival, None)
            .expect_err("negative delay");
        assert_eq!(err, SimulationError::InvalidDelay { delay: -1.0 });
        assert!(clock.is_empty());
    }

    #[test]
    fn non_finite_delay_is_rejected() {
        let mut clock = SimulationClock::default();
        assert!(clock
            .schedule_in(f64::NAN, EventKind::PatientArrival, None)
            .is_err());
        assert!(clock
            .schedule_in(f64::INFINITY, EventKind::PatientArrival, None)
            .is_err());
    }

    #[test]
    fn next_event_time_peeks_without_advancing() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.next_event_time(), None);
        clock.schedule_at(VirtualTime(3.0), EventKind::MonitorTick, None);
        assert_eq!(clock.next_event_time(), Some(VirtualTime(3.0)));
        assert_eq!(clock.now(), VirtualTime::ZERO);
    }
}
