use thiserror::Error;

/// Contract violations surfaced by the engine. The simulation is closed and
/// deterministic, so none of these are transient; there is no retry policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A sleep or schedule call was given a negative (or non-finite) delay.
    /// Fatal to the call, not the run.
    #[error("scheduling delay must be a non-negative finite number, got {delay}")]
    InvalidDelay { delay: f64 },

    /// The event queue drained before the configured end time. With the
    /// arrival generator and monitor always rescheduling themselves this
    /// cannot happen in a well-formed run.
    #[error("event queue drained before the simulation end time")]
    QueueEmpty,

    /// A facility was configured with zero capacity.
    #[error("facility capacity must be a positive integer, got {capacity}")]
    CapacityConfigInvalid { capacity: usize },
}
