//! Simulation error types for the event-driven HDL simulator.
//!
//! All errors that can occur during simulation construction or execution
//! are represented as variants of [`SimError`].

use std::io;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The design has no top-level module set.
    #[error("design has no top-level module")]
    NoTopModule,

    /// A referenced module was not found in the design.
    #[error("module with ID {0} not found in design")]
    ModuleNotFound(u32),

    /// An expression could not be evaluated during simulation.
    #[error("evaluation error: {reason}")]
    EvalError {
        /// Description of what went wrong during evaluation.
        reason: String,
    },

    /// A signal reference could not be resolved.
    #[error("invalid signal reference: {reason}")]
    InvalidSignalRef {
        /// Description of why the signal reference is invalid.
        reason: String,
    },

    /// Division by zero encountered during expression evaluation.
    #[error("division by zero")]
    DivisionByZero,

    /// An unsupported construct was encountered during simulation.
    #[error("unsupported: {reason}")]
    Unsupported {
        /// Description of the unsupported construct.
        reason: String,
    },

    /// Simulation was terminated by a `$finish` system task.
    #[error("simulation finished at {time_fs} fs")]
    Finished {
        /// Time in femtoseconds when `$finish` was called.
        time_fs: u64,
    },

    /// An assertion failed during simulation.
    #[error("assertion failed at {time_fs} fs: {message}")]
    AssertionFailed {
        /// Time in femtoseconds when the assertion failed.
        time_fs: u64,
        /// The assertion failure message.
        message: String,
    },

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),

    /// The simulation exceeded the configured time limit.
    #[error("time limit exceeded: {limit_fs} fs")]
    TimeLimitExceeded {
        /// The time limit in femtoseconds.
        limit_fs: u64,
    },

    /// Too many delta cycles at a single time step, indicating a combinational loop.
    #[error("delta cycle limit exceeded at {fs} fs (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The time in femtoseconds where the limit was hit.
        fs: u64,
        /// The maximum number of delta cycles allowed.
        max_deltas: u32,
    },
}
