//! Vessel call scheduling and demurrage accounting for the Lantern simulation.
//!
//! Vessel calls are scheduled with an ETA and an ETD, berthed one at a time,
//! worked, and sent away. Every hour (or part of an hour) a call stays past
//! its ETD accrues a penalty at the call's hourly rate. All money is
//! [`Decimal`](rust_decimal::Decimal); there is no floating point on this
//! path.
//!
//! # Modules
//!
//! - [`vessel`] -- The [`VesselLedger`] with the call lifecycle and penalty
//!   computation.
//!
//! # Lifecycle
//!
//! | From | Operation | To |
//! |------|-----------|----|
//! | Inbound | `berth` | Berthed |
//! | Berthed | `complete` | Completed |
//! | Berthed, Completed | `depart` | Departed |

pub mod vessel;

// Re-export primary types at crate root.
pub use vessel::{DEFAULT_PENALTY_PER_HOUR, VesselLedger};

use lantern_types::{VesselId, VesselStatus};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when updating vessel calls.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No call with this identifier.
    #[error("vessel call not found: {0}")]
    VesselNotFound(VesselId),

    /// The call is not in a state that allows the requested transition.
    #[error("vessel {vessel} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        /// The call.
        vessel: VesselId,
        /// Its current status.
        from: VesselStatus,
        /// The requested status.
        to: VesselStatus,
    },
}
