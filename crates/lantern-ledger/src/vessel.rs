//! Vessel call registry with berth tracking and demurrage.
//!
//! The ledger holds every scheduled call in scheduling order and remembers
//! which one is currently alongside. Only one vessel is worked at a time;
//! berthing another replaces the active call.
//!
//! Time is always passed in by the caller (the simulation clock), never read
//! from the system, so penalties are reproducible.

use chrono::{DateTime, TimeDelta, Utc};
use lantern_types::{
    ContainerId, Manifest, ManifestKind, VesselCall, VesselId, VesselSnapshot, VesselStatus,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::LedgerError;

/// Default demurrage per hour past ETD.
pub const DEFAULT_PENALTY_PER_HOUR: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Milliseconds in one hour.
const MS_PER_HOUR: i64 = 3_600_000;

/// Registry of vessel calls.
#[derive(Debug, Clone)]
pub struct VesselLedger {
    /// All calls in scheduling order.
    vessels: Vec<VesselCall>,
    /// Call currently alongside.
    active: Option<VesselId>,
    /// Rate applied to newly scheduled calls.
    penalty_per_hour: Decimal,
}

impl VesselLedger {
    /// Create an empty ledger charging `penalty_per_hour` on new calls.
    pub const fn new(penalty_per_hour: Decimal) -> Self {
        Self {
            vessels: Vec::new(),
            active: None,
            penalty_per_hour,
        }
    }

    // -------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------

    /// Schedule a call arriving `eta_offset_secs` after `now` and staying
    /// `duration_secs`. Negative durations are treated as zero.
    pub fn schedule_vessel(
        &mut self,
        name: &str,
        now: DateTime<Utc>,
        eta_offset_secs: i64,
        duration_secs: i64,
    ) -> VesselId {
        let eta = offset(now, eta_offset_secs);
        let etd = offset(eta, duration_secs.max(0));
        let id = VesselId::new();
        self.vessels.push(VesselCall {
            id,
            name: name.to_owned(),
            eta,
            etd,
            status: VesselStatus::Inbound,
            manifest: Manifest::default(),
            penalty_per_hour: self.penalty_per_hour,
        });
        info!(vessel = %id, name, %eta, %etd, "Vessel scheduled");
        id
    }

    /// Add a container to one half of a call's manifest.
    ///
    /// # Errors
    ///
    /// [`LedgerError::VesselNotFound`].
    pub fn add_manifest_item(
        &mut self,
        id: VesselId,
        kind: ManifestKind,
        container: ContainerId,
    ) -> Result<(), LedgerError> {
        let call = self.call_mut(id)?;
        match kind {
            ManifestKind::Discharge => call.manifest.discharge.push(container),
            ManifestKind::Load => call.manifest.load.push(container),
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Bring an inbound call alongside and make it the active vessel.
    ///
    /// # Errors
    ///
    /// [`LedgerError::VesselNotFound`] or [`LedgerError::InvalidTransition`]
    /// unless the call is Inbound.
    pub fn berth(&mut self, id: VesselId) -> Result<(), LedgerError> {
        self.transition(id, &[VesselStatus::Inbound], VesselStatus::Berthed)?;
        if let Some(previous) = self.active.replace(id) {
            warn!(vessel = %previous, "Active vessel replaced by a new berthing");
        }
        Ok(())
    }

    /// Mark cargo operations on a berthed call as finished.
    ///
    /// # Errors
    ///
    /// [`LedgerError::VesselNotFound`] or [`LedgerError::InvalidTransition`]
    /// unless the call is Berthed.
    pub fn complete(&mut self, id: VesselId) -> Result<(), LedgerError> {
        self.transition(id, &[VesselStatus::Berthed], VesselStatus::Completed)
    }

    /// Send a berthed or completed call away. Stops further penalties.
    ///
    /// # Errors
    ///
    /// [`LedgerError::VesselNotFound`] or [`LedgerError::InvalidTransition`]
    /// for calls that never berthed or already left.
    pub fn depart(&mut self, id: VesselId) -> Result<(), LedgerError> {
        self.transition(
            id,
            &[VesselStatus::Berthed, VesselStatus::Completed],
            VesselStatus::Departed,
        )?;
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(())
    }

    fn transition(
        &mut self,
        id: VesselId,
        allowed: &[VesselStatus],
        to: VesselStatus,
    ) -> Result<(), LedgerError> {
        let call = self.call_mut(id)?;
        if !allowed.contains(&call.status) {
            return Err(LedgerError::InvalidTransition {
                vessel: id,
                from: call.status,
                to,
            });
        }
        let from = call.status;
        call.status = to;
        info!(vessel = %id, name = %call.name, ?from, ?to, "Vessel status changed");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// All calls in scheduling order.
    pub fn vessels(&self) -> &[VesselCall] {
        &self.vessels
    }

    /// Look up a call.
    pub fn vessel(&self, id: VesselId) -> Option<&VesselCall> {
        self.vessels.iter().find(|v| v.id == id)
    }

    /// Call currently alongside.
    pub fn active(&self) -> Option<&VesselCall> {
        self.active.and_then(|id| self.vessel(id))
    }

    /// Demurrage accrued by `now`: `ceil(hours past ETD × rate)`.
    ///
    /// Zero for unknown calls, calls not yet past ETD, and departed calls.
    pub fn penalty(&self, id: VesselId, now: DateTime<Utc>) -> Decimal {
        self.vessel(id)
            .map_or(Decimal::ZERO, |call| penalty_for(call, now))
    }

    /// Time left until ETD; negative once the call is late.
    pub fn time_to_etd(&self, id: VesselId, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.vessel(id).map(|call| call.etd.signed_duration_since(now))
    }

    /// Every call with its penalty at `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Vec<VesselSnapshot> {
        self.vessels
            .iter()
            .map(|call| VesselSnapshot {
                call: call.clone(),
                penalty: penalty_for(call, now),
            })
            .collect()
    }

    fn call_mut(&mut self, id: VesselId) -> Result<&mut VesselCall, LedgerError> {
        self.vessels
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(LedgerError::VesselNotFound(id))
    }
}

impl Default for VesselLedger {
    fn default() -> Self {
        Self::new(DEFAULT_PENALTY_PER_HOUR)
    }
}

/// Shift a timestamp by whole seconds, saturating at the timestamp itself
/// when the result is out of range.
fn offset(at: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(secs)
        .and_then(|d| at.checked_add_signed(d))
        .unwrap_or(at)
}

fn penalty_for(call: &VesselCall, now: DateTime<Utc>) -> Decimal {
    if call.status == VesselStatus::Departed {
        return Decimal::ZERO;
    }
    let late_ms = now.signed_duration_since(call.etd).num_milliseconds();
    if late_ms <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(late_ms)
        .checked_div(Decimal::from(MS_PER_HOUR))
        .and_then(|hours| hours.checked_mul(call.penalty_per_hour))
        .map_or(Decimal::MAX, |p| p.ceil())
}
