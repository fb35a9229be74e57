use near_sdk::{env, Timestamp};

use crate::error::HtlcError;

/// Source of the current time, in nanoseconds.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Reads the timestamp of the block the receipt executes in.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockClock;

impl Clock for BlockClock {
    fn now(&self) -> Timestamp {
        env::block_timestamp()
    }
}

/// A deadline that splits time into a claim window and a reclaim window.
///
/// The claim window is `[.., unlock_time)` and the reclaim window is
/// `[unlock_time, ..)`. At the exact boundary the lock belongs to the sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timelock {
    pub unlock_time: Timestamp,
}

impl Timelock {
    pub fn new(unlock_time: Timestamp) -> Self {
        Self { unlock_time }
    }

    /// A deadline equal to `now` is already expired.
    pub fn validate(&self, now: Timestamp) -> Result<(), HtlcError> {
        if self.unlock_time > now {
            Ok(())
        } else {
            Err(HtlcError::InvalidDeadline)
        }
    }

    pub fn is_claimable(&self, now: Timestamp) -> bool {
        now < self.unlock_time
    }

    pub fn is_reclaimable(&self, now: Timestamp) -> bool {
        !self.is_claimable(now)
    }

    pub fn assert_claim_window(&self, now: Timestamp) -> Result<(), HtlcError> {
        if self.is_claimable(now) {
            Ok(())
        } else {
            Err(HtlcError::ClaimWindowClosed)
        }
    }

    pub fn assert_reclaim_window(&self, now: Timestamp) -> Result<(), HtlcError> {
        if self.is_reclaimable(now) {
            Ok(())
        } else {
            Err(HtlcError::ReclaimWindowNotOpen)
        }
    }
}
