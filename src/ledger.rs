use near_sdk::store::IterableMap;
use near_sdk::{near, AccountId, IntoStorageKey};

use crate::deposit::AssetTransfer;
use crate::error::HtlcError;
use crate::events::HtlcEvent;
use crate::hashlock::HashFunction;
use crate::lock::{CommitmentHash, LockParams, LockRecord, LockState};
use crate::timelocks::{Clock, Timelock};

/// Active locks keyed by commitment hash.
///
/// A hash has an entry exactly while its funds sit in custody. Every
/// operation validates fully before it touches the asset capability, and the
/// transfer is the last fallible step, so a rejected call changes nothing.
#[near(serializers = [borsh])]
pub struct HtlcLedger {
    locks: IterableMap<CommitmentHash, LockRecord>,
}

impl HtlcLedger {
    pub fn new<S: IntoStorageKey>(prefix: S) -> Self {
        Self {
            locks: IterableMap::new(prefix),
        }
    }

    pub fn state_of(&self, commitment_hash: &CommitmentHash) -> LockState {
        match self.locks.get(commitment_hash) {
            Some(record) => LockState::Active(record.clone()),
            None => LockState::Absent,
        }
    }

    pub fn len(&self) -> u32 {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    pub fn flush(&mut self) {
        self.locks.flush();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LockRecord> {
        self.locks.values()
    }

    /// Pulls `params.amount` from `sender_id` into `custody_id` and records the lock.
    pub fn lock<A: AssetTransfer, C: Clock>(
        &mut self,
        assets: &mut A,
        clock: &C,
        custody_id: &AccountId,
        sender_id: &AccountId,
        params: LockParams,
    ) -> Result<LockRecord, HtlcError> {
        if params.amount == 0 {
            return Err(HtlcError::InvalidAmount);
        }
        Timelock::new(params.unlock_time).validate(clock.now())?;
        if self.locks.contains_key(&params.commitment_hash) {
            return Err(HtlcError::LockAlreadyExists);
        }

        assets.transfer_from(&params.asset_id, sender_id, custody_id, params.amount)?;

        let record = LockRecord {
            commitment_hash: params.commitment_hash,
            unlock_time: params.unlock_time,
            amount: params.amount,
            asset_id: params.asset_id,
            sender_id: sender_id.clone(),
            receiver_id: params.receiver_id,
        };
        self.locks.insert(record.commitment_hash, record.clone());

        HtlcEvent::locked(&record).emit();
        Ok(record)
    }

    /// Releases the lock committed to `hash_function(pre_image)` to its receiver.
    pub fn claim<A: AssetTransfer, C: Clock>(
        &mut self,
        assets: &mut A,
        clock: &C,
        hash_function: HashFunction,
        custody_id: &AccountId,
        caller_id: &AccountId,
        pre_image: &[u8],
    ) -> Result<LockRecord, HtlcError> {
        let commitment_hash = hash_function.digest(pre_image);
        let record = self.active(&commitment_hash)?;

        record.timelock().assert_claim_window(clock.now())?;
        if *caller_id != record.receiver_id {
            return Err(HtlcError::NotAuthorizedReceiver);
        }

        assets.transfer_from(&record.asset_id, custody_id, &record.receiver_id, record.amount)?;
        self.locks.remove(&commitment_hash);

        HtlcEvent::claimed(pre_image, &record).emit();
        Ok(record)
    }

    /// Returns an expired lock to its sender.
    pub fn reclaim<A: AssetTransfer, C: Clock>(
        &mut self,
        assets: &mut A,
        clock: &C,
        custody_id: &AccountId,
        caller_id: &AccountId,
        commitment_hash: &CommitmentHash,
    ) -> Result<LockRecord, HtlcError> {
        let record = self.active(commitment_hash)?;

        record.timelock().assert_reclaim_window(clock.now())?;
        if *caller_id != record.sender_id {
            return Err(HtlcError::NotAuthorizedSender);
        }

        assets.transfer_from(&record.asset_id, custody_id, &record.sender_id, record.amount)?;
        self.locks.remove(commitment_hash);

        HtlcEvent::reclaimed(&record).emit();
        Ok(record)
    }

    fn active(&self, commitment_hash: &CommitmentHash) -> Result<LockRecord, HtlcError> {
        match self.state_of(commitment_hash) {
            LockState::Active(record) => Ok(record),
            LockState::Absent => Err(HtlcError::LockNotFound),
        }
    }
}
