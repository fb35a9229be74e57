use near_sdk::json_types::{Base58CryptoHash, U128, U64};
use near_sdk::{near, AccountId, CryptoHash, Timestamp};

use crate::timelocks::Timelock;

// Hash of the secret. Identifies a lock while it is active.
pub type CommitmentHash = CryptoHash;

// Account of the NEP-141 token contract.
pub type AssetId = AccountId;

// One outstanding escrow. Never mutated after creation.
#[near(serializers = [borsh])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRecord {
    pub commitment_hash: CommitmentHash,
    pub unlock_time: Timestamp,
    pub amount: u128,
    pub asset_id: AssetId,
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
}

impl LockRecord {
    pub fn timelock(&self) -> Timelock {
        Timelock::new(self.unlock_time)
    }
}

/// What the sender supplies to open a lock.
#[derive(Clone, Debug)]
pub struct LockParams {
    pub commitment_hash: CommitmentHash,
    pub unlock_time: Timestamp,
    pub amount: u128,
    pub asset_id: AssetId,
    pub receiver_id: AccountId,
}

/// Lock status of a single commitment hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockState {
    Active(LockRecord),
    // Never locked, or already claimed or reclaimed.
    Absent,
}

impl LockState {
    pub fn is_active(&self) -> bool {
        matches!(self, LockState::Active(_))
    }
}

// `msg` payload of `ft_transfer_call` that locks the transferred tokens
#[near(serializers = [json])]
#[derive(Clone, Debug)]
pub struct LockArgs {
    pub commitment_hash: Base58CryptoHash,
    pub unlock_time: U64,
    pub receiver_id: AccountId,
}

// JSON view of a `LockRecord`
#[near(serializers = [json])]
#[derive(Clone, Debug, PartialEq)]
pub struct LockView {
    pub commitment_hash: Base58CryptoHash,
    pub unlock_time: U64,
    pub amount: U128,
    pub asset_id: AssetId,
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
}

impl From<&LockRecord> for LockView {
    fn from(record: &LockRecord) -> Self {
        Self {
            commitment_hash: record.commitment_hash.into(),
            unlock_time: U64(record.unlock_time),
            amount: U128(record.amount),
            asset_id: record.asset_id.clone(),
            sender_id: record.sender_id.clone(),
            receiver_id: record.receiver_id.clone(),
        }
    }
}
