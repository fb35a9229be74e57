use near_sdk::json_types::{Base58CryptoHash, Base64VecU8, U128, U64};
use near_sdk::{near, AccountId};

use crate::lock::{AssetId, LockRecord};

/// Notifications for observers, emitted as NEP-297 `EVENT_JSON` logs.
#[near(event_json(standard = "htlc"))]
pub enum HtlcEvent {
    #[event_version("1.0.0")]
    Locked {
        commitment_hash: Base58CryptoHash,
        unlock_time: U64,
        amount: U128,
        asset_id: AssetId,
        sender_id: AccountId,
        receiver_id: AccountId,
    },
    #[event_version("1.0.0")]
    Claimed {
        pre_image: Base64VecU8,
        commitment_hash: Base58CryptoHash,
        unlock_time: U64,
        amount: U128,
        asset_id: AssetId,
        sender_id: AccountId,
        receiver_id: AccountId,
    },
    #[event_version("1.0.0")]
    Reclaimed {
        commitment_hash: Base58CryptoHash,
        unlock_time: U64,
        amount: U128,
        asset_id: AssetId,
        sender_id: AccountId,
        receiver_id: AccountId,
    },
}

impl HtlcEvent {
    pub fn locked(record: &LockRecord) -> Self {
        HtlcEvent::Locked {
            commitment_hash: record.commitment_hash.into(),
            unlock_time: U64(record.unlock_time),
            amount: U128(record.amount),
            asset_id: record.asset_id.clone(),
            sender_id: record.sender_id.clone(),
            receiver_id: record.receiver_id.clone(),
        }
    }

    pub fn claimed(pre_image: &[u8], record: &LockRecord) -> Self {
        HtlcEvent::Claimed {
            pre_image: Base64VecU8::from(pre_image.to_vec()),
            commitment_hash: record.commitment_hash.into(),
            unlock_time: U64(record.unlock_time),
            amount: U128(record.amount),
            asset_id: record.asset_id.clone(),
            sender_id: record.sender_id.clone(),
            receiver_id: record.receiver_id.clone(),
        }
    }

    pub fn reclaimed(record: &LockRecord) -> Self {
        HtlcEvent::Reclaimed {
            commitment_hash: record.commitment_hash.into(),
            unlock_time: U64(record.unlock_time),
            amount: U128(record.amount),
            asset_id: record.asset_id.clone(),
            sender_id: record.sender_id.clone(),
            receiver_id: record.receiver_id.clone(),
        }
    }
}
