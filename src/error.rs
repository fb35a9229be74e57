use near_sdk::FunctionError;
use thiserror::Error;

/// Rejections reported by the HTLC ledger.
///
/// Every variant leaves the contract state exactly as it was before the call.
/// Returned from a contract method, the error fails the receipt with its
/// display string.
#[derive(Error, FunctionError, Debug, Clone, PartialEq, Eq)]
pub enum HtlcError {
    #[error("HTLC: amount must be greater than 0")]
    InvalidAmount,

    #[error("HTLC: unlock time must be in the future")]
    InvalidDeadline,

    #[error("HTLC: lock exists")]
    LockAlreadyExists,

    #[error("HTLC: transfer amount exceeds balance")]
    InsufficientFunds,

    #[error("HTLC: transfer amount exceeds allowance")]
    TransferNotAuthorized,

    #[error("HTLC: lock not found")]
    LockNotFound,

    #[error("HTLC: can only claim before the unlock time")]
    ClaimWindowClosed,

    #[error("HTLC: can only the receiver claim")]
    NotAuthorizedReceiver,

    #[error("HTLC: can only reclaim after the unlock time")]
    ReclaimWindowNotOpen,

    #[error("HTLC: can only the sender reclaim")]
    NotAuthorizedSender,
}

/// Failures of the asset transfer capability.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    #[error("transfer amount exceeds balance")]
    InsufficientFunds,

    #[error("transfer amount exceeds allowance")]
    NotAuthorized,
}

impl From<TransferError> for HtlcError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientFunds => HtlcError::InsufficientFunds,
            TransferError::NotAuthorized => HtlcError::TransferNotAuthorized,
        }
    }
}
