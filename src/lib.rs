use near_sdk::json_types::{Base58CryptoHash, Base64VecU8, U128, U64};
use near_sdk::{
    assert_one_yocto, env, ext_contract, log, near, require, serde_json, AccountId, Gas, NearToken,
    Promise, PromiseError, PromiseOrValue, StorageUsage,
};

mod deposit;
mod error;
mod events;
mod hashlock;
mod ledger;
mod lock;
mod storage;
mod timelocks;
mod utils;

pub use deposit::{AssetTransfer, DepositManager};
pub use error::{HtlcError, TransferError};
pub use events::HtlcEvent;
pub use hashlock::HashFunction;
pub use ledger::HtlcLedger;
pub use lock::{
    AssetId, CommitmentHash, LockArgs, LockParams, LockRecord, LockState, LockView,
};
pub use storage::StorageManager;
pub use timelocks::{BlockClock, Clock, Timelock};

use utils::log_custody_event;

const GAS_FOR_FT_TRANSFER: Gas = Gas::from_tgas(10);
const GAS_FOR_RESOLVE_WITHDRAW: Gas = Gas::from_tgas(10);

// External contract interfaces
#[ext_contract(ext_fungible_token)]
pub trait FungibleToken {
    fn ft_transfer(&mut self, receiver_id: AccountId, amount: U128, memo: Option<String>);
}

#[ext_contract(ext_self)]
pub trait SelfCallbacks {
    fn on_withdraw_resolved(&mut self, account_id: AccountId, asset_id: AssetId, amount: U128)
        -> U128;
}

// Define the contract structure
#[near(contract_state)]
pub struct Contract {
    pub hash_function: HashFunction,
    // All active locks, keyed by commitment hash
    pub ledger: HtlcLedger,
    // Deposited token balances, including the contract's own custody
    pub deposits: DepositManager,
    // Prepaid NEAR covering the storage each account adds
    pub storage: StorageManager,
}

impl Default for Contract {
    fn default() -> Self {
        Self::new(None)
    }
}

#[near]
impl Contract {
    #[init]
    pub fn new(hash_function: Option<HashFunction>) -> Self {
        Self {
            hash_function: hash_function.unwrap_or_default(),
            ledger: HtlcLedger::new(b"l"),
            deposits: DepositManager::new(),
            storage: StorageManager::new(),
        }
    }

    /// Locks `amount` of the caller's deposited `asset_id` for `receiver_id`.
    ///
    /// The caller must have deposited the tokens and approved at least
    /// `amount` beforehand. The new record's storage is charged to the caller;
    /// any attached deposit is added to their storage balance first.
    #[payable]
    #[handle_result]
    pub fn lock(
        &mut self,
        commitment_hash: Base58CryptoHash,
        unlock_time: U64,
        amount: U128,
        asset_id: AssetId,
        receiver_id: AccountId,
    ) -> Result<LockView, HtlcError> {
        let params = LockParams {
            commitment_hash: commitment_hash.into(),
            unlock_time: unlock_time.0,
            amount: amount.0,
            asset_id,
            receiver_id,
        };
        let sender_id = env::predecessor_account_id();
        let initial_storage = self.measure_storage();
        let record = self.ledger.lock(
            &mut self.deposits,
            &BlockClock,
            &env::current_account_id(),
            &sender_id,
            params,
        )?;
        self.storage.deposit(&sender_id, env::attached_deposit());
        self.charge_storage(&sender_id, initial_storage);
        Ok(LockView::from(&record))
    }

    /// Reveals the secret and releases the matching lock to its receiver.
    #[handle_result]
    pub fn claim(&mut self, pre_image: Base64VecU8) -> Result<LockView, HtlcError> {
        let record = self.ledger.claim(
            &mut self.deposits,
            &BlockClock,
            self.hash_function,
            &env::current_account_id(),
            &env::predecessor_account_id(),
            &pre_image.0,
        )?;
        Ok(LockView::from(&record))
    }

    /// Returns an expired lock to its sender.
    #[handle_result]
    pub fn reclaim(&mut self, commitment_hash: Base58CryptoHash) -> Result<LockView, HtlcError> {
        let record = self.ledger.reclaim(
            &mut self.deposits,
            &BlockClock,
            &env::current_account_id(),
            &env::predecessor_account_id(),
            &commitment_hash.into(),
        )?;
        Ok(LockView::from(&record))
    }

    /// Sets how much of `asset_id` the contract may pull from the caller's deposit.
    #[payable]
    pub fn approve(&mut self, asset_id: AssetId, amount: U128) {
        let owner_id = env::predecessor_account_id();
        let initial_storage = self.measure_storage();
        self.storage.deposit(&owner_id, env::attached_deposit());
        self.deposits.approve(&owner_id, &asset_id, amount.0);
        self.charge_storage(&owner_id, initial_storage);
        log!("Approved {} of {} for {}", amount.0, asset_id, owner_id);
    }

    /// NEP-141 receiver.
    ///
    /// An empty `msg` deposits the tokens for `sender_id`. A `LockArgs` JSON
    /// `msg` deposits and locks them in one step; if the lock is rejected the
    /// whole amount is handed back to the token contract for refund. Storage
    /// added for `sender_id` comes out of their prepaid storage balance.
    pub fn ft_on_transfer(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: String,
    ) -> PromiseOrValue<U128> {
        let asset_id = env::predecessor_account_id();
        require!(amount.0 > 0, "Deposit amount must be positive");
        let initial_storage = self.measure_storage();

        if msg.is_empty() {
            self.deposits.credit(&sender_id, &asset_id, amount.0);
            self.charge_storage(&sender_id, initial_storage);
            log_custody_event("DEPOSITED", &sender_id, &asset_id, amount.0);
            return PromiseOrValue::Value(U128(0));
        }

        let args: LockArgs = serde_json::from_str(&msg)
            .unwrap_or_else(|_| env::panic_str("Invalid LockArgs in msg"));

        // The transfer call itself authorises exactly the transferred amount.
        let allowance = self.deposits.allowance(&sender_id, &asset_id);
        self.deposits.credit(&sender_id, &asset_id, amount.0);
        self.deposits.increase_allowance(&sender_id, &asset_id, amount.0);

        let params = LockParams {
            commitment_hash: args.commitment_hash.into(),
            unlock_time: args.unlock_time.0,
            amount: amount.0,
            asset_id: asset_id.clone(),
            receiver_id: args.receiver_id,
        };
        match self.ledger.lock(
            &mut self.deposits,
            &BlockClock,
            &env::current_account_id(),
            &sender_id,
            params,
        ) {
            Ok(_) => {
                self.charge_storage(&sender_id, initial_storage);
                PromiseOrValue::Value(U128(0))
            }
            Err(err) => {
                // Nothing moved, so the credit is still there to take back.
                self.deposits
                    .debit(&sender_id, &asset_id, amount.0)
                    .unwrap_or_else(|err| env::panic_str(&err.to_string()));
                self.deposits.approve(&sender_id, &asset_id, allowance);
                log!("Lock rejected, refunding {} of {}: {}", amount.0, asset_id, err);
                PromiseOrValue::Value(amount)
            }
        }
    }

    /// Sends deposited tokens back to the caller's account on the token contract.
    #[payable]
    pub fn withdraw(&mut self, asset_id: AssetId, amount: U128) -> Promise {
        assert_one_yocto();
        let account_id = env::predecessor_account_id();
        self.deposits
            .assert_available_for_withdrawal(&account_id, &asset_id, amount.0);
        self.deposits
            .debit(&account_id, &asset_id, amount.0)
            .unwrap_or_else(|err| env::panic_str(&err.to_string()));
        log_custody_event("WITHDRAWING", &account_id, &asset_id, amount.0);

        ext_fungible_token::ext(asset_id.clone())
            .with_attached_deposit(NearToken::from_yoctonear(1))
            .with_static_gas(GAS_FOR_FT_TRANSFER)
            .ft_transfer(account_id.clone(), amount, Some("HTLC withdrawal".to_string()))
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RESOLVE_WITHDRAW)
                    .on_withdraw_resolved(account_id, asset_id, amount),
            )
    }

    /// Prepays storage for `account_id`, or the caller when omitted.
    #[payable]
    pub fn storage_deposit(&mut self, account_id: Option<AccountId>) -> U128 {
        let account_id = account_id.unwrap_or_else(env::predecessor_account_id);
        let amount = env::attached_deposit();
        require!(!amount.is_zero(), "Requires attached deposit");

        let initial_storage = self.measure_storage();
        self.storage.deposit(&account_id, amount);
        self.charge_storage(&account_id, initial_storage);
        U128(self.storage.balance_of(&account_id).as_yoctonear())
    }

    /// Returns unspent prepaid storage to the caller, all of it when `amount` is omitted.
    #[payable]
    pub fn storage_withdraw(&mut self, amount: Option<U128>) -> U128 {
        assert_one_yocto();
        let account_id = env::predecessor_account_id();
        let amount = amount
            .map(|amount| NearToken::from_yoctonear(amount.0))
            .unwrap_or_else(|| self.storage.balance_of(&account_id));
        let remaining = self.storage.withdraw(&account_id, amount);
        if !amount.is_zero() {
            Promise::new(account_id).transfer(amount);
        }
        U128(remaining.as_yoctonear())
    }

    // --- VIEWS ---

    pub fn get_lock(&self, commitment_hash: Base58CryptoHash) -> Option<LockView> {
        match self.ledger.state_of(&commitment_hash.into()) {
            LockState::Active(record) => Some(LockView::from(&record)),
            LockState::Absent => None,
        }
    }

    pub fn get_locks(&self, from_index: Option<u32>, limit: Option<u32>) -> Vec<LockView> {
        self.ledger
            .iter()
            .skip(from_index.unwrap_or(0) as usize)
            .take(limit.unwrap_or(u32::MAX) as usize)
            .map(LockView::from)
            .collect()
    }

    pub fn lock_count(&self) -> u32 {
        self.ledger.len()
    }

    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Commitment the contract expects for `pre_image`.
    pub fn hash_pre_image(&self, pre_image: Base64VecU8) -> Base58CryptoHash {
        self.hash_function.digest(&pre_image.0).into()
    }

    pub fn balance_of(&self, account_id: AccountId, asset_id: AssetId) -> U128 {
        U128(self.deposits.balance_of(&account_id, &asset_id))
    }

    pub fn allowance(&self, owner_id: AccountId, asset_id: AssetId) -> U128 {
        U128(self.deposits.allowance(&owner_id, &asset_id))
    }

    pub fn custody_balance(&self, asset_id: AssetId) -> U128 {
        U128(
            self.deposits
                .balance_of(&env::current_account_id(), &asset_id),
        )
    }

    pub fn storage_balance_of(&self, account_id: AccountId) -> U128 {
        U128(self.storage.balance_of(&account_id).as_yoctonear())
    }

    // --- PRIVATE CALLBACKS ---
    #[private]
    pub fn on_withdraw_resolved(
        &mut self,
        #[callback_result] result: Result<(), PromiseError>,
        account_id: AccountId,
        asset_id: AssetId,
        amount: U128,
    ) -> U128 {
        if result.is_err() {
            self.deposits.credit(&account_id, &asset_id, amount.0);
            log_custody_event("WITHDRAW_FAILED", &account_id, &asset_id, amount.0);
            return U128(0);
        }
        log_custody_event("WITHDRAWN", &account_id, &asset_id, amount.0);
        amount
    }
}

impl Contract {
    /// Writes cached collection changes through and reads the storage in use.
    fn measure_storage(&mut self) -> StorageUsage {
        self.ledger.flush();
        self.deposits.flush();
        self.storage.flush();
        env::storage_usage()
    }

    /// Charges `payer` for the bytes added since `initial_storage`.
    fn charge_storage(&mut self, payer: &AccountId, initial_storage: StorageUsage) {
        let added = self.measure_storage().saturating_sub(initial_storage);
        let cost = env::storage_byte_cost().saturating_mul(u128::from(added));
        self.storage.charge(payer, cost);
    }
}
