use near_sdk::{env, near, require, store::IterableMap, AccountId};

use crate::error::TransferError;
use crate::lock::AssetId;

/// Moves `amount` of `asset_id` between two accounts, all or nothing.
pub trait AssetTransfer {
    fn transfer_from(
        &mut self,
        asset_id: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;
}

/// In-contract ledger of NEP-141 tokens deposited by users.
///
/// The contract account's own entries are the HTLC custody. Allowances are
/// what an owner has authorised the contract to pull into custody.
#[near(serializers = [borsh])]
pub struct DepositManager {
    // (AccountId, TokenId) -> Balance
    pub balances: IterableMap<(AccountId, AssetId), u128>,
    pub allowances: IterableMap<(AccountId, AssetId), u128>,
}

impl DepositManager {
    pub fn new() -> Self {
        Self {
            balances: IterableMap::new(b"b"),
            allowances: IterableMap::new(b"a"),
        }
    }

    pub fn balance_of(&self, account_id: &AccountId, asset_id: &AssetId) -> u128 {
        self.balances
            .get(&(account_id.clone(), asset_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, owner_id: &AccountId, asset_id: &AssetId) -> u128 {
        self.allowances
            .get(&(owner_id.clone(), asset_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn credit(&mut self, account_id: &AccountId, asset_id: &AssetId, amount: u128) {
        let balance = self.balance_of(account_id, asset_id);
        self.set_balance(account_id, asset_id, balance + amount);
    }

    pub fn debit(
        &mut self,
        account_id: &AccountId,
        asset_id: &AssetId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let balance = self.balance_of(account_id, asset_id);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientFunds)?;
        self.set_balance(account_id, asset_id, remaining);
        Ok(())
    }

    /// Overwrites the allowance, like ERC-20 `approve`.
    pub fn approve(&mut self, owner_id: &AccountId, asset_id: &AssetId, amount: u128) {
        let key = (owner_id.clone(), asset_id.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    pub fn increase_allowance(&mut self, owner_id: &AccountId, asset_id: &AssetId, amount: u128) {
        let allowance = self.allowance(owner_id, asset_id);
        self.approve(owner_id, asset_id, allowance + amount);
    }

    pub fn assert_available_for_withdrawal(
        &self,
        account_id: &AccountId,
        asset_id: &AssetId,
        amount: u128,
    ) {
        require!(amount > 0, "Withdrawal amount must be positive");
        require!(
            self.balance_of(account_id, asset_id) >= amount,
            "Insufficient available funds for withdrawal"
        );
    }

    pub fn flush(&mut self) {
        self.balances.flush();
        self.allowances.flush();
    }

    fn set_balance(&mut self, account_id: &AccountId, asset_id: &AssetId, balance: u128) {
        let key = (account_id.clone(), asset_id.clone());
        if balance == 0 {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, balance);
        }
    }
}

impl AssetTransfer for DepositManager {
    fn transfer_from(
        &mut self,
        asset_id: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        if self.balance_of(from, asset_id) < amount {
            return Err(TransferError::InsufficientFunds);
        }
        // Spending out of custody needs no allowance.
        let spends_custody = *from == env::current_account_id();
        let allowance = self.allowance(from, asset_id);
        if !spends_custody && allowance < amount {
            return Err(TransferError::NotAuthorized);
        }

        self.debit(from, asset_id, amount)?;
        self.credit(to, asset_id, amount);
        if !spends_custody {
            self.approve(from, asset_id, allowance - amount);
        }
        Ok(())
    }
}

impl Default for DepositManager {
    fn default() -> Self {
        Self::new()
    }
}
