use near_sdk::{env, near, store::LookupMap, AccountId, NearToken};

/// NEAR prepaid by accounts to cover the contract storage their calls add.
///
/// Balances come from `storage_deposit` or from the deposit attached to a
/// storage-growing call. Released storage is not credited back.
#[near(serializers = [borsh])]
pub struct StorageManager {
    balances: LookupMap<AccountId, NearToken>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self {
            balances: LookupMap::new(b"s"),
        }
    }

    pub fn balance_of(&self, account_id: &AccountId) -> NearToken {
        self.balances
            .get(account_id)
            .copied()
            .unwrap_or(NearToken::from_yoctonear(0))
    }

    pub fn deposit(&mut self, account_id: &AccountId, amount: NearToken) {
        if amount.is_zero() {
            return;
        }
        let balance = self.balance_of(account_id).saturating_add(amount);
        self.balances.insert(account_id.clone(), balance);
    }

    /// Takes `cost` out of the account's prepaid balance, panicking if it falls short.
    pub fn charge(&mut self, account_id: &AccountId, cost: NearToken) {
        if cost.is_zero() {
            return;
        }
        let remaining = self
            .balance_of(account_id)
            .checked_sub(cost)
            .unwrap_or_else(|| {
                env::panic_str(&format!(
                    "Insufficient storage balance: {} yoctoNEAR required, attach a deposit or call storage_deposit",
                    cost.as_yoctonear()
                ))
            });
        self.balances.insert(account_id.clone(), remaining);
    }

    pub fn withdraw(&mut self, account_id: &AccountId, amount: NearToken) -> NearToken {
        let remaining = self
            .balance_of(account_id)
            .checked_sub(amount)
            .unwrap_or_else(|| env::panic_str("Withdrawal exceeds storage balance"));
        self.balances.insert(account_id.clone(), remaining);
        remaining
    }

    pub fn flush(&mut self) {
        self.balances.flush();
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::{accounts, VMContextBuilder};
    use near_sdk::testing_env;

    #[test]
    fn charge_draws_from_prepaid_balance() {
        testing_env!(VMContextBuilder::new().build());
        let mut storage = StorageManager::new();
        storage.deposit(&accounts(1), NearToken::from_yoctonear(100));

        storage.charge(&accounts(1), NearToken::from_yoctonear(30));
        storage.charge(&accounts(2), NearToken::from_yoctonear(0));

        assert_eq!(storage.balance_of(&accounts(1)).as_yoctonear(), 70);
        assert_eq!(storage.withdraw(&accounts(1), NearToken::from_yoctonear(70)).as_yoctonear(), 0);
    }

    #[test]
    #[should_panic(expected = "Insufficient storage balance")]
    fn charge_over_balance_panics() {
        testing_env!(VMContextBuilder::new().build());
        let mut storage = StorageManager::new();
        storage.deposit(&accounts(1), NearToken::from_yoctonear(10));
        storage.charge(&accounts(1), NearToken::from_yoctonear(11));
    }
}
