use near_sdk::{env, AccountId};

// Helper for consistent logging of balance movements outside of locks
pub fn log_custody_event(event: &str, account_id: &AccountId, asset_id: &AccountId, amount: u128) {
    env::log_str(&format!(
        "CUSTODY_{}: account='{}', asset='{}', amount='{}'",
        event, account_id, asset_id, amount
    ));
}
