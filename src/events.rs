use near_sdk::json_types::Base58CryptoHash;
use near_sdk::{bs58, env, near, AccountId, CryptoHash, NearToken};

/// Emitted once a deposit is locked under a fresh commitment.
#[near(serializers = [json])]
#[derive(Clone, Debug, PartialEq)]
pub struct AccountCreated {
    pub commitment: Base58CryptoHash,
    pub depositor: AccountId,
    pub amount: NearToken,
}

/// Emitted when funds leave the ledger, either to the recipient (withdraw)
/// or back to the depositor (cancel). Consumers tell them apart by `actor`.
#[near(serializers = [json])]
#[derive(Clone, Debug, PartialEq)]
pub struct Released {
    pub commitment: Base58CryptoHash,
    pub actor: AccountId,
    pub amount: NearToken,
}

pub trait EventSink {
    fn on_account_created(&mut self, event: &AccountCreated);
    /// Called once the payout transfer has settled, never for a release
    /// that was rolled back.
    fn on_release(&mut self, event: &Released);
}

/// Writes events to the receipt log.
pub struct LogSink;

impl EventSink for LogSink {
    fn on_account_created(&mut self, event: &AccountCreated) {
        log_remittance_event(
            "CREATED",
            &event.commitment.into(),
            "depositor",
            &event.depositor,
            event.amount,
        );
    }

    fn on_release(&mut self, event: &Released) {
        log_remittance_event(
            "RELEASED",
            &event.commitment.into(),
            "actor",
            &event.actor,
            event.amount,
        );
    }
}

// Helper for consistent logging
pub fn log_remittance_event(
    event: &str,
    commitment: &CryptoHash,
    role: &str,
    who: &AccountId,
    amount: NearToken,
) {
    env::log_str(&format!(
        "REMITTANCE_{}: commitment='{}', {}='{}', amount='{}'",
        event,
        bs58::encode(commitment).into_string(),
        role,
        who,
        amount.as_yoctonear()
    ));
}
