use near_sdk::{near, AccountId, Timestamp};

use crate::error::{RemittanceError, RemittanceResult};
use crate::ledger::Account;

const NANOS_IN_SEC: u64 = 1_000_000_000;

/// How expiry is decided. `Elapsed` compares against the block clock;
/// `Fixed` pins the answer so time-dependent paths can be exercised without
/// waiting for the window to pass.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    #[default]
    Elapsed,
    Fixed { expired: bool },
}

/// Decides whether a withdraw or cancel may go ahead for an account.
#[near(serializers = [borsh])]
#[derive(Clone, Debug)]
pub struct EscrowPolicy {
    // Window length in nanoseconds, measured from `Account::created_at`.
    pub expiry_duration: u64,
    pub expiry: ExpiryPolicy,
}

impl EscrowPolicy {
    pub fn new(expiry_duration_sec: u64, expiry: ExpiryPolicy) -> Self {
        Self {
            expiry_duration: expiry_duration_sec.saturating_mul(NANOS_IN_SEC),
            expiry,
        }
    }

    pub fn expiry_duration_sec(&self) -> u64 {
        self.expiry_duration / NANOS_IN_SEC
    }

    pub fn expires_at(&self, account: &Account) -> Timestamp {
        account.created_at.saturating_add(self.expiry_duration)
    }

    pub fn is_expired(&self, account: &Account, now: Timestamp) -> bool {
        match self.expiry {
            ExpiryPolicy::Elapsed => now >= self.expires_at(account),
            ExpiryPolicy::Fixed { expired } => expired,
        }
    }

    /// The recipient may claim while the window is still open.
    pub fn authorize_withdraw(
        &self,
        account: Option<&Account>,
        now: Timestamp,
    ) -> RemittanceResult<()> {
        let account = account
            .filter(|account| account.is_active())
            .ok_or(RemittanceError::NotFound("no active account matches this password"))?;
        if self.is_expired(account, now) {
            return Err(RemittanceError::Expired);
        }
        Ok(())
    }

    /// Only the depositor may take the funds back, and only once the window
    /// has closed.
    pub fn authorize_cancel(
        &self,
        account: Option<&Account>,
        caller: &AccountId,
        now: Timestamp,
    ) -> RemittanceResult<()> {
        let account = account
            .filter(|account| account.is_active())
            .ok_or(RemittanceError::NotFound("no active account for this commitment"))?;
        if account.depositor != *caller {
            return Err(RemittanceError::Unauthorized);
        }
        if !self.is_expired(account, now) {
            return Err(RemittanceError::TooEarly);
        }
        Ok(())
    }
}
