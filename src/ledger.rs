use near_sdk::store::IterableMap;
use near_sdk::{env, near, AccountId, NearToken, Timestamp};

use crate::commitment::{Commitment, EMPTY_COMMITMENT};
use crate::error::{RemittanceError, RemittanceResult};
use crate::events::{AccountCreated, EventSink, Released};

/// Funds held for one commitment. A zero `amount` means nothing is claimable.
#[near(serializers = [json, borsh])]
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub amount: NearToken,
    pub depositor: AccountId,
    pub created_at: Timestamp,
    // Set once the account has paid out. Only a failed payout clears it.
    pub retired: bool,
}

impl Account {
    pub fn is_active(&self) -> bool {
        !self.retired && self.amount.as_yoctonear() > 0
    }
}

#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitmentState {
    NeverUsed,
    Active,
    Retired,
}

/// Outcome of a successful `create`: the event, what the new record costs in
/// storage staking, and whatever the depositor attached beyond both.
#[derive(Clone, Debug, PartialEq)]
pub struct Funding {
    pub event: AccountCreated,
    pub storage_cost: NearToken,
    pub refund: NearToken,
}

#[near(serializers = [borsh])]
pub struct AccountLedger {
    // Records are never deleted, so a commitment stays spent forever. The
    // `retired` flag lives in the record itself so retiring never grows storage.
    pub accounts: IterableMap<Commitment, Account>,
    pub locked: NearToken,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self {
            accounts: IterableMap::new(b"a"),
            locked: NearToken::from_yoctonear(0),
        }
    }

    pub fn get(&self, commitment: &Commitment) -> Option<&Account> {
        self.accounts.get(commitment)
    }

    pub fn state(&self, commitment: &Commitment) -> CommitmentState {
        match self.accounts.get(commitment) {
            None => CommitmentState::NeverUsed,
            Some(account) if account.retired => CommitmentState::Retired,
            Some(_) => CommitmentState::Active,
        }
    }

    pub fn locked_balance(&self) -> NearToken {
        self.locked
    }

    /// Escrows `amount` out of `attached`. The depositor also pays the
    /// storage staking for the new record, which stays with the contract.
    pub fn create(
        &mut self,
        commitment: Commitment,
        amount: NearToken,
        attached: NearToken,
        depositor: AccountId,
        now: Timestamp,
        sink: &mut impl EventSink,
    ) -> RemittanceResult<Funding> {
        if commitment == EMPTY_COMMITMENT {
            return Err(RemittanceError::InvalidInput("commitment should not be empty"));
        }
        if amount.as_yoctonear() == 0 {
            return Err(RemittanceError::InvalidInput("deposit amount must be positive"));
        }
        if self.state(&commitment) != CommitmentState::NeverUsed {
            return Err(RemittanceError::Conflict);
        }
        let spare = attached.checked_sub(amount).ok_or(RemittanceError::InvalidInput(
            "attached deposit is less than the amount",
        ))?;

        let initial_storage = env::storage_usage();
        self.accounts.insert(
            commitment,
            Account {
                amount,
                depositor: depositor.clone(),
                created_at: now,
                retired: false,
            },
        );
        self.accounts.flush();
        let storage_used = env::storage_usage().saturating_sub(initial_storage);
        let storage_cost = env::storage_byte_cost().saturating_mul(u128::from(storage_used));

        let Some(refund) = spare.checked_sub(storage_cost) else {
            self.accounts.remove(&commitment);
            self.accounts.flush();
            return Err(RemittanceError::InvalidInput(
                "attached deposit does not cover account storage",
            ));
        };
        self.locked = self.locked.saturating_add(amount);

        let event = AccountCreated {
            commitment: commitment.into(),
            depositor,
            amount,
        };
        sink.on_account_created(&event);
        Ok(Funding {
            event,
            storage_cost,
            refund,
        })
    }

    /// Empties the account and retires its commitment. Authorization is the
    /// caller's job; this only refuses commitments with nothing to pay out.
    /// The release is announced once the payout settles, not here.
    pub fn release(
        &mut self,
        commitment: &Commitment,
        actor: &AccountId,
    ) -> RemittanceResult<Released> {
        let account = self
            .accounts
            .get_mut(commitment)
            .filter(|account| account.is_active())
            .ok_or(RemittanceError::NotFound("no active account for this commitment"))?;

        let amount = account.amount;
        account.amount = NearToken::from_yoctonear(0);
        account.retired = true;
        self.locked = self.locked.saturating_sub(amount);

        Ok(Released {
            commitment: (*commitment).into(),
            actor: actor.clone(),
            amount,
        })
    }

    /// Puts back `amount` after the payout transfer for `commitment` failed.
    /// Depositor and creation time were never cleared, so the account comes
    /// back exactly as it was.
    pub fn restore(&mut self, commitment: &Commitment, amount: NearToken) -> bool {
        match self.accounts.get_mut(commitment) {
            Some(account) if account.retired && account.amount.as_yoctonear() == 0 => {
                account.amount = amount;
                account.retired = false;
                self.locked = self.locked.saturating_add(amount);
                true
            }
            _ => false,
        }
    }
}

impl Default for AccountLedger {
    fn default() -> Self {
        Self::new()
    }
}
