use near_sdk::json_types::{Base58CryptoHash, Base64VecU8};
use near_sdk::{env, ext_contract, log, near, AccountId, NearToken, Promise, PromiseError};

mod commitment;
mod error;
mod events;
mod ledger;
mod policy;

pub use commitment::{Commitment, Password};
pub use error::RemittanceError;
pub use events::{AccountCreated, Released};
pub use ledger::{Account, CommitmentState};
pub use policy::ExpiryPolicy;

use commitment::{password_from_bytes, EMPTY_COMMITMENT};
use events::{log_remittance_event, EventSink, LogSink};
use ledger::AccountLedger;
use policy::EscrowPolicy;

const DEFAULT_EXPIRY_SEC: u64 = 7 * 24 * 60 * 60;

#[ext_contract(ext_self)]
pub trait SelfCallbacks {
    fn on_release_settled(
        &mut self,
        commitment: Base58CryptoHash,
        actor: AccountId,
        amount: NearToken,
    ) -> Option<Released>;
}

#[near(contract_state)]
pub struct Remittance {
    // Every deposit ever made, keyed by commitment.
    pub ledger: AccountLedger,
    pub policy: EscrowPolicy,
}

impl Default for Remittance {
    fn default() -> Self {
        Self {
            ledger: AccountLedger::new(),
            policy: EscrowPolicy::new(DEFAULT_EXPIRY_SEC, ExpiryPolicy::Elapsed),
        }
    }
}

#[near]
impl Remittance {
    #[init]
    pub fn new(expiry_duration_sec: u64, expiry_policy: Option<ExpiryPolicy>) -> Self {
        Self {
            ledger: AccountLedger::new(),
            policy: EscrowPolicy::new(expiry_duration_sec, expiry_policy.unwrap_or_default()),
        }
    }

    /// Commitment a depositor should fund so that only `recipient`, knowing
    /// `password`, can withdraw from this contract.
    #[handle_result]
    pub fn compute_commitment(
        &self,
        recipient: AccountId,
        password: Base64VecU8,
    ) -> Result<Base58CryptoHash, RemittanceError> {
        let password = password_from_bytes(&password.0)?;
        commitment::compute_commitment(&recipient, &password, &env::current_account_id()).map(Into::into)
    }

    #[handle_result]
    pub fn validate_commitment(
        &self,
        commitment: Base58CryptoHash,
        recipient: AccountId,
        password: Base64VecU8,
    ) -> Result<bool, RemittanceError> {
        let password = password_from_bytes(&password.0)?;
        commitment::validate_commitment(
            &commitment.into(),
            &recipient,
            &password,
            &env::current_account_id(),
        )
    }

    /// Locks `amount` under `commitment`. The attached deposit must also
    /// cover the storage the new record takes; anything beyond that is sent
    /// back. Each commitment can be funded once, ever.
    #[payable]
    #[handle_result]
    pub fn create_account(
        &mut self,
        commitment: Base58CryptoHash,
        amount: NearToken,
    ) -> Result<AccountCreated, RemittanceError> {
        let depositor = env::predecessor_account_id();
        let funding = self.ledger.create(
            commitment.into(),
            amount,
            env::attached_deposit(),
            depositor.clone(),
            env::block_timestamp(),
            &mut LogSink,
        )?;

        if funding.refund.as_yoctonear() > 0 {
            Promise::new(depositor).transfer(funding.refund);
        }
        Ok(funding.event)
    }

    /// Pays the caller the account whose commitment is
    /// `(caller, password, this contract)`, if it has not expired.
    #[handle_result]
    pub fn withdraw(&mut self, password: Base64VecU8) -> Result<Promise, RemittanceError> {
        let caller = env::predecessor_account_id();
        let password = password_from_bytes(&password.0)?;
        let commitment = commitment::compute_commitment(&caller, &password, &env::current_account_id())?;

        self.policy
            .authorize_withdraw(self.ledger.get(&commitment), env::block_timestamp())?;
        let released = self.ledger.release(&commitment, &caller)?;

        Ok(Self::pay_out(released))
    }

    /// Returns an expired, unclaimed account to its depositor.
    #[handle_result]
    pub fn cancel(&mut self, commitment: Base58CryptoHash) -> Result<Promise, RemittanceError> {
        let commitment: Commitment = commitment.into();
        if commitment == EMPTY_COMMITMENT {
            return Err(RemittanceError::InvalidInput("commitment should not be empty"));
        }
        let caller = env::predecessor_account_id();

        self.policy.authorize_cancel(
            self.ledger.get(&commitment),
            &caller,
            env::block_timestamp(),
        )?;
        let released = self.ledger.release(&commitment, &caller)?;

        Ok(Self::pay_out(released))
    }

    pub fn get_expiry_duration(&self) -> u64 {
        self.policy.expiry_duration_sec()
    }

    pub fn get_expiry_policy(&self) -> ExpiryPolicy {
        self.policy.expiry
    }

    pub fn get_account(&self, commitment: Base58CryptoHash) -> Option<Account> {
        self.ledger.get(&commitment.into()).cloned()
    }

    pub fn get_commitment_state(&self, commitment: Base58CryptoHash) -> CommitmentState {
        self.ledger.state(&commitment.into())
    }

    pub fn get_locked_balance(&self) -> NearToken {
        self.ledger.locked_balance()
    }

    // --- PRIVATE CALLBACKS ---
    #[private]
    pub fn on_release_settled(
        &mut self,
        #[callback_result] result: Result<(), PromiseError>,
        commitment: Base58CryptoHash,
        actor: AccountId,
        amount: NearToken,
    ) -> Option<Released> {
        let released = Released {
            commitment,
            actor,
            amount,
        };
        if result.is_ok() {
            LogSink.on_release(&released);
            return Some(released);
        }

        // The failed transfer refunded `amount` to this contract.
        let commitment: Commitment = commitment.into();
        if self.ledger.restore(&commitment, amount) {
            log_remittance_event(
                "RELEASE_REVERTED",
                &commitment,
                "actor",
                &released.actor,
                amount,
            );
        } else {
            log!("Transfer failed but account could not be restored");
        }
        None
    }
}

impl Remittance {
    fn pay_out(released: Released) -> Promise {
        Promise::new(released.actor.clone())
            .transfer(released.amount)
            .then(ext_self::ext(env::current_account_id()).on_release_settled(
                released.commitment,
                released.actor,
                released.amount,
            ))
    }
}
