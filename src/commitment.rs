use near_sdk::{borsh, env, AccountId, CryptoHash};

use crate::error::{RemittanceError, RemittanceResult};

// Key of a remittance account: sha256 over (recipient, password, contract id).
pub type Commitment = CryptoHash;

pub type Password = [u8; 32];

pub const EMPTY_COMMITMENT: Commitment = [0u8; 32];
pub const EMPTY_PASSWORD: Password = [0u8; 32];

/// Parses a raw password. Passwords are fixed at 32 bytes so that the
/// all-zero value can act as the "no secret" sentinel.
pub fn password_from_bytes(bytes: &[u8]) -> RemittanceResult<Password> {
    bytes
        .try_into()
        .map_err(|_| RemittanceError::InvalidInput("password must be 32 bytes"))
}

/// Derives the commitment binding `recipient` and `password` to one contract
/// instance. The preimage is the borsh encoding of
/// `(String, [u8; 32], String)`, so clients can recompute it off-chain.
pub fn compute_commitment(
    recipient: &AccountId,
    password: &Password,
    instance: &AccountId,
) -> RemittanceResult<Commitment> {
    if *password == EMPTY_PASSWORD {
        return Err(RemittanceError::InvalidInput("password should not be empty"));
    }

    let preimage = borsh::to_vec(&(recipient.as_str(), password, instance.as_str()))
        .map_err(|_| RemittanceError::InvalidInput("commitment preimage is not encodable"))?;
    Ok(env::sha256_array(&preimage))
}

pub fn validate_commitment(
    candidate: &Commitment,
    recipient: &AccountId,
    password: &Password,
    instance: &AccountId,
) -> RemittanceResult<bool> {
    Ok(compute_commitment(recipient, password, instance)? == *candidate)
}
