//! ElGamal ciphertexts over Z_p* and their homomorphic combination
use num_bigint_dig::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use super::{arith, group::GroupParams};
use crate::sdk::api::HerbResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub a: BigUint,
    pub b: BigUint,
}

/// `(a, b) = (g^r, m * h^r) mod p` where `h` is the group encryption key
pub fn encrypt(group: &GroupParams, h: &BigUint, m: &BigUint, r: &BigUint) -> Ciphertext {
    Ciphertext {
        a: group.pow_g(r),
        b: m * h.modpow(r, group.p()) % group.p(),
    }
}

/// Componentwise product of ciphertexts: the encryption of the product of
/// the plaintexts under the sum of the randomness
pub fn combine<'a>(
    group: &GroupParams,
    ciphertexts: impl Iterator<Item = &'a Ciphertext>,
) -> (BigUint, BigUint) {
    ciphertexts.fold((BigUint::one(), BigUint::one()), |(a, b), ciphertext| {
        (a * &ciphertext.a % group.p(), b * &ciphertext.b % group.p())
    })
}

/// One node's contribution `A^share mod p` to the group decryption
pub fn partial_decrypt(group: &GroupParams, a_combined: &BigUint, share: &BigUint) -> BigUint {
    a_combined.modpow(share, group.p())
}

/// Unblind: `b * m_combined^-1 mod p` recovers the plaintext (product)
/// once `m_combined = a^s` has been reconstructed
pub fn recover(group: &GroupParams, b: &BigUint, m_combined: &BigUint) -> HerbResult<BigUint> {
    Ok(b * arith::mod_inv(m_combined, group.p())? % group.p())
}
