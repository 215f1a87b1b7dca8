//! Modular arithmetic helpers over arbitrary-precision integers
use num_bigint_dig::{BigInt, BigUint, ModInverse, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::error;

use crate::sdk::api::{HerbFatal, HerbResult};

/// Multiplicative inverse of `a` modulo the prime `m`.
/// Fatal if `gcd(a, m) != 1`; with a prime modulus that indicates a caller bug.
pub fn mod_inv(a: &BigUint, m: &BigUint) -> HerbResult<BigUint> {
    match a.mod_inverse(m) {
        Some(inv) => Ok(mod_signed(&inv, m)),
        None => {
            error!("no inverse for {} modulo {}", a, m);
            Err(HerbFatal)
        }
    }
}

/// Euclidean remainder in `[0, m)` for an integer of either sign.
/// Exponent arithmetic like `w - x*c` and Lagrange numerators like `j - i`
/// routinely go negative and must be reduced before use as an exponent
/// or as input to `mod_inv`.
pub fn mod_signed(x: &BigInt, m: &BigUint) -> BigUint {
    let r = x.mod_floor(&BigInt::from(m.clone()));
    // mod_floor with a positive modulus lands in [0, m)
    let (_, bytes) = r.to_bytes_be();
    BigUint::from_bytes_be(&bytes)
}

/// Find a generator of the order-`q` subgroup of Z_p* for a safe prime
/// `p = 2q + 1`: search for `x` with `x^2 != 1` and `x^q != 1 (mod p)`,
/// then return `x^2 mod p`.
pub fn find_generator(p: &BigUint) -> HerbResult<BigUint> {
    let one = BigUint::one();
    let q = (p - 1u32) >> 1;
    let mut x = BigUint::from(2u32);
    while &x < p {
        let x_squared = (&x * &x) % p;
        if x_squared != one && x.modpow(&q, p) != one {
            return Ok(x_squared);
        }
        x += 1u32;
    }
    error!("generator search exhausted: {} is not a safe prime", p);
    Err(HerbFatal)
}

/// Uniform draw from `{1, ..., q}`
pub fn random_scalar(rng: &mut (impl CryptoRng + RngCore), q: &BigUint) -> BigUint {
    rng.gen_biguint_range(&BigUint::one(), &(q + 1u32))
}

/// Uniform draw from `{1, ..., p-1}`, i.e. a nonzero residue
pub fn random_group_element(rng: &mut (impl CryptoRng + RngCore), p: &BigUint) -> BigUint {
    rng.gen_biguint_range(&BigUint::one(), p)
}
