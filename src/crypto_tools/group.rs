//! Group parameters for the order-`q` subgroup of Z_p*, `p` a safe prime
use num_bigint_dig::{prime::probably_prime, BigUint};
use tracing::error;

use super::arith;
use crate::sdk::api::{HerbFatal, HerbResult};

/// Rounds of Miller-Rabin for configuration-time primality checks.
const PRIMALITY_ROUNDS: usize = 20;

/// Immutable after construction. All group arithmetic is mod `p`,
/// all exponent arithmetic is mod `q = (p - 1) / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupParams {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

impl GroupParams {
    pub fn new(safe_prime: BigUint) -> HerbResult<Self> {
        if safe_prime < BigUint::from(7u32) {
            error!("modulus {} is too small", safe_prime);
            return Err(HerbFatal);
        }
        if !probably_prime(&safe_prime, PRIMALITY_ROUNDS) {
            error!("modulus {} is not prime", safe_prime);
            return Err(HerbFatal);
        }
        let q = (&safe_prime - 1u32) >> 1;
        if !probably_prime(&q, PRIMALITY_ROUNDS) {
            error!("modulus {} is not a safe prime", safe_prime);
            return Err(HerbFatal);
        }
        let g = arith::find_generator(&safe_prime)?;
        Ok(Self {
            p: safe_prime,
            q,
            g,
        })
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// `g^e mod p`
    pub fn pow_g(&self, e: &BigUint) -> BigUint {
        self.g.modpow(e, &self.p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_prime_accepted() {
        let group = GroupParams::new(BigUint::from(1019u32)).unwrap();
        assert_eq!(group.q(), &BigUint::from(509u32));
        assert_eq!(group.g(), &BigUint::from(4u32));

        // the generator has order q: g^q = 1 and g != 1
        let one = BigUint::from(1u32);
        assert_eq!(group.g().modpow(group.q(), group.p()), one);
        assert_ne!(group.g(), &one);
    }

    #[test]
    fn bad_modulus_rejected() {
        // composite
        assert!(GroupParams::new(BigUint::from(1021u32 * 3u32)).is_err());
        // prime but not safe: (13 - 1) / 2 = 6
        assert!(GroupParams::new(BigUint::from(13u32)).is_err());
        // too small
        assert!(GroupParams::new(BigUint::from(5u32)).is_err());
    }
}
