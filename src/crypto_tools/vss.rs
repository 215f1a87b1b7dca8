//! Helpers for verifiable secret sharing over the order-`q` subgroup of Z_p*
use num_bigint_dig::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{arith, group::GroupParams};
use crate::sdk::api::{HerbFatal, HerbResult};

/// A random polynomial over Z_q. The constant term is the dealer's secret
/// contribution; `coeff_count` coefficients support reconstruction from
/// `coeff_count` evaluations.
#[derive(Debug, Zeroize, ZeroizeOnDrop)]
pub struct Vss {
    secret_coeffs: Vec<BigUint>,
}

impl Vss {
    pub fn new(group: &GroupParams, coeff_count: usize, rng: &mut (impl CryptoRng + RngCore)) -> Self {
        let secret_coeffs: Vec<BigUint> = (0..coeff_count)
            .map(|_| arith::random_scalar(rng, group.q()))
            .collect();
        Self { secret_coeffs }
    }

    pub fn commit(&self, group: &GroupParams) -> Commit {
        Commit {
            coeff_commits: self
                .secret_coeffs
                .iter()
                .map(|coeff| group.pow_g(coeff))
                .collect(),
        }
    }

    /// Evaluate the polynomial at `index + 1` using Horner's method
    /// (vss indices start at 1)
    pub fn share(&self, group: &GroupParams, index: usize) -> BigUint {
        let x = BigUint::from(index as u64 + 1);
        self.secret_coeffs
            .iter()
            .rev()
            .fold(BigUint::zero(), |acc, coeff| (acc * &x + coeff) % group.q())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    coeff_commits: Vec<BigUint>,
}

impl Commit {
    pub fn len(&self) -> usize {
        self.coeff_commits.len()
    }

    /// `prod_l C_l^{(index+1)^l} mod p`, the commitment to the share at
    /// `index + 1`, by Horner's method in the exponent
    pub fn share_commit(&self, group: &GroupParams, index: usize) -> BigUint {
        let x = BigUint::from(index as u64 + 1);
        self.coeff_commits
            .iter()
            .rev()
            .fold(BigUint::one(), |acc, commit| {
                acc.modpow(&x, group.p()) * commit % group.p()
            })
    }

    /// The commitment to the constant term, doubling as the dealer's
    /// public-key share
    pub fn secret_commit(&self) -> &BigUint {
        &self.coeff_commits[0]
    }

    pub fn validate_share(&self, group: &GroupParams, share: &BigUint, index: usize) -> bool {
        group.pow_g(share) == self.share_commit(group, index)
    }
}

/// Lagrange coefficient at zero for position `i` of `indices`, in the
/// exponent ring mod `q`. Indices are zero-based; the evaluation points
/// are `index + 1`. Differences go negative, so both products run through
/// the signed reduction before the single inversion.
pub fn lagrange_coefficient(i: usize, indices: &[usize], q: &BigUint) -> HerbResult<BigUint> {
    let points: Vec<BigInt> = indices
        .iter()
        .map(|&index| BigInt::from(index as u64 + 1))
        .collect();

    let (numerator, denominator) = points.iter().enumerate().fold(
        (BigInt::one(), BigInt::one()),
        |(num, den), (j, point_j)| {
            if j == i {
                (num, den)
            } else {
                (num * point_j, den * (point_j - &points[i]))
            }
        },
    );

    let denominator = arith::mod_signed(&denominator, q);
    if denominator.is_zero() {
        error!("denominator in lagrange coefficient computation is 0");
        return Err(HerbFatal);
    }

    Ok(arith::mod_signed(&numerator, q) * arith::mod_inv(&denominator, q)? % q)
}
