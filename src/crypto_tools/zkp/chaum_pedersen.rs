//! Non-interactive Chaum-Pedersen proof of discrete-log equality,
//! Fiat-Shamir transformed with transcript `[target1, target2, alpha1, alpha2]`
use num_bigint_dig::{BigInt, BigUint};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crypto_tools::{arith, group::GroupParams, hash};

// statement (base1, base2, target1, target2), witness (scalar)
//   such that target1 == base1^scalar and target2 == base2^scalar (mod p)
#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub group: &'a GroupParams,
    pub base1: &'a BigUint,
    pub base2: &'a BigUint,
    pub target1: &'a BigUint,
    pub target2: &'a BigUint,
}

#[derive(Clone, Debug)]
pub struct Witness<'a> {
    pub scalar: &'a BigUint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    alpha1: BigUint,
    alpha2: BigUint,
    r: BigUint,
}

pub fn prove(
    stmt: &Statement,
    wit: &Witness,
    rng: &mut (impl CryptoRng + RngCore),
) -> Proof {
    let w = arith::random_scalar(rng, stmt.group.q());
    let alpha1 = stmt.base1.modpow(&w, stmt.group.p());
    let alpha2 = stmt.base2.modpow(&w, stmt.group.p());
    let c = hash::to_scalar(
        &[stmt.target1, stmt.target2, &alpha1, &alpha2],
        stmt.group.q(),
    );
    // w - scalar*c goes negative; route it through the signed reduction
    let r = arith::mod_signed(
        &(BigInt::from(w) - BigInt::from(&c * wit.scalar)),
        stmt.group.q(),
    );
    Proof { alpha1, alpha2, r }
}

pub fn verify(stmt: &Statement, proof: &Proof) -> bool {
    let c = hash::to_scalar(
        &[stmt.target1, stmt.target2, &proof.alpha1, &proof.alpha2],
        stmt.group.q(),
    );
    let lhs1 = stmt.base1.modpow(&proof.r, stmt.group.p())
        * stmt.target1.modpow(&c, stmt.group.p())
        % stmt.group.p();
    let lhs2 = stmt.base2.modpow(&proof.r, stmt.group.p())
        * stmt.target2.modpow(&c, stmt.group.p())
        % stmt.group.p();
    let err = match (lhs1 == proof.alpha1, lhs2 == proof.alpha2) {
        (true, true) => return true,
        (false, false) => "fail both targets",
        (false, true) => "fail target1",
        (true, false) => "fail target2",
    };

    warn!("chaum pedersen verify failed: {}", err);

    false
}
