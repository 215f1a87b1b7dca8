//! Non-interactive Schnorr proof of knowledge of a discrete log,
//! Fiat-Shamir transformed with transcript `[g, Y, u]`
use num_bigint_dig::BigUint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crypto_tools::{arith, group::GroupParams, hash};

#[derive(Clone, Debug)]
pub struct Statement<'a> {
    pub group: &'a GroupParams,
    /// `target = g^scalar mod p`
    pub target: &'a BigUint,
}

#[derive(Clone, Debug)]
pub struct Witness<'a> {
    pub scalar: &'a BigUint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    u: BigUint,
    c: BigUint,
    z: BigUint,
}

pub fn prove(
    stmt: &Statement,
    wit: &Witness,
    rng: &mut (impl CryptoRng + RngCore),
) -> Proof {
    let w = arith::random_scalar(rng, stmt.group.q());
    let u = stmt.group.pow_g(&w);
    let c = hash::to_scalar(&[stmt.group.g(), stmt.target, &u], stmt.group.q());
    let z = (w + &c * wit.scalar) % stmt.group.q();
    Proof { u, c, z }
}

pub fn verify(stmt: &Statement, proof: &Proof) -> bool {
    let c = hash::to_scalar(&[stmt.group.g(), stmt.target, &proof.u], stmt.group.q());
    if c != proof.c {
        warn!("schnorr verify failed: challenge mismatch");
        return false;
    }
    let lhs = stmt.group.pow_g(&proof.z);
    let rhs = &proof.u * stmt.target.modpow(&proof.c, stmt.group.p()) % stmt.group.p();
    if lhs != rhs {
        warn!("schnorr verify failed: group equation");
        return false;
    }
    true
}
