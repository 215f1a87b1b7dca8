//! Per-round bookkeeping for the beacon phase.
//!
//! Each round collects one ciphertext and one partial decryption per node.
//! Entries, once stored, are never overwritten. Partial decryptions are held
//! unverified until all `n` ciphertexts are in: only then is the aggregate
//! `A` known, and the DLEQ statement is checked against the locally
//! recomputed aggregate rather than the one carried in the message.
use num_bigint_dig::BigUint;

use crate::{
    collections::FillVecMap,
    crypto_tools::{elgamal, zkp::chaum_pedersen},
};

use super::api::BeaconNodeId;

/// A decryption share buffered until the local ciphertext set is complete
#[derive(Debug, Clone)]
pub(super) struct PendingDec {
    pub(super) partial: BigUint,
    pub(super) proof: chaum_pedersen::Proof,
    pub(super) y: BigUint,
    pub(super) a_combined: BigUint,
}

pub(super) struct RoundState {
    /// verified ciphertext contributions
    pub(super) enc: FillVecMap<BeaconNodeId, elgamal::Ciphertext>,
    /// decryption shares awaiting the local aggregate
    pub(super) dec_pending: FillVecMap<BeaconNodeId, PendingDec>,
    /// verified partial decryptions
    pub(super) dec: FillVecMap<BeaconNodeId, BigUint>,
    /// `(A, B) = (prod_i a_i, prod_i b_i) mod p`, set once `enc` is full
    pub(super) combined: Option<(BigUint, BigUint)>,
}

impl RoundState {
    pub(super) fn with_size(node_count: usize) -> Self {
        Self {
            enc: FillVecMap::with_size(node_count),
            dec_pending: FillVecMap::with_size(node_count),
            dec: FillVecMap::with_size(node_count),
            combined: None,
        }
    }
}
