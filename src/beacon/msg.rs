use num_bigint_dig::BigUint;
use serde::{Deserialize, Serialize};

use crate::{
    collections::TypedUsize,
    crypto_tools::{
        elgamal,
        vss,
        zkp::{chaum_pedersen, schnorr},
    },
    sdk::{
        api::{BytesVec, HerbResult},
        wire_bytes,
    },
};

use super::api::BeaconNodeId;

/// Peer-to-peer protocol messages. The transport tags each delivery with the
/// sender; the wire envelope repeats the sender id so the node can
/// cross-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) enum Msg {
    /// Key generation: a point on the dealer's polynomial plus the full
    /// commitment vector. `commit[0]` doubles as the dealer's public-key
    /// share.
    Subshare {
        subshare: BigUint,
        commit: vss::Commit,
    },
    /// Beacon: this node's ciphertext contribution for `round`, with a
    /// Schnorr proof of knowledge of the encryption randomness
    EncShare {
        ciphertext: elgamal::Ciphertext,
        proof: schnorr::Proof,
        round: u64,
    },
    /// Beacon: this node's partial decryption for `round`, with a DLEQ proof
    /// that it was computed with the same share that `y` commits to.
    /// `a_combined` is the ciphertext aggregate the sender decrypted against.
    DecShare {
        partial: BigUint,
        proof: chaum_pedersen::Proof,
        y: BigUint,
        a_combined: BigUint,
        round: u64,
    },
}

pub(super) fn encode(msg: &Msg, from: TypedUsize<BeaconNodeId>) -> HerbResult<BytesVec> {
    wire_bytes::encode_message(wire_bytes::serialize(msg)?, from)
}
