use num_bigint_dig::BigUint;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    collections::TypedUsize,
    crypto_tools::group::GroupParams,
    sdk::api::{HerbFatal, HerbResult},
};

use super::{rng, BEACON_RNG_TAG};

pub use super::key_share::{GroupKeyInfo, KeyShare, ShareSecretInfo};
pub use super::node::{MsgOut, Node, RoundOutput, Status, StepOutput};
pub use super::rng::SecretSeedKey;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeaconNodeId;

pub const MAX_NODE_COUNT: usize = 1000;

/// Process-wide beacon parameters, immutable after validation.
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    threshold: usize,
    node_count: usize,
    round_max: u64,
    replier: bool,
    group: GroupParams,
}

impl BeaconConfig {
    /// Validate `1 <= threshold <= node_count` and the safe prime, and
    /// derive the subgroup generator. `round_max = 0` means key generation
    /// only.
    pub fn new(
        threshold: usize,
        node_count: usize,
        safe_prime: BigUint,
        round_max: u64,
        replier: bool,
    ) -> HerbResult<Self> {
        if node_count == 0
            || node_count > MAX_NODE_COUNT
            || threshold == 0
            || threshold > node_count
        {
            error!(
                "invalid (threshold, node_count, max_node_count): ({},{},{})",
                threshold, node_count, MAX_NODE_COUNT
            );
            return Err(HerbFatal);
        }
        let group = GroupParams::new(safe_prime)?;
        Ok(Self {
            threshold,
            node_count,
            round_max,
            replier,
            group,
        })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn round_max(&self) -> u64 {
        self.round_max
    }

    pub fn replier(&self) -> bool {
        self.replier
    }

    pub(super) fn group(&self) -> &GroupParams {
        &self.group
    }
}

/// Initialize a new beacon node.
/// The node reacts to `Node::start` and `Node::msg_in`; the caller owns
/// transport and scheduling.
pub fn new_node(
    config: BeaconConfig,
    my_id: TypedUsize<BeaconNodeId>,
    seed_key: &SecretSeedKey,
    session_nonce: &[u8],
) -> HerbResult<Node> {
    if my_id.as_usize() >= config.node_count() {
        error!(
            "node id {} out of bounds {}",
            my_id,
            config.node_count()
        );
        return Err(HerbFatal);
    }
    let rng = rng::rng_seed(BEACON_RNG_TAG, my_id, seed_key, session_nonce)?;
    Ok(Node::new(config, my_id, rng))
}
