use num_bigint_dig::BigUint;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::collections::{TypedUsize, VecMap};

use super::api::BeaconNodeId;

/// Final output of key generation, frozen for the lifetime of the node.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyShare {
    group: GroupKeyInfo,
    share: ShareSecretInfo,
}

/// `GroupKeyInfo` is the same for all nodes
#[derive(Debug, Clone, PartialEq)]
pub struct GroupKeyInfo {
    /// group encryption key `h = g^s mod p`
    h: BigUint,
    /// per-node public-key shares `g^{a_{j,0}} mod p`; their product is `h`
    pk_shares: VecMap<BeaconNodeId, BigUint>,
    threshold: usize,
}

/// `ShareSecretInfo` is unique to each node.
/// `index` is not secret but it's stored here anyway
/// because it's an essential part of secret data.
#[derive(Debug, Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct ShareSecretInfo {
    #[zeroize(skip)]
    index: TypedUsize<BeaconNodeId>,
    /// accumulated private share `x_i = sum_j f_j(i) mod q`
    x_i: BigUint,
    /// `y_i = g^{x_i} mod p`, the DLEQ verification key for this node's
    /// partial decryptions
    y_i: BigUint,
}

impl KeyShare {
    pub(super) fn new(group: GroupKeyInfo, share: ShareSecretInfo) -> Self {
        Self { group, share }
    }

    pub fn group(&self) -> &GroupKeyInfo {
        &self.group
    }

    pub fn share(&self) -> &ShareSecretInfo {
        &self.share
    }
}

impl GroupKeyInfo {
    pub(super) fn new(
        h: BigUint,
        pk_shares: VecMap<BeaconNodeId, BigUint>,
        threshold: usize,
    ) -> Self {
        Self {
            h,
            pk_shares,
            threshold,
        }
    }

    pub fn h(&self) -> &BigUint {
        &self.h
    }

    pub fn pk_shares(&self) -> &VecMap<BeaconNodeId, BigUint> {
        &self.pk_shares
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl ShareSecretInfo {
    pub(super) fn new(
        index: TypedUsize<BeaconNodeId>,
        x_i: BigUint,
        y_i: BigUint,
    ) -> Self {
        Self { index, x_i, y_i }
    }

    pub fn index(&self) -> TypedUsize<BeaconNodeId> {
        self.index
    }

    pub fn y_i(&self) -> &BigUint {
        &self.y_i
    }

    pub(crate) fn x_i(&self) -> &BigUint {
        &self.x_i
    }
}
