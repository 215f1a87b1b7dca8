//! One-shot Pedersen-style key generation.
//!
//! Every node deals a random polynomial, sends each peer its subshare plus
//! the commitment vector, and aggregates the `n` verified subshares into its
//! private share `x_i` and the group key `h`. All nodes are assumed honest
//! and eventually responsive: an invalid subshare is fatal.
use num_bigint_dig::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::{debug, error, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    collections::{FillVecMap, TypedUsize, VecMap},
    crypto_tools::{group::GroupParams, vss},
    sdk::api::{HerbFatal, HerbResult},
};

use super::{
    api::BeaconNodeId,
    key_share::{GroupKeyInfo, KeyShare, ShareSecretInfo},
    msg::{self, Msg},
    node::MsgOut,
};

#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
struct SubshareEntry {
    subshare: BigUint,
    pk_share: BigUint,
}

pub(super) struct Dkg {
    started: bool,
    entries: FillVecMap<BeaconNodeId, SubshareEntry>,
}

impl Dkg {
    pub(super) fn with_size(node_count: usize) -> Self {
        Self {
            started: false,
            entries: FillVecMap::with_size(node_count),
        }
    }

    /// Handle the client's `Start` command: deal a polynomial, send every
    /// peer its subshare, record the self contribution.
    pub(super) fn start(
        &mut self,
        group: &GroupParams,
        threshold: usize,
        my_id: TypedUsize<BeaconNodeId>,
        rng: &mut (impl CryptoRng + RngCore),
        msgs_out: &mut Vec<MsgOut>,
    ) -> HerbResult<()> {
        if self.started {
            warn!("peer {} says: ignoring duplicate start command", my_id);
            return Ok(());
        }
        self.started = true;

        info!("peer {} says: starting key generation", my_id);
        let my_vss = vss::Vss::new(group, threshold, rng);
        let commit = my_vss.commit(group);

        for peer in 0..self.entries.size() {
            let peer_id = TypedUsize::from_usize(peer);
            let subshare = my_vss.share(group, peer);
            if peer_id == my_id {
                self.entries.set(
                    my_id,
                    SubshareEntry {
                        subshare,
                        pk_share: commit.secret_commit().clone(),
                    },
                )?;
            } else {
                msgs_out.push(MsgOut::P2p {
                    to: peer_id,
                    bytes: msg::encode(
                        &Msg::Subshare {
                            subshare,
                            commit: commit.clone(),
                        },
                        my_id,
                    )?,
                });
            }
        }
        Ok(())
    }

    /// Handle a peer's subshare: verify it against the commitment vector at
    /// our own evaluation point and store it together with the peer's
    /// public-key share.
    pub(super) fn subshare_in(
        &mut self,
        group: &GroupParams,
        threshold: usize,
        my_id: TypedUsize<BeaconNodeId>,
        from: TypedUsize<BeaconNodeId>,
        subshare: BigUint,
        commit: vss::Commit,
    ) -> HerbResult<()> {
        if !self.entries.is_none(from)? {
            warn!(
                "peer {} says: ignoring duplicate subshare from peer {}",
                my_id, from
            );
            return Ok(());
        }
        if commit.len() != threshold {
            error!(
                "peer {} says: subshare from peer {} carries {} commitments, expected {}",
                my_id,
                from,
                commit.len(),
                threshold
            );
            return Err(HerbFatal);
        }
        if !commit.validate_share(group, &subshare, my_id.as_usize()) {
            error!(
                "peer {} says: invalid subshare from peer {}",
                my_id,
                from
            );
            return Err(HerbFatal);
        }

        self.entries.set(
            from,
            SubshareEntry {
                subshare,
                pk_share: commit.secret_commit().clone(),
            },
        )?;
        debug!(
            "peer {} says: verified subshare from peer {} ({} of {})",
            my_id,
            from,
            self.entries.some_count(),
            self.entries.size()
        );
        Ok(())
    }

    /// The `Start` command may arrive before, among, or after inbound
    /// subshares; both handlers run the same completion check.
    pub(super) fn is_complete(&self) -> bool {
        self.started && self.entries.is_full()
    }

    /// Aggregate the `n` entries into this node's key share:
    /// `x_i = sum_j f_j(i) mod q`, `h = prod_j g^{a_{j,0}} mod p`.
    pub(super) fn finish(
        self,
        group: &GroupParams,
        threshold: usize,
        my_id: TypedUsize<BeaconNodeId>,
    ) -> HerbResult<KeyShare> {
        if !self.is_complete() {
            error!("peer {} says: finish called before completion", my_id);
            return Err(HerbFatal);
        }

        let mut x_i = BigUint::zero();
        let mut h = BigUint::one();
        for (_, entry) in self.entries.iter_some() {
            x_i = (x_i + &entry.subshare) % group.q();
            h = h * &entry.pk_share % group.p();
        }
        let pk_shares: VecMap<BeaconNodeId, BigUint> = self
            .entries
            .iter_some()
            .map(|(_, entry)| entry.pk_share.clone())
            .collect();
        let y_i = group.pow_g(&x_i);

        Ok(KeyShare::new(
            GroupKeyInfo::new(h, pk_shares, threshold),
            ShareSecretInfo::new(my_id, x_i, y_i),
        ))
    }
}
