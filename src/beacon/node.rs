//! The per-node protocol state machine.
//!
//! A node is a single-threaded reactive actor: the caller delivers one
//! inbound event at a time (`start` or `msg_in`) and ships the returned
//! outgoing messages. Encryption and decryption shares of different rounds
//! overlap freely on the wire; messages are routed by their carried round
//! number, future rounds are buffered, and completing a round can cascade
//! straight through rounds whose messages were already buffered.
use num_bigint_dig::BigUint;
use num_traits::One;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, error, info, warn};

use crate::{
    collections::TypedUsize,
    crypto_tools::{
        arith, elgamal, hash, vss,
        zkp::{chaum_pedersen, schnorr},
    },
    sdk::{
        api::{BytesVec, HerbFatal, HerbResult},
        wire_bytes,
    },
};

use super::{
    api::{BeaconConfig, BeaconNodeId},
    dkg::Dkg,
    key_share::KeyShare,
    msg::{self, Msg},
    round::{PendingDec, RoundState},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    InProgress,
    Done,
}

/// An outgoing wire message; the caller owns delivery
#[derive(Debug, Clone)]
pub enum MsgOut {
    /// deliver to every peer
    Bcast { bytes: BytesVec },
    /// deliver to one peer
    P2p {
        to: TypedUsize<BeaconNodeId>,
        bytes: BytesVec,
    },
}

/// A finalized beacon value, the `(round, output)` pair reported to the
/// client when this node is the replier
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutput {
    round: u64,
    value: BigUint,
}

impl RoundOutput {
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

/// Everything produced by one actor activation
#[derive(Debug, Default)]
pub struct StepOutput {
    pub msgs_out: Vec<MsgOut>,
    pub new_outputs: Vec<RoundOutput>,
}

enum Route {
    Invalid,
    Past,
    Current,
    Future,
}

pub struct Node {
    config: BeaconConfig,
    my_id: TypedUsize<BeaconNodeId>,
    rng: ChaCha20Rng,
    dkg: Option<Dkg>,
    key_share: Option<KeyShare>,
    rounds: Vec<RoundState>,
    /// highest round entered; 0 until key generation completes
    round_current: u64,
    outputs: Vec<RoundOutput>,
    done: bool,
}

impl Node {
    pub(super) fn new(
        config: BeaconConfig,
        my_id: TypedUsize<BeaconNodeId>,
        rng: ChaCha20Rng,
    ) -> Self {
        let node_count = config.node_count();
        let rounds = (0..config.round_max())
            .map(|_| RoundState::with_size(node_count))
            .collect();
        Self {
            dkg: Some(Dkg::with_size(node_count)),
            config,
            my_id,
            rng,
            key_share: None,
            rounds,
            round_current: 0,
            outputs: Vec::new(),
            done: false,
        }
    }

    /// Handle the client's `Start` command
    pub fn start(&mut self) -> HerbResult<StepOutput> {
        let mut step = StepOutput::default();
        if self.done {
            warn!(
                "peer {} says: ignoring start command after completion",
                self.my_id
            );
            return Ok(step);
        }
        match &mut self.dkg {
            Some(dkg) => dkg.start(
                self.config.group(),
                self.config.threshold(),
                self.my_id,
                &mut self.rng,
                &mut step.msgs_out,
            )?,
            None => {
                warn!(
                    "peer {} says: ignoring start command after key generation",
                    self.my_id
                );
                return Ok(step);
            }
        }
        self.try_complete_dkg(&mut step)?;
        Ok(step)
    }

    /// Handle an inbound peer message.
    /// We assume message authenticity: `from` is tagged by the transport and
    /// must agree with the sender id in the wire envelope.
    pub fn msg_in(
        &mut self,
        from: TypedUsize<BeaconNodeId>,
        bytes: &[u8],
    ) -> HerbResult<StepOutput> {
        let mut step = StepOutput::default();
        if self.done {
            debug!(
                "peer {} says: discarding message from peer {} after completion",
                self.my_id, from
            );
            return Ok(step);
        }
        if from.as_usize() >= self.config.node_count() || from == self.my_id {
            warn!(
                "peer {} says: discarding message from invalid sender {}",
                self.my_id, from
            );
            return Ok(step);
        }

        let wire = match wire_bytes::decode_message::<BeaconNodeId>(bytes) {
            Some(wire) => wire,
            None => {
                warn!(
                    "peer {} says: failed to decode message from peer {}",
                    self.my_id, from
                );
                return Ok(step);
            }
        };
        if wire.from != from {
            warn!(
                "peer {} says: wire sender {} does not match transport sender {}",
                self.my_id, wire.from, from
            );
            return Ok(step);
        }
        let msg: Msg = match wire_bytes::deserialize(&wire.payload) {
            Some(msg) => msg,
            None => {
                warn!(
                    "peer {} says: failed to decode payload from peer {}",
                    self.my_id, from
                );
                return Ok(step);
            }
        };

        match msg {
            Msg::Subshare { subshare, commit } => {
                self.subshare_in(from, subshare, commit, &mut step)?
            }
            Msg::EncShare {
                ciphertext,
                proof,
                round,
            } => self.enc_share_in(from, ciphertext, proof, round, &mut step)?,
            Msg::DecShare {
                partial,
                proof,
                y,
                a_combined,
                round,
            } => self.dec_share_in(
                from,
                PendingDec {
                    partial,
                    proof,
                    y,
                    a_combined,
                },
                round,
                &mut step,
            )?,
        }
        Ok(step)
    }

    pub fn status(&self) -> Status {
        if self.done {
            Status::Done
        } else {
            Status::InProgress
        }
    }

    pub fn my_id(&self) -> TypedUsize<BeaconNodeId> {
        self.my_id
    }

    /// `Some` once key generation has completed
    pub fn key_share(&self) -> Option<&KeyShare> {
        self.key_share.as_ref()
    }

    /// Beacon values finalized so far, in round order
    pub fn outputs(&self) -> &[RoundOutput] {
        &self.outputs
    }

    pub fn is_replier(&self) -> bool {
        self.config.replier()
    }

    pub fn round_current(&self) -> u64 {
        self.round_current
    }

    fn subshare_in(
        &mut self,
        from: TypedUsize<BeaconNodeId>,
        subshare: BigUint,
        commit: vss::Commit,
        step: &mut StepOutput,
    ) -> HerbResult<()> {
        match &mut self.dkg {
            Some(dkg) => dkg.subshare_in(
                self.config.group(),
                self.config.threshold(),
                self.my_id,
                from,
                subshare,
                commit,
            )?,
            None => {
                warn!(
                    "peer {} says: ignoring subshare from peer {} after key generation",
                    self.my_id, from
                );
                return Ok(());
            }
        }
        self.try_complete_dkg(step)
    }

    /// Completion fires on the `n`-th entry whether the last event was the
    /// start command or an inbound subshare
    fn try_complete_dkg(&mut self, step: &mut StepOutput) -> HerbResult<()> {
        if !self.dkg.as_ref().map_or(false, |dkg| dkg.is_complete()) {
            return Ok(());
        }
        let dkg = match self.dkg.take() {
            Some(dkg) => dkg,
            None => return Ok(()),
        };
        let key_share = dkg.finish(self.config.group(), self.config.threshold(), self.my_id)?;
        info!("peer {} says: key generation complete", self.my_id);
        self.key_share = Some(key_share);

        if self.config.round_max() == 0 {
            info!(
                "peer {} says: no beacon rounds configured; all done",
                self.my_id
            );
            self.done = true;
            return Ok(());
        }
        self.round_current = 1;
        self.enter_round(step)?;
        self.step_round(step)
    }

    fn route(&self, round: u64) -> Route {
        if round == 0 || round > self.config.round_max() {
            Route::Invalid
        } else if round < self.round_current {
            Route::Past
        } else if round == self.round_current {
            Route::Current
        } else {
            Route::Future
        }
    }

    fn enc_share_in(
        &mut self,
        from: TypedUsize<BeaconNodeId>,
        ciphertext: elgamal::Ciphertext,
        proof: schnorr::Proof,
        round: u64,
        step: &mut StepOutput,
    ) -> HerbResult<()> {
        match self.route(round) {
            Route::Invalid => {
                warn!(
                    "peer {} says: discarding encryption share from peer {} for out-of-range round {}",
                    self.my_id, from, round
                );
                return Ok(());
            }
            Route::Past => {
                debug!(
                    "peer {} says: discarding stale encryption share from peer {} for round {}",
                    self.my_id, from, round
                );
                return Ok(());
            }
            Route::Current | Route::Future => (),
        }

        let idx = (round - 1) as usize;
        if !self.rounds[idx].enc.is_none(from)? {
            warn!(
                "peer {} says: ignoring duplicate encryption share from peer {} for round {}",
                self.my_id, from, round
            );
            return Ok(());
        }
        let stmt = schnorr::Statement {
            group: self.config.group(),
            target: &ciphertext.a,
        };
        if !schnorr::verify(&stmt, &proof) {
            warn!(
                "peer {} says: invalid schnorr proof in encryption share from peer {} for round {}",
                self.my_id, from, round
            );
            return Ok(());
        }

        self.rounds[idx].enc.set(from, ciphertext)?;
        if round == self.round_current {
            self.step_round(step)?;
        }
        Ok(())
    }

    fn dec_share_in(
        &mut self,
        from: TypedUsize<BeaconNodeId>,
        pending: PendingDec,
        round: u64,
        step: &mut StepOutput,
    ) -> HerbResult<()> {
        match self.route(round) {
            Route::Invalid => {
                warn!(
                    "peer {} says: discarding decryption share from peer {} for out-of-range round {}",
                    self.my_id, from, round
                );
                return Ok(());
            }
            Route::Past => {
                debug!(
                    "peer {} says: discarding stale decryption share from peer {} for round {}",
                    self.my_id, from, round
                );
                return Ok(());
            }
            Route::Current | Route::Future => (),
        }

        let idx = (round - 1) as usize;
        let rs = &mut self.rounds[idx];
        if !rs.dec.is_none(from)? || !rs.dec_pending.is_none(from)? {
            warn!(
                "peer {} says: ignoring duplicate decryption share from peer {} for round {}",
                self.my_id, from, round
            );
            return Ok(());
        }
        // the DLEQ statement is checked against the locally recomputed
        // aggregate, which is unknown until all ciphertexts are in
        rs.dec_pending.set(from, pending)?;
        if round == self.round_current {
            self.step_round(step)?;
        }
        Ok(())
    }

    /// Drive the current round as far as local state allows. Advancing can
    /// complete several rounds in a row when their messages were buffered.
    fn step_round(&mut self, step: &mut StepOutput) -> HerbResult<()> {
        loop {
            if self.done || self.round_current == 0 {
                return Ok(());
            }
            let idx = (self.round_current - 1) as usize;

            if self.rounds[idx].enc.is_full() && self.rounds[idx].combined.is_none() {
                self.broadcast_dec_share(step)?;
            }
            if self.rounds[idx].combined.is_some() {
                self.drain_pending(idx)?;
            }

            let ready = {
                let rs = &self.rounds[idx];
                rs.combined.is_some() && rs.dec.some_count() >= self.config.threshold()
            };
            if !ready {
                return Ok(());
            }
            self.finalize_round(step)?;

            self.round_current += 1;
            if self.round_current > self.config.round_max() {
                info!(
                    "peer {} says: completed all {} rounds",
                    self.my_id,
                    self.config.round_max()
                );
                self.done = true;
                return Ok(());
            }
            self.enter_round(step)?;
        }
    }

    /// Broadcast this round's encryption share: a fresh random plaintext
    /// encrypted to the group key, with a proof of knowledge of the
    /// encryption randomness
    fn enter_round(&mut self, step: &mut StepOutput) -> HerbResult<()> {
        let round = self.round_current;
        let key_share = self.key_share.as_ref().ok_or_else(|| {
            error!("peer {} says: no key share in round {}", self.my_id, round);
            HerbFatal
        })?;

        let r = arith::random_scalar(&mut self.rng, self.config.group().q());
        let m = arith::random_group_element(&mut self.rng, self.config.group().p());
        let ciphertext = elgamal::encrypt(self.config.group(), key_share.group().h(), &m, &r);
        let proof = schnorr::prove(
            &schnorr::Statement {
                group: self.config.group(),
                target: &ciphertext.a,
            },
            &schnorr::Witness { scalar: &r },
            &mut self.rng,
        );

        debug!("peer {} says: entering round {}", self.my_id, round);
        self.rounds[(round - 1) as usize]
            .enc
            .set(self.my_id, ciphertext.clone())?;
        step.msgs_out.push(MsgOut::Bcast {
            bytes: msg::encode(
                &Msg::EncShare {
                    ciphertext,
                    proof,
                    round,
                },
                self.my_id,
            )?,
        });
        Ok(())
    }

    /// All ciphertexts are in: fix the aggregate `A = prod_i a_i`, compute
    /// this node's partial decryption `A^{x_i}` and DLEQ-prove it consistent
    /// with `y_i = g^{x_i}`
    fn broadcast_dec_share(&mut self, step: &mut StepOutput) -> HerbResult<()> {
        let round = self.round_current;
        let idx = (round - 1) as usize;
        let key_share = self.key_share.as_ref().ok_or_else(|| {
            error!("peer {} says: no key share in round {}", self.my_id, round);
            HerbFatal
        })?;
        let group = self.config.group();

        let (a_combined, b_combined) =
            elgamal::combine(group, self.rounds[idx].enc.iter_some().map(|(_, c)| c));
        let partial = elgamal::partial_decrypt(group, &a_combined, key_share.share().x_i());
        let proof = chaum_pedersen::prove(
            &chaum_pedersen::Statement {
                group,
                base1: group.g(),
                base2: &a_combined,
                target1: key_share.share().y_i(),
                target2: &partial,
            },
            &chaum_pedersen::Witness {
                scalar: key_share.share().x_i(),
            },
            &mut self.rng,
        );

        debug!(
            "peer {} says: broadcasting partial decryption for round {}",
            self.my_id, round
        );
        step.msgs_out.push(MsgOut::Bcast {
            bytes: msg::encode(
                &Msg::DecShare {
                    partial: partial.clone(),
                    proof,
                    y: key_share.share().y_i().clone(),
                    a_combined: a_combined.clone(),
                    round,
                },
                self.my_id,
            )?,
        });

        let rs = &mut self.rounds[idx];
        rs.dec.set(self.my_id, partial)?;
        rs.combined = Some((a_combined, b_combined));
        Ok(())
    }

    /// Verify buffered decryption shares against the local aggregate
    fn drain_pending(&mut self, idx: usize) -> HerbResult<()> {
        let Self {
            config,
            my_id,
            rounds,
            round_current,
            ..
        } = self;
        let group = config.group();
        let round = *round_current;
        let rs = &mut rounds[idx];
        let local_a = match &rs.combined {
            Some((a, _)) => a.clone(),
            None => return Ok(()),
        };

        for peer in 0..rs.dec_pending.size() {
            let peer_id = TypedUsize::from_usize(peer);
            let pending = match rs.dec_pending.take(peer_id)? {
                Some(pending) => pending,
                None => continue,
            };
            if pending.a_combined != local_a {
                warn!(
                    "peer {} says: decryption share from peer {} for round {} disagrees on the ciphertext aggregate",
                    my_id, peer_id, round
                );
                continue;
            }
            let stmt = chaum_pedersen::Statement {
                group,
                base1: group.g(),
                base2: &local_a,
                target1: &pending.y,
                target2: &pending.partial,
            };
            if !chaum_pedersen::verify(&stmt, &pending.proof) {
                warn!(
                    "peer {} says: invalid dleq proof in decryption share from peer {} for round {}",
                    my_id, peer_id, round
                );
                continue;
            }
            rs.dec.set(peer_id, pending.partial)?;
        }
        Ok(())
    }

    /// At least `t` verified partials over a fixed aggregate: interpolate
    /// the group decryption in the exponent and derive the round output
    fn finalize_round(&mut self, step: &mut StepOutput) -> HerbResult<()> {
        let round = self.round_current;
        let idx = (round - 1) as usize;
        let group = self.config.group();
        let rs = &self.rounds[idx];
        let (_, b_combined) = rs.combined.as_ref().ok_or_else(|| {
            error!(
                "peer {} says: finalize without a ciphertext aggregate in round {}",
                self.my_id, round
            );
            HerbFatal
        })?;

        let selected: Vec<(TypedUsize<BeaconNodeId>, &BigUint)> = rs
            .dec
            .iter_some()
            .take(self.config.threshold())
            .collect();
        let indices: Vec<usize> = selected.iter().map(|(id, _)| id.as_usize()).collect();

        let mut m_combined = BigUint::one();
        for (i, (_, partial)) in selected.iter().enumerate() {
            let lambda = vss::lagrange_coefficient(i, &indices, group.q())?;
            m_combined = m_combined * partial.modpow(&lambda, group.p()) % group.p();
        }

        let raw = elgamal::recover(group, b_combined, &m_combined)?;
        let value = hash::beacon_output(&raw, group.p());
        info!(
            "peer {} says: derived beacon output for round {}",
            self.my_id, round
        );

        let output = RoundOutput { round, value };
        self.outputs.push(output.clone());
        step.new_outputs.push(output);
        Ok(())
    }

    #[cfg(test)]
    pub(super) fn buffered_enc_count(&self, round: u64) -> usize {
        self.rounds[(round - 1) as usize].enc.some_count()
    }
}
