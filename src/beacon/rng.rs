use hmac::{Mac, SimpleHmac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::{
    array::TryFromSliceError,
    convert::{TryFrom, TryInto},
};
use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    collections::TypedUsize,
    sdk::api::{HerbFatal, HerbResult},
};

use super::api::BeaconNodeId;

const SESSION_NONCE_LENGTH_MIN: usize = 4;
const SESSION_NONCE_LENGTH_MAX: usize = 256;

/// Root entropy for one node's CSPRNG: polynomial coefficients, encryption
/// randomness, plaintexts and Fiat-Shamir witnesses are all drawn from the
/// stream seeded here.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretSeedKey(pub(crate) [u8; 64]);

impl TryFrom<&[u8]> for SecretSeedKey {
    type Error = TryFromSliceError;
    fn try_from(v: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(v.try_into()?))
    }
}

/// Initialize a RNG by hashing the arguments.
pub(crate) fn rng_seed(
    tag: u8,
    node_id: TypedUsize<BeaconNodeId>,
    seed_key: &SecretSeedKey,
    session_nonce: &[u8],
) -> HerbResult<ChaCha20Rng> {
    if session_nonce.len() < SESSION_NONCE_LENGTH_MIN
        || session_nonce.len() > SESSION_NONCE_LENGTH_MAX
    {
        error!(
            "invalid session_nonce length {} not in [{},{}]",
            session_nonce.len(),
            SESSION_NONCE_LENGTH_MIN,
            SESSION_NONCE_LENGTH_MAX
        );
        return Err(HerbFatal);
    }

    let mut prf = SimpleHmac::<Sha256>::new_from_slice(&seed_key.0[..]).map_err(|_| {
        error!("failure to initialize hmac");
        HerbFatal
    })?;

    prf.update(&tag.to_be_bytes());
    // fixed-width form so the seed is platform-independent
    prf.update(&(node_id.as_usize() as u64).to_be_bytes());
    prf.update(session_nonce);

    let seed = prf.finalize().into_bytes().into();

    Ok(ChaCha20Rng::from_seed(seed))
}
