use crate::collections::TypedUsize;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, warn};

use super::api::{BytesVec, HerbFatal, HerbResult};

const HERB_SERIALIZATION_VERSION: u16 = 0;

pub fn serialize<T: ?Sized>(value: &T) -> HerbResult<BytesVec>
where
    T: Serialize,
{
    match bincode::serialize(value) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            error!("serialization failure: {}", err.to_string());
            Err(HerbFatal)
        }
    }
}

/// deserialization failures are non-fatal: the offending message is discarded
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    bincode::deserialize(bytes)
        .map_err(|err| {
            warn!("deserialization failure: {}", err.to_string());
        })
        .ok()
}

/// Wrap an outbound payload in a versioned envelope carrying the sender id.
pub fn encode_message<K>(payload: BytesVec, from: TypedUsize<K>) -> HerbResult<BytesVec> {
    serialize(&BytesVecVersioned {
        version: HERB_SERIALIZATION_VERSION,
        payload: serialize(&WireBytes { from, payload })?,
    })
}

pub fn decode_message<K>(bytes: &[u8]) -> Option<WireBytes<K>> {
    let bytes_versioned: BytesVecVersioned = deserialize(bytes)?;
    if bytes_versioned.version != HERB_SERIALIZATION_VERSION {
        warn!(
            "encoding version {}, expected {}",
            bytes_versioned.version, HERB_SERIALIZATION_VERSION
        );
        return None;
    }
    deserialize(&bytes_versioned.payload)
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))] // disable serde trait bounds on `K`: https://serde.rs/attr-bound.html
pub struct WireBytes<K> {
    pub from: TypedUsize<K>,
    pub payload: BytesVec,
}

#[derive(Serialize, Deserialize)]
struct BytesVecVersioned {
    version: u16,
    payload: BytesVec,
}
