use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::marker::PhantomData;

/// A `usize` index tagged with the map family it indexes, so a node id
/// can't silently stand in for some other map's key.
pub struct TypedUsize<K>(usize, PhantomData<K>);

impl<K> TypedUsize<K> {
    pub fn from_usize(index: usize) -> Self {
        TypedUsize(index, PhantomData)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

// `#[derive(...)]` would put bounds on `K`, which is only a phantom marker,
// so spell the impls out.

impl<K> Copy for TypedUsize<K> {}

impl<K> Clone for TypedUsize<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> PartialEq for TypedUsize<K> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K> std::fmt::Debug for TypedUsize<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<K> std::fmt::Display for TypedUsize<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Wire form is a fixed-width `u64`: sender ids travel in the message
// envelope and must look the same on platforms with different `usize`
// widths.

impl<K> Serialize for TypedUsize<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0 as u64)
    }
}

impl<'de, K> Deserialize<'de> for TypedUsize<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self::from_usize(u64::deserialize(deserializer)? as usize))
    }
}
