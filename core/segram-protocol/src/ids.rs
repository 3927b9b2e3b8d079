use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Document-level position of a token. Stored as `u32` so archived token
/// records keep a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[archive(check_bytes)]
#[repr(transparent)]
pub struct TokenId(pub u32);

impl TokenId {
    pub const fn new(i: u32) -> Self {
        Self(i)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for TokenId {
    /// Token positions beyond `u32::MAX` saturate.
    fn from(i: usize) -> Self {
        Self(u32::try_from(i).unwrap_or(u32::MAX))
    }
}
