//! Identifiers for assets within a universe

use serde::{Deserialize, Serialize};

/// Position of an asset within its `AssetUniverse`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

impl AssetId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
