use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier for a heating zone.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<ZoneId>` to be pointer-optimized
///
/// Zones are addressed by string name at the API boundary; the registry
/// resolves names to `ZoneId` once and everything downstream uses the id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(NonZeroU32);

impl ZoneId {
    /// Create a ZoneId from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZoneId({})", self.index())
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}
