use std::fmt;

/// One bit per field group of an object kind. Kinds have at most 32 groups.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DiffMask(u32);

impl DiffMask {
    pub const MAX_GROUPS: u8 = 32;

    pub fn new() -> Self {
        Self(0)
    }

    /// A mask with the lowest `group_count` bits set
    pub fn full(group_count: u8) -> Self {
        assert!(
            group_count <= Self::MAX_GROUPS,
            "DiffMask can hold at most {} groups, got {}",
            Self::MAX_GROUPS,
            group_count
        );
        if group_count == Self::MAX_GROUPS {
            Self(u32::MAX)
        } else {
            Self((1u32 << group_count) - 1)
        }
    }

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn bit(&self, index: u8) -> bool {
        index < Self::MAX_GROUPS && self.0 & (1 << index) != 0
    }

    pub fn set_bit(&mut self, index: u8, value: bool) {
        assert!(index < Self::MAX_GROUPS, "group index {index} out of range");
        if value {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    pub fn or(&mut self, other: &DiffMask) {
        self.0 |= other.0;
    }

    /// Keeps only the bits that are also set in `other`
    pub fn and(&mut self, other: &DiffMask) {
        self.0 &= other.0;
    }

    /// Clears every bit that is set in `other`
    pub fn nand(&mut self, other: &DiffMask) {
        self.0 &= !other.0;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Indices of the set bits, lowest first
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..Self::MAX_GROUPS).filter(move |index| self.bit(*index))
    }
}

impl fmt::Debug for DiffMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiffMask({:#b})", self.0)
    }
}
