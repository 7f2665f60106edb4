//! # Block Face Module
//!
//! The six faces of a block, their normals and "up" vectors, and a compact
//! bitmask used to track which faces of a cell are currently visible.

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// One of the six axis-aligned faces of a block.
///
/// The first three variants face the positive axes, the last three the
/// negative ones, so `face as usize + 3` (mod 6) is always the opposite face.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockFace {
    /// +X
    East = 0,
    /// +Y
    Top = 1,
    /// +Z
    South = 2,
    /// -X
    West = 3,
    /// -Y
    Bottom = 4,
    /// -Z
    North = 5,
}

impl BlockFace {
    /// All six faces, positive faces first.
    pub fn all() -> [BlockFace; 6] {
        [
            BlockFace::East,
            BlockFace::Top,
            BlockFace::South,
            BlockFace::West,
            BlockFace::Bottom,
            BlockFace::North,
        ]
    }

    /// Face for an index in `0..6`, in the order of [`BlockFace::all`].
    pub fn from_index(index: usize) -> Option<Self> {
        num::FromPrimitive::from_usize(index)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask for this face.
    pub fn bit(self) -> u8 {
        1 << self as u8
    }

    pub fn opposite(self) -> Self {
        match self {
            BlockFace::East => BlockFace::West,
            BlockFace::Top => BlockFace::Bottom,
            BlockFace::South => BlockFace::North,
            BlockFace::West => BlockFace::East,
            BlockFace::Bottom => BlockFace::Top,
            BlockFace::North => BlockFace::South,
        }
    }

    /// Whether the face points along a positive axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockFace::East | BlockFace::Top | BlockFace::South)
    }

    pub fn is_negative(self) -> bool {
        !self.is_positive()
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockFace::East => Vector3::unit_x(),
            BlockFace::Top => Vector3::unit_y(),
            BlockFace::South => Vector3::unit_z(),
            BlockFace::West => -Vector3::unit_x(),
            BlockFace::Bottom => -Vector3::unit_y(),
            BlockFace::North => -Vector3::unit_z(),
        }
    }

    /// The direction treated as "up" when laying a quad onto this face.
    ///
    /// Horizontal faces use +Z, vertical faces use +Y. Together with the normal
    /// this fixes the quad's orientation so opposite faces are not mirrored.
    pub fn up(self) -> Vector3<i32> {
        match self {
            BlockFace::Top | BlockFace::Bottom => Vector3::unit_z(),
            _ => Vector3::unit_y(),
        }
    }

    /// Face whose normal equals `normal`, if `normal` is a signed unit axis.
    pub fn from_normal(normal: Vector3<i32>) -> Option<Self> {
        BlockFace::all().into_iter().find(|face| face.normal() == normal)
    }
}

/// Bitmask over the six [`BlockFace`]s.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, Default)]
pub struct FaceMask(u8);

impl FaceMask {
    pub const NONE: FaceMask = FaceMask(0);
    pub const ALL: FaceMask = FaceMask(0b0011_1111);

    pub fn from_bits(bits: u8) -> Self {
        FaceMask(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, face: BlockFace) -> bool {
        self.0 & face.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Sets or clears `face`, returning whether the mask changed.
    pub fn set(&mut self, face: BlockFace, visible: bool) -> bool {
        let before = self.0;
        if visible {
            self.0 |= face.bit();
        } else {
            self.0 &= !face.bit();
        }
        before != self.0
    }

    pub fn with(mut self, face: BlockFace) -> Self {
        self.set(face, true);
        self
    }

    pub fn iter(self) -> impl Iterator<Item = BlockFace> {
        BlockFace::all()
            .into_iter()
            .filter(move |face| self.contains(*face))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_faces_have_opposite_normals() {
        for face in BlockFace::all() {
            assert_eq!(face.opposite().normal(), -face.normal());
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.is_positive(), face.opposite().is_positive());
        }
    }

    #[test]
    fn normal_round_trip() {
        for face in BlockFace::all() {
            assert_eq!(BlockFace::from_normal(face.normal()), Some(face));
            assert_eq!(BlockFace::from_index(face.index()), Some(face));
        }
        assert_eq!(BlockFace::from_normal(Vector3::new(1, 1, 0)), None);
        assert_eq!(BlockFace::from_index(6), None);
    }

    #[test]
    fn up_is_perpendicular_to_normal() {
        for face in BlockFace::all() {
            let n = face.normal();
            let u = face.up();
            assert_eq!(n.x * u.x + n.y * u.y + n.z * u.z, 0);
        }
    }

    #[test]
    fn mask_reports_changes() {
        let mut mask = FaceMask::NONE;
        assert!(mask.set(BlockFace::Top, true));
        assert!(!mask.set(BlockFace::Top, true));
        assert!(mask.contains(BlockFace::Top));
        assert!(!mask.contains(BlockFace::Bottom));
        assert!(mask.set(BlockFace::Top, false));
        assert!(mask.is_empty());
        assert_eq!(FaceMask::ALL.count(), 6);
        assert_eq!(FaceMask::ALL.iter().count(), 6);
    }
}
