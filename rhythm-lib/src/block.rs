use crate::*;

/// Number of pixels classified together.
pub const BLOCK_WIDTH: u32 = 2;

/// Classification of one 2-pixel block of a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockClass {
    /// Captured verbatim into this frame's capture.
    Regional,
    /// Taken from an earlier frame's capture.
    Skipped,
    Strided,
    /// Not covered by any region; decodes to black.
    Background,
}

impl BlockClass {
    /// Combines a region's stride and skip policy; stride wins when both
    /// are active.
    pub fn resolve(strided: bool, skipped: bool) -> Self {
        match (strided, skipped) {
            (true, _) => Self::Strided,
            (false, true) => Self::Skipped,
            (false, false) => Self::Regional,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Regional => 0b00,
            Self::Skipped => 0b01,
            Self::Strided => 0b10,
            Self::Background => 0b11,
        }
    }

    /// Whether the block's pixels are looked up in its own frame's capture.
    pub fn is_stored(self) -> bool {
        match self {
            Self::Regional | Self::Strided => true,
            Self::Skipped | Self::Background => false,
        }
    }
}

/// Classifies the block at column block `col` of `row`.
///
/// Regions are scanned in `x0` order and a later match overrides an earlier
/// one, except that a regional match ends the scan.
pub fn classify(params: &Params, regions: &RegionSet, row: u32, col: u32) -> BlockClass {
    let x = params.block_x0(col);
    let mut class = BlockClass::Background;

    for region in regions.iter() {
        if x < region.x0 {
            break;
        }

        if !region.contains(x, row) {
            continue;
        }

        class = region.class_at(x);

        if class == BlockClass::Regional {
            break;
        }
    }

    class
}
