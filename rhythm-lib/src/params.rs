use crate::*;

/// Frame geometry shared by every frame of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Params {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width < BLOCK_WIDTH || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        Ok(Self { width, height })
    }

    pub fn of(img: &RgbImage) -> Result<Self> {
        Self::new(img.width(), img.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of column blocks in each row; an odd trailing column is
    /// never classified.
    pub fn blocks(&self) -> u32 {
        self.width / BLOCK_WIDTH
    }

    pub(crate) fn block_x0(&self, col: u32) -> u32 {
        col * BLOCK_WIDTH
    }

    pub(crate) fn ensure_same(&self, other: &Params) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                width: self.width,
                height: self.height,
                actual_width: other.width,
                actual_height: other.height,
            })
        }
    }
}
