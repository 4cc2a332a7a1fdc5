use std::ops::{Add, AddAssign};

const PIXEL_BITS: u64 = 24;
const CLASS_BITS: u64 = 2;
const ROW_OFFSET_BITS: u64 = 24;

/// Bits per megabyte, as reported in statistics.
pub const MEGABYTE: f64 = 8_000_000.0;

/// Buffer touches in one direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Touches {
    pub pixels: u64,
    pub bitmask: u64,
    pub row_offsets: u64,
}

impl Touches {
    /// Estimated traffic in bits.
    pub fn bits(&self) -> u64 {
        self.pixels * PIXEL_BITS + self.bitmask * CLASS_BITS + self.row_offsets * ROW_OFFSET_BITS
    }

    pub fn megabytes(&self) -> f64 {
        self.bits() as f64 / MEGABYTE
    }
}

impl Add for Touches {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            pixels: self.pixels + other.pixels,
            bitmask: self.bitmask + other.bitmask,
            row_offsets: self.row_offsets + other.row_offsets,
        }
    }
}

impl AddAssign for Touches {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub write: Touches,
    pub read: Touches,
}

impl FrameStats {
    pub fn total(&self) -> Touches {
        self.write + self.read
    }
}

/// Running totals over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub frames: usize,
    pub write: Touches,
    pub read: Touches,
}

impl Stats {
    pub fn record(&mut self, frame: &FrameStats) {
        self.frames += 1;
        self.write += frame.write;
        self.read += frame.read;
    }

    pub fn total(&self) -> Touches {
        self.write + self.read
    }
}
