use crate::*;
use ::image::Rgb;

/// Location of a pixel inside a packed capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub fn index(&self, width: u32) -> usize {
        (self.row as usize) * (width as usize) + (self.col as usize)
    }
}

impl CaptureSlot {
    /// Finds where the block at `row`/`col` lives in the packed capture:
    /// the row's offset plus two pixels per regional block to its left.
    ///
    /// Strided blocks aren't packed, so for them this points at whatever
    /// regional pixels follow.
    pub fn locate(&self, row: u32, col: u32) -> Position {
        let preceding = self.bitmask[row as usize][..col as usize]
            .iter()
            .filter(|&&class| class == BlockClass::Regional)
            .count();

        let idx = self.row_offsets[row as usize] + preceding * (BLOCK_WIDTH as usize);
        let width = self.width as usize;

        Position {
            row: (idx / width) as u32,
            col: (idx % width) as u32,
        }
    }

    /// Pixel pair starting at `pos`, if the capture holds it.
    pub fn pair_at(&self, pos: Position) -> Option<[Rgb<u8>; 2]> {
        let idx = pos.index(self.width);

        Some([*self.pixels.get(idx)?, *self.pixels.get(idx + 1)?])
    }
}

/// Rebuilds the newest frame of `buffer`, reporting each read to `sink`.
///
/// Skipped blocks whose pixels no earlier capture holds stay black.
pub fn decode<S: TouchSink>(
    ctxt: FrameCtxt<'_>,
    buffer: &RollingCaptureBuffer,
    sink: &mut S,
) -> (RgbImage, Touches) {
    let FrameCtxt { params, map, frame } = ctxt;
    let mut out = RgbImage::new(params.width, params.height);
    let mut touches = Touches::default();

    let current = match buffer.current() {
        Some(current) => current,
        None => return (out, touches),
    };

    let blocks = params.blocks();

    for row in 0..params.height {
        // Row offsets and bitmask rows of every slot are fetched up front.
        for slot in 0..SLOTS {
            sink.touch(map.row_offset(frame + slot, row), Direction::Read);
        }

        for slot in 0..SLOTS {
            for col in 0..blocks {
                sink.touch(map.class(frame + slot, row, col), Direction::Read);
            }
        }

        touches.row_offsets += buffer.len() as u64;
        touches.bitmask += (buffer.len() as u64) * (blocks as u64);

        for col in 0..blocks {
            let x = params.block_x0(col);

            let source = match current.class(row, col) {
                BlockClass::Background => {
                    out.put_pixel(x, row, ZERO);
                    out.put_pixel(x + 1, row, ZERO);
                    None
                }

                BlockClass::Regional | BlockClass::Strided => Some((0, current)),

                BlockClass::Skipped => buffer
                    .previous()
                    .find(|(_, slot)| slot.class(row, col).is_stored()),
            };

            let (age, slot) = match source {
                Some(source) => source,
                None => continue,
            };

            let pos = slot.locate(row, col);

            if let Some([left, right]) = slot.pair_at(pos) {
                let owner = frame.wrapping_sub(age as u64);

                sink.touch(map.pixel(owner, pos.index(params.width) as u64), Direction::Read);
                out.put_pixel(x, row, left);
                out.put_pixel(x + 1, row, right);
                touches.pixels += 2;
            }
        }
    }

    (out, touches)
}
