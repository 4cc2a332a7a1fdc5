use crate::*;
use ::image::Rgb;

pub const ZERO: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Copy, Clone)]
pub struct FrameCtxt<'a> {
    pub params: &'a Params,
    pub map: &'a AddressMap,
    /// Index of the frame within the run.
    pub frame: u64,
}

/// Encoded form of one frame: its regional pixels packed row-major, plus the
/// per-row classes and offsets needed to find them again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureSlot {
    pub(crate) width: u32,
    pub(crate) pixels: Vec<Rgb<u8>>,
    pub(crate) bitmask: Vec<Vec<BlockClass>>,
    pub(crate) row_offsets: Vec<usize>,
}

impl CaptureSlot {
    /// Encodes `img`, reporting each write to `sink`.
    pub fn encode<S: TouchSink>(
        ctxt: FrameCtxt<'_>,
        img: &RgbImage,
        regions: &RegionSet,
        sink: &mut S,
    ) -> (Self, Touches) {
        let FrameCtxt { params, map, frame } = ctxt;
        let mut touches = Touches::default();
        let mut pixels = Vec::new();
        let mut bitmask = Vec::with_capacity(params.height as usize);
        let mut row_offsets = Vec::with_capacity(params.height as usize);

        for row in 0..params.height {
            sink.touch(map.row_offset(frame, row), Direction::Write);
            row_offsets.push(pixels.len());
            touches.row_offsets += 1;

            let mut classes = Vec::with_capacity(params.blocks() as usize);

            for col in 0..params.blocks() {
                let class = classify(params, regions, row, col);

                if class == BlockClass::Regional {
                    let x = params.block_x0(col);

                    sink.touch(map.pixel(frame, pixels.len() as u64), Direction::Write);
                    pixels.push(*img.get_pixel(x, row));
                    pixels.push(*img.get_pixel(x + 1, row));
                    touches.pixels += 2;
                }

                sink.touch(map.class(frame, row, col), Direction::Write);
                classes.push(class);
                touches.bitmask += 1;
            }

            bitmask.push(classes);
        }

        while pixels.len() % (params.width as usize) != 0 {
            sink.touch(map.pixel(frame, pixels.len() as u64), Direction::Write);
            pixels.push(ZERO);
            pixels.push(ZERO);
            touches.pixels += 2;
        }

        let slot = Self {
            width: params.width,
            pixels,
            bitmask,
            row_offsets,
        };

        (slot, touches)
    }

    /// Number of rows of the packed capture.
    pub fn rows(&self) -> u32 {
        (self.pixels.len() / self.width as usize) as u32
    }

    pub fn pixels(&self) -> &[Rgb<u8>] {
        &self.pixels
    }

    pub fn bitmask(&self) -> &[Vec<BlockClass>] {
        &self.bitmask
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    pub fn class(&self, row: u32, col: u32) -> BlockClass {
        self.bitmask[row as usize][col as usize]
    }

    /// The packed capture as an image of `rows()` rows.
    pub fn to_image(&self) -> RgbImage {
        let width = self.width;

        RgbImage::from_fn(width, self.rows(), |x, y| {
            self.pixels[(y as usize) * (width as usize) + (x as usize)]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]))
    }

    fn encode(img: &RgbImage, regions: Vec<Region>) -> (CaptureSlot, Touches, Trace) {
        let params = Params::of(img).unwrap();
        let map = AddressMap::new(&params);
        let regions = RegionSet::new(&params, regions);
        let mut trace = Trace::default();

        let ctxt = FrameCtxt {
            params: &params,
            map: &map,
            frame: 0,
        };

        let (slot, touches) = CaptureSlot::encode(ctxt, img, &regions, &mut trace);

        (slot, touches, trace)
    }

    #[test]
    fn full_frame_capture_equals_input() {
        let img = numbered(4, 4);
        let (slot, touches, _) = encode(&img, Vec::new());

        assert_eq!(slot.to_image(), img);
        assert_eq!(slot.row_offsets(), [0, 4, 8, 12]);
        assert_eq!(
            touches,
            Touches {
                pixels: 16,
                bitmask: 8,
                row_offsets: 4,
            }
        );
    }

    #[test]
    fn partial_capture_is_packed_and_padded() {
        let img = numbered(6, 3);

        let region = Region {
            x0: 2,
            x1: 3,
            y0: 1,
            y1: 2,
            stride: 0,
            skip: false,
        };

        let (slot, touches, _) = encode(&img, vec![region]);

        assert_eq!(
            slot.pixels(),
            [
                Rgb([2, 1, 7]),
                Rgb([3, 1, 7]),
                Rgb([2, 2, 7]),
                Rgb([3, 2, 7]),
                ZERO,
                ZERO,
            ]
        );
        assert_eq!(slot.rows(), 1);
        assert_eq!(slot.row_offsets(), [0, 0, 2]);
        assert_eq!(slot.class(0, 1), BlockClass::Background);
        assert_eq!(slot.class(1, 1), BlockClass::Regional);
        assert_eq!(touches.pixels, 6);
    }

    #[test]
    fn nothing_captured_leaves_empty_capture() {
        let img = numbered(4, 2);

        let region = Region {
            x0: 0,
            x1: 3,
            y0: 0,
            y1: 1,
            stride: 0,
            skip: true,
        };

        let (slot, _, _) = encode(&img, vec![region]);

        assert!(slot.pixels().is_empty());
        assert_eq!(slot.to_image().height(), 0);
        assert!(slot.bitmask().iter().flatten().all(|&c| c == BlockClass::Skipped));
    }

    #[test]
    fn writes_are_traced_in_order() {
        let img = numbered(2, 2);
        let (_, _, trace) = encode(&img, Vec::new());
        let map = AddressMap::new(&Params::new(2, 2).unwrap());

        let expected = vec![
            TraceRecord {
                address: map.row_offset(0, 0),
                direction: Direction::Write,
            },
            TraceRecord {
                address: map.pixel(0, 0),
                direction: Direction::Write,
            },
            TraceRecord {
                address: map.class(0, 0, 0),
                direction: Direction::Write,
            },
            TraceRecord {
                address: map.row_offset(0, 1),
                direction: Direction::Write,
            },
            TraceRecord {
                address: map.pixel(0, 2),
                direction: Direction::Write,
            },
            TraceRecord {
                address: map.class(0, 1, 0),
                direction: Direction::Write,
            },
        ];

        assert_eq!(trace.records(), expected.as_slice());
    }
}
