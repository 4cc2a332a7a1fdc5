mod block;
mod buffer;
mod decoder;
mod error;
mod frame;
mod params;
mod region;
mod source;
mod stats;
mod trace;

pub use self::{
    block::*, buffer::*, decoder::*, error::*, frame::*, params::*, region::*, source::*,
    stats::*, trace::*,
};
pub use ::image::RgbImage;

/// Result of pushing one frame through the engine.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Packed regional pixels of the frame.
    pub encoded: RgbImage,
    /// Frame rebuilt from the capture buffer.
    pub decoded: RgbImage,
    pub stats: FrameStats,
}

/// Encodes and decodes a run of frames, one at a time and in order.
#[derive(Debug)]
pub struct Engine<S = NoTrace> {
    params: Option<Params>,
    buffer: RollingCaptureBuffer,
    stats: Stats,
    sink: S,
}

impl Default for Engine<NoTrace> {
    fn default() -> Self {
        Self::new(NoTrace)
    }
}

impl<S: TouchSink> Engine<S> {
    pub fn new(sink: S) -> Self {
        Self {
            params: None,
            buffer: Default::default(),
            stats: Default::default(),
            sink,
        }
    }

    /// Encodes `img`, pushes its capture into the rolling buffer and decodes
    /// it back.
    ///
    /// The first frame fixes the dimensions of the run.
    pub fn add(&mut self, img: &RgbImage, regions: &RegionSet) -> Result<FrameOutput> {
        let params = Params::of(img)?;

        self.params.get_or_insert(params).ensure_same(&params)?;

        let map = AddressMap::new(&params);
        let frame = self.stats.frames as u64;

        let ctxt = FrameCtxt {
            params: &params,
            map: &map,
            frame,
        };

        let (slot, write) = CaptureSlot::encode(ctxt, img, regions, &mut self.sink);
        let encoded = slot.to_image();

        self.buffer.push(slot);

        let (decoded, read) = decode(ctxt, &self.buffer, &mut self.sink);
        let stats = FrameStats { write, read };

        self.stats.record(&stats);

        tracing::debug!(
            frame,
            regions = regions.len(),
            write_pixels = write.pixels,
            write_bitmask = write.bitmask,
            write_row_offsets = write.row_offsets,
            read_pixels = read.pixels,
            read_bitmask = read.bitmask,
            read_row_offsets = read.row_offsets,
            "frame processed"
        );

        Ok(FrameOutput {
            encoded,
            decoded,
            stats,
        })
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn buffer(&self) -> &RollingCaptureBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn finish(self) -> (Stats, S) {
        (self.stats, self.sink)
    }
}
