//! Synthetic memory trace of the encoder and decoder.
//!
//! Every buffer touch is mapped onto one of three address ranges (captures,
//! bitmasks, row offsets), each split into [`SLOTS`] slots used round-robin
//! by consecutive frames.

use crate::*;
use std::{fmt, io};

/// Number of address slots per range, matching the capture buffer depth.
pub const SLOTS: u64 = 4;

const PIXEL_BITS: u64 = 24;
const CLASS_BITS: u64 = 2;
const ROW_OFFSET_BITS: u64 = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    pub address: u32,
    pub direction: Direction,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Read => 'R',
            Direction::Write => 'W',
        };

        write!(f, "{:#x} {}", self.address, dir)
    }
}

/// Receives every touch in the order it happens.
pub trait TouchSink {
    fn touch(&mut self, address: u32, direction: Direction);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTrace;

impl TouchSink for NoTrace {
    #[inline(always)]
    fn touch(&mut self, _: u32, _: Direction) {}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    records: Vec<TraceRecord>,
}

impl Trace {
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes one `<address> <R|W>` line per record.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        for record in &self.records {
            writeln!(out, "{}", record)?;
        }

        Ok(())
    }
}

impl TouchSink for Trace {
    fn touch(&mut self, address: u32, direction: Direction) {
        self.records.push(TraceRecord { address, direction });
    }
}

/// Sink that writes each record out as it arrives.
///
/// The first write error stops further output and is returned by
/// [`TraceWriter::finish`].
#[derive(Debug)]
pub struct TraceWriter<W: io::Write> {
    out: W,
    records: usize,
    error: Option<io::Error>,
}

impl<W: io::Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            records: 0,
            error: None,
        }
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Flushes the output and hands it back.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        self.out.flush()?;

        Ok(self.out)
    }
}

impl<W: io::Write> TouchSink for TraceWriter<W> {
    fn touch(&mut self, address: u32, direction: Direction) {
        if self.error.is_some() {
            return;
        }

        match writeln!(self.out, "{}", TraceRecord { address, direction }) {
            Ok(()) => self.records += 1,
            Err(err) => self.error = Some(err),
        }
    }
}

/// Layout of the three address ranges for a given frame size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressMap {
    width: u64,
    height: u64,
}

impl AddressMap {
    pub fn new(params: &Params) -> Self {
        Self {
            width: params.width as u64,
            height: params.height as u64,
        }
    }

    fn capture_slot_size(&self) -> u64 {
        self.height * self.width * PIXEL_BITS
    }

    fn bitmask_slot_size(&self) -> u64 {
        self.height * self.width * CLASS_BITS
    }

    fn row_offset_slot_size(&self) -> u64 {
        self.height * ROW_OFFSET_BITS
    }

    fn bitmask_base(&self) -> u64 {
        SLOTS * self.capture_slot_size()
    }

    fn row_offset_base(&self) -> u64 {
        self.bitmask_base() + SLOTS * self.bitmask_slot_size()
    }

    pub fn capture_slot(&self, frame: u64) -> u64 {
        (frame % SLOTS) * self.capture_slot_size()
    }

    pub fn bitmask_slot(&self, frame: u64) -> u64 {
        self.bitmask_base() + (frame % SLOTS) * self.bitmask_slot_size()
    }

    pub fn row_offset_slot(&self, frame: u64) -> u64 {
        self.row_offset_base() + (frame % SLOTS) * self.row_offset_slot_size()
    }

    /// Address of the pixel pair at linear capture index `idx`.
    pub fn pixel(&self, frame: u64, idx: u64) -> u32 {
        let row = idx / self.width;
        let col = idx % self.width;

        truncate(self.capture_slot(frame) + col * row * PIXEL_BITS)
    }

    pub fn class(&self, frame: u64, row: u32, col: u32) -> u32 {
        truncate(self.bitmask_slot(frame) + (row as u64) * (col as u64) * CLASS_BITS)
    }

    pub fn row_offset(&self, frame: u64, row: u32) -> u32 {
        truncate(self.row_offset_slot(frame) + (row as u64) * ROW_OFFSET_BITS)
    }
}

fn truncate(address: u64) -> u32 {
    address as u32
}
