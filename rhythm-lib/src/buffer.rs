use crate::*;
use std::collections::VecDeque;

/// How many frames the decoder can look back through, current one included.
pub const DEPTH: usize = 4;

/// Most recent captures, newest first.
#[derive(Clone, Debug, Default)]
pub struct RollingCaptureBuffer {
    slots: VecDeque<CaptureSlot>,
}

impl RollingCaptureBuffer {
    /// Inserts `slot` as the newest capture, evicting the oldest one past
    /// [`DEPTH`].
    pub fn push(&mut self, slot: CaptureSlot) {
        self.slots.push_front(slot);

        if self.slots.len() > DEPTH {
            self.slots.pop_back();
            tracing::trace!("evicted oldest capture");
        }
    }

    /// The newest capture.
    pub fn current(&self) -> Option<&CaptureSlot> {
        self.slots.front()
    }

    /// Slot `age` frames back from the newest one.
    pub fn get(&self, age: usize) -> Option<&CaptureSlot> {
        self.slots.get(age)
    }

    /// Earlier captures, most recent first, paired with their age.
    pub fn previous(&self) -> impl Iterator<Item = (usize, &CaptureSlot)> + '_ {
        self.slots.iter().enumerate().skip(1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
