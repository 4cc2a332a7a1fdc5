use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A region line couldn't be parsed.
    #[error("region line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A frame's dimensions differ from the ones the run started with; row
    /// offsets and address slots are sized from the first frame.
    #[error(
        "frame is {actual_width}x{actual_height}, but the run started at {width}x{height}"
    )]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("frame of {width}x{height} holds no 2-pixel block")]
    InvalidDimensions { width: u32, height: u32 },
}

impl Error {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}
