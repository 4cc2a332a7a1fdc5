use anyhow::{Context, Result};
use rhythm_lib::{FrameOutput, SourceFrame, Touches, TraceWriter};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

/// Layout of the output folder.
#[derive(Debug)]
pub struct Output {
    root: PathBuf,
    encoded: PathBuf,
    stats: PathBuf,
}

impl Output {
    pub fn create(root: &Path) -> Result<Self> {
        let this = Self {
            root: root.to_path_buf(),
            encoded: root.join("encoded"),
            stats: root.join("stats"),
        };

        for dir in [&this.root, &this.encoded, &this.stats].iter() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Couldn't create folder: {}", dir.display()))?;
        }

        Ok(this)
    }

    pub fn save_frame(&self, frame: &SourceFrame, out: &FrameOutput) -> Result<()> {
        let decoded = self.root.join(&frame.name);

        out.decoded
            .save(&decoded)
            .with_context(|| format!("Couldn't save frame: {}", decoded.display()))?;

        if out.encoded.height() == 0 {
            tracing::warn!(frame = %frame.name, "nothing captured; encoded frame not saved");
        } else {
            let encoded = self.encoded.join(&frame.name);

            out.encoded
                .save(&encoded)
                .with_context(|| format!("Couldn't save encoded frame: {}", encoded.display()))?;
        }

        self.save_stats(&frame.stats_name, &out.stats.write, &out.stats.read)
    }

    pub fn save_stats(&self, name: &str, write: &Touches, read: &Touches) -> Result<()> {
        let path = self.stats.join(name);

        fs::write(&path, render_stats(write, read))
            .with_context(|| format!("Couldn't save statistics: {}", path.display()))
    }

    /// Opens `<output>/trace.txt` for streaming trace records into.
    pub fn trace_writer(&self) -> Result<TraceWriter<BufWriter<File>>> {
        let path = self.root.join("trace.txt");
        let file = File::create(&path)
            .with_context(|| format!("Couldn't create trace: {}", path.display()))?;

        Ok(TraceWriter::new(BufWriter::new(file)))
    }
}

fn render_stats(write: &Touches, read: &Touches) -> String {
    let total = *write + *read;
    let mut csv = String::from("kind,megabytes,pixel_touches,bitmask_touches,row_offset_touches\n");

    for (kind, touches) in [("write", write), ("read", read), ("total", &total)].iter() {
        csv += &format!(
            "{},{},{},{},{}\n",
            kind,
            touches.megabytes(),
            touches.pixels,
            touches.bitmask,
            touches.row_offsets
        );
    }

    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_have_write_read_and_total_rows() {
        let write = Touches {
            pixels: 1_000_000,
            bitmask: 0,
            row_offsets: 0,
        };

        let read = Touches {
            pixels: 0,
            bitmask: 4,
            row_offsets: 1,
        };

        assert_eq!(
            render_stats(&write, &read),
            "kind,megabytes,pixel_touches,bitmask_touches,row_offset_touches\n\
             write,3,1000000,0,0\n\
             read,0.000004,0,4,1\n\
             total,3.000004,1000000,4,1\n"
        );
    }
}
