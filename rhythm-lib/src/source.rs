use crate::{Params, RegionSet, RgbImage};
use ::image::io::Reader as ImageReader;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Frames of a run paired with their region files, in path order.
#[derive(Clone, Debug)]
pub struct Source {
    entries: Vec<SourceEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub image: PathBuf,
    /// Frames without a region file are captured whole.
    pub regions: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct SourceFrame {
    /// File name of the frame image.
    pub name: String,
    /// File name its statistics are saved under.
    pub stats_name: String,
    pub image: RgbImage,
    pub regions: RegionSet,
}

impl Source {
    pub fn from_dirs(images: impl AsRef<Path>, regions: impl AsRef<Path>) -> Result<Self> {
        let images = list(images.as_ref()).context("Couldn't list frames")?;
        let regions = list(regions.as_ref()).context("Couldn't list regions")?;

        if regions.len() > images.len() {
            tracing::warn!(
                images = images.len(),
                regions = regions.len(),
                "more region files than frames; extra ones are ignored"
            );
        }

        let mut regions = regions.into_iter();

        let entries = images
            .into_iter()
            .map(|image| SourceEntry {
                image,
                regions: regions.next(),
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SourceEntry {
    pub fn load(&self) -> Result<SourceFrame> {
        let path = &self.image;

        let image = ImageReader::open(path)
            .with_context(|| format!("Couldn't open frame: {}", path.display()))?
            .decode()
            .with_context(|| format!("Couldn't decode frame: {}", path.display()))?
            .to_rgb8();

        let params = Params::of(&image)
            .with_context(|| format!("Couldn't use frame: {}", path.display()))?;

        let regions = match &self.regions {
            Some(regions) => {
                let text = fs::read_to_string(regions)
                    .with_context(|| format!("Couldn't read regions: {}", regions.display()))?;

                RegionSet::parse(&params, &text)
                    .with_context(|| format!("Couldn't parse regions: {}", regions.display()))?
            }

            None => RegionSet::full_frame(&params),
        };

        let name = file_name(path);

        let stats_name = match &self.regions {
            Some(regions) => file_name(regions),
            None => format!("{}.csv", stem(path)),
        };

        Ok(SourceFrame {
            name,
            stats_name,
            image,
            regions,
        })
    }
}

fn list(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join("*");

    let mut paths = glob::glob(&pattern.to_string_lossy())
        .with_context(|| format!("Invalid directory: {}", dir.display()))?
        .map(|path| path.context("Couldn't read directory entry"))
        .collect::<Result<Vec<_>>>()?;

    paths.retain(|path| path.is_file());
    paths.sort();

    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::Rgb;

    fn write_frame(dir: &Path, name: &str) {
        RgbImage::from_pixel(4, 2, Rgb([9, 9, 9]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn pairs_frames_with_regions_in_order() {
        let frames = tempfile::tempdir().unwrap();
        let regions = tempfile::tempdir().unwrap();

        write_frame(frames.path(), "b.png");
        write_frame(frames.path(), "a.png");
        fs::write(regions.path().join("a.csv"), "0,2,1,0,1,1\n").unwrap();

        let source = Source::from_dirs(frames.path(), regions.path()).unwrap();

        assert_eq!(
            source.entries(),
            [
                SourceEntry {
                    image: frames.path().join("a.png"),
                    regions: Some(regions.path().join("a.csv")),
                },
                SourceEntry {
                    image: frames.path().join("b.png"),
                    regions: None,
                },
            ]
        );

        let first = source.entries()[0].load().unwrap();
        let second = source.entries()[1].load().unwrap();

        assert_eq!(first.name, "a.png");
        assert_eq!(first.stats_name, "a.csv");
        assert_eq!(first.regions.len(), 1);
        assert_eq!(second.stats_name, "b.csv");
        assert_eq!(second.regions, RegionSet::full_frame(&Params::new(4, 2).unwrap()));
        assert_eq!(second.image.get_pixel(3, 1), &Rgb([9, 9, 9]));
    }

    #[test]
    fn bad_region_file_is_fatal() {
        let frames = tempfile::tempdir().unwrap();
        let regions = tempfile::tempdir().unwrap();

        write_frame(frames.path(), "a.png");
        fs::write(regions.path().join("a.csv"), "0,2,one,0,1,1\n").unwrap();

        let source = Source::from_dirs(frames.path(), regions.path()).unwrap();
        let err = source.entries()[0].load().unwrap_err();

        assert!(err.to_string().starts_with("Couldn't parse regions"));
        assert!(matches!(
            err.downcast_ref::<crate::Error>(),
            Some(crate::Error::Parse { line: 1, .. })
        ));
    }
}
