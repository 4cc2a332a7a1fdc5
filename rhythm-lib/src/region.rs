use crate::*;
use std::convert::TryFrom;

/// Rectangle of a frame, bounds inclusive, in top-down coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x0: u32,
    pub x1: u32,
    pub y0: u32,
    pub y1: u32,
    pub stride: u8,
    pub skip: bool,
}

impl Region {
    pub fn full_frame(params: &Params) -> Self {
        Self {
            x0: 0,
            x1: params.width,
            y0: 0,
            y1: params.height,
            stride: 0,
            skip: false,
        }
    }

    /// Parses one region-file line: `x0, y0, x1, y1, stride + 1, skip + 1`,
    /// with both y values measured from the bottom of the frame.
    pub fn parse(params: &Params, line: usize, text: &str) -> Result<Self> {
        let mut fields = text.split(',');

        let mut next = |name: &str| -> Result<i64> {
            let raw = fields
                .next()
                .ok_or_else(|| Error::parse(line, format!("missing field `{}`", name)))?;

            parse_number(raw).ok_or_else(|| {
                Error::parse(line, format!("field `{}` isn't a number: {:?}", name, raw.trim()))
            })
        };

        let x0 = next("x0")?;
        let y0 = next("y0")?;
        let x1 = next("x1")?;
        let y1 = next("y1")?;
        let stride = next("stride")?;
        let skip = next("skip")?;

        Ok(Self {
            x0: column(line, "x0", x0)?,
            x1: column(line, "x1", x1)?,
            y0: flip(params, line, "y0", y0)?,
            y1: flip(params, line, "y1", y1)?,
            stride: stride.wrapping_sub(1) as u8,
            skip: skip.wrapping_sub(1) != 0,
        })
    }

    pub fn contains(&self, x: u32, row: u32) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= row && row <= self.y1
    }

    /// Classification this region alone gives to the block starting at `x`.
    pub fn class_at(&self, x: u32) -> BlockClass {
        BlockClass::resolve(x & (self.stride as u32) > 0, self.skip)
    }

    fn is_inverted(&self) -> bool {
        self.x0 > self.x1 || self.y0 > self.y1
    }
}

fn parse_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();

    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64)
    })
}

fn column(line: usize, name: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::parse(line, format!("field `{}` is out of range: {}", name, value)))
}

fn flip(params: &Params, line: usize, name: &str, value: i64) -> Result<u32> {
    let row = (params.height as i64)
        .checked_sub(value)
        .ok_or_else(|| Error::parse(line, format!("field `{}` is out of range: {}", name, value)))?;

    column(line, name, row.max(0))
}

/// Regions of one frame, sorted by `x0`; never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new(params: &Params, mut regions: Vec<Region>) -> Self {
        if regions.is_empty() {
            regions.push(Region::full_frame(params));
        }

        for region in regions.iter().filter(|region| region.is_inverted()) {
            tracing::warn!(?region, "region has inverted bounds and will never match");
        }

        regions.sort_by_key(|region| region.x0);

        Self { regions }
    }

    pub fn full_frame(params: &Params) -> Self {
        Self::new(params, Vec::new())
    }

    pub fn parse(params: &Params, text: &str) -> Result<Self> {
        let regions = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| Region::parse(params, idx + 1, line))
            .collect::<Result<_>>()?;

        Ok(Self::new(params, regions))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }
}
