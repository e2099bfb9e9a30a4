use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder};
use memmap2::Mmap;
use ndarray::Array2;
use num_traits::ToPrimitive;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{CentaurError, Result};
use crate::frame::{Frame, FrameMetadata};

pub const FITS_BLOCK_SIZE: usize = 2880;
pub const FITS_CARD_SIZE: usize = 80;

/// A parsed header card value.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    String(String),
    Integer(i64),
    Float(f64),
    Logical(bool),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Primary HDU header keywords. Later duplicates overwrite earlier ones.
#[derive(Clone, Debug, Default)]
pub struct FitsHeader {
    cards: BTreeMap<String, HeaderValue>,
}

impl FitsHeader {
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards.get(&key.to_uppercase())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_i64)
    }

    /// String value; numbers are rendered so `FILTER = 3` still reads.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            HeaderValue::String(s) => Some(s.clone()),
            HeaderValue::Integer(i) => Some(i.to_string()),
            HeaderValue::Float(f) => Some(f.to_string()),
            HeaderValue::Logical(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Map the recognized camera/telescope keywords into typed metadata.
    pub fn frame_metadata(&self) -> FrameMetadata {
        FrameMetadata {
            exposure_time: self
                .get_f64("EXPTIME")
                .or_else(|| self.get_f64("EXPOSURE")),
            gain: self.get_f64("GAIN"),
            read_noise: self.get_f64("RDNOISE"),
            dark_current: self.get_f64("DARKCURR"),
            saturation_level: self.get_f64("SATURATE"),
            pixel_scale: self.get_f64("PIXSCALE"),
            focal_length_mm: self.get_f64("FOCALLEN"),
            pixel_size_um: self.get_f64("XPIXSZ"),
            zero_point: self.get_f64("MAGZPT"),
            filter: self.get_string("FILTER").filter(|s| !s.is_empty()),
            target: self.get_string("OBJECT").filter(|s| !s.is_empty()),
        }
    }
}

/// Memory-mapped reader for the primary image HDU of a FITS file.
pub struct FitsReader {
    mmap: Mmap,
    path: PathBuf,
    pub header: FitsHeader,
    data_offset: usize,
    bitpix: i64,
    width: usize,
    height: usize,
}

impl FitsReader {
    /// Open a FITS file and parse its primary header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < FITS_BLOCK_SIZE || !mmap.starts_with(b"SIMPLE  ") {
            return Err(CentaurError::InvalidFits(
                "missing SIMPLE keyword in first card".into(),
            ));
        }

        let (header, header_len) = parse_header(&mmap)?;
        let bitpix = header
            .get_i64("BITPIX")
            .ok_or_else(|| CentaurError::InvalidFits("missing BITPIX".into()))?;
        if !matches!(bitpix, 8 | 16 | 32 | -32 | -64) {
            return Err(CentaurError::InvalidFits(format!(
                "unsupported BITPIX {bitpix}"
            )));
        }

        let naxis = header.get_i64("NAXIS").unwrap_or(0);
        if !(2..=3).contains(&naxis) {
            return Err(CentaurError::InvalidFits(format!(
                "expected a 2D or 3D image, NAXIS = {naxis}"
            )));
        }
        let axis = |n: usize| -> Result<usize> {
            let key = format!("NAXIS{n}");
            match header.get_i64(&key) {
                Some(v) if v > 0 => Ok(v as usize),
                Some(v) => Err(CentaurError::InvalidFits(format!("{key} = {v}"))),
                None => Err(CentaurError::InvalidFits(format!("missing {key}"))),
            }
        };
        let width = axis(1)?;
        let height = axis(2)?;
        if naxis == 3 {
            debug!(planes = axis(3)?, "3D image, using the first plane");
        }

        let plane_bytes = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(bitpix.unsigned_abs() as usize / 8))
            .ok_or_else(|| CentaurError::InvalidFits("image dimensions overflow".into()))?;
        if mmap.len() < header_len + plane_bytes {
            return Err(CentaurError::InvalidFits(format!(
                "file truncated: expected at least {} bytes, got {}",
                header_len + plane_bytes,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
            header,
            data_offset: header_len,
            bitpix,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bitpix(&self) -> i64 {
        self.bitpix
    }

    pub fn metadata(&self) -> FrameMetadata {
        self.header.frame_metadata()
    }

    /// File name without directories, used as the frame identity.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Decode the first image plane to physical values (BZERO + BSCALE * raw).
    ///
    /// Integer samples equal to `BLANK` become NaN.
    pub fn read_pixels(&self) -> Result<Array2<f32>> {
        let bytes_per_sample = self.bitpix.unsigned_abs() as usize / 8;
        let len = self.width * self.height * bytes_per_sample;
        let raw = &self.mmap[self.data_offset..self.data_offset + len];

        let bzero = self.header.get_f64("BZERO").unwrap_or(0.0);
        let bscale = self.header.get_f64("BSCALE").unwrap_or(1.0);
        let blank = self.header.get_i64("BLANK");

        let scale = |v: f64| (bzero + bscale * v) as f32;
        let samples = raw.par_chunks_exact(bytes_per_sample);
        let pixels: Vec<f32> = match self.bitpix {
            8 => samples.map(|c| integer_sample(c[0], blank, scale)).collect(),
            16 => samples
                .map(|c| integer_sample(BigEndian::read_i16(c), blank, scale))
                .collect(),
            32 => samples
                .map(|c| integer_sample(BigEndian::read_i32(c), blank, scale))
                .collect(),
            -32 => samples.map(|c| scale(BigEndian::read_f32(c) as f64)).collect(),
            -64 => samples.map(|c| scale(BigEndian::read_f64(c))).collect(),
            other => {
                return Err(CentaurError::InvalidFits(format!(
                    "unsupported BITPIX {other}"
                )))
            }
        };

        Array2::from_shape_vec((self.height, self.width), pixels)
            .map_err(|e| CentaurError::InvalidFits(e.to_string()))
    }

    /// Decode pixels and metadata into a `Frame`.
    pub fn read_frame(&self) -> Result<Frame> {
        Ok(Frame::new(
            self.read_pixels()?,
            self.filename(),
            self.metadata(),
        ))
    }
}

fn integer_sample<T: ToPrimitive + Copy>(
    raw: T,
    blank: Option<i64>,
    scale: impl Fn(f64) -> f32,
) -> f32 {
    if blank.is_some() && raw.to_i64() == blank {
        return f32::NAN;
    }
    raw.to_f64().map_or(f32::NAN, scale)
}

/// Parse header cards up to `END`. Returns the header and its padded length.
fn parse_header(buf: &[u8]) -> Result<(FitsHeader, usize)> {
    let mut header = FitsHeader::default();
    for (i, card) in buf.chunks_exact(FITS_CARD_SIZE).enumerate() {
        let keyword = String::from_utf8_lossy(&card[..8]).trim().to_string();
        if keyword == "END" {
            let used = (i + 1) * FITS_CARD_SIZE;
            let padded = used.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE;
            return Ok((header, padded));
        }
        if keyword.is_empty() || &card[8..10] != b"= " {
            continue;
        }
        let text = String::from_utf8_lossy(&card[10..]);
        if let Some(value) = parse_value(&text) {
            header.cards.insert(keyword, value);
        }
    }
    Err(CentaurError::InvalidFits("header has no END card".into()))
}

/// Parse the value field of a card (the text after `= `).
fn parse_value(text: &str) -> Option<HeaderValue> {
    let text = text.trim_start();
    if let Some(rest) = text.strip_prefix('\'') {
        // Quoted string; '' is an escaped quote.
        let mut out = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    out.push('\'');
                    chars.next();
                } else {
                    return Some(HeaderValue::String(out.trim_end().to_string()));
                }
            } else {
                out.push(c);
            }
        }
        return None;
    }

    let value = text.split('/').next().unwrap_or("").trim();
    match value {
        "" => None,
        "T" => Some(HeaderValue::Logical(true)),
        "F" => Some(HeaderValue::Logical(false)),
        _ => value
            .parse::<i64>()
            .map(HeaderValue::Integer)
            .ok()
            .or_else(|| {
                value
                    .replace(['D', 'd'], "E")
                    .parse::<f64>()
                    .ok()
                    .map(HeaderValue::Float)
            }),
    }
}
