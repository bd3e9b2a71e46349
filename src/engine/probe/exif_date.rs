//! EXIF capture-time extraction.
//! Prefers `DateTimeOriginal`, then `DateTimeDigitized`, then `DateTime`.
//! When the container layout defeats the exif crate's own detection, a raw
//! scan for the JPEG APP1 segment is tried before giving up.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};

use super::{read_u16, read_u8};

pub(super) fn taken_at(path: &Path) -> Result<DateTime<Local>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let exif_reader = exif::Reader::new();
    let parsed = match exif_reader.read_from_container(&mut reader) {
        Ok(parsed) => parsed,
        Err(_) => {
            reader
                .seek(SeekFrom::Start(0))
                .context("rewind for raw exif scan")?;
            let segment = find_app1_segment(&mut reader)?;
            exif_reader
                .read_raw(segment)
                .context("parse raw exif segment")?
        }
    };

    let field = parsed
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .or_else(|| parsed.get_field(exif::Tag::DateTimeDigitized, exif::In::PRIMARY))
        .or_else(|| parsed.get_field(exif::Tag::DateTime, exif::In::PRIMARY))
        .ok_or_else(|| anyhow!("no capture datetime field"))?;

    let naive = NaiveDateTime::parse_from_str(
        &field.display_value().to_string(),
        "%Y-%m-%d %H:%M:%S",
    )
    .context("parse exif datetime")?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| anyhow!("capture time not representable in local timezone"))
}

mod marker {
    /// First byte of every JPEG marker.
    pub const PREFIX: u8 = 0xff;
    pub const SOI: u8 = 0xd8;
    pub const APP1: u8 = 0xe1;
    pub const EXIF_ID: [u8; 6] = *b"Exif\0\0";
}

/// Scan a JPEG byte stream for the APP1 segment carrying EXIF data and
/// return the segment body with the identifier stripped.
fn find_app1_segment<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    loop {
        let skipped = reader
            .read_until(marker::PREFIX, &mut Vec::new())
            .context("scan for marker prefix")?;
        if skipped == 0 {
            bail!("no exif segment found");
        }

        let mut code = read_u8(reader).context("read marker code")?;
        while code == marker::PREFIX {
            code = read_u8(reader).context("read marker code")?;
        }
        if code != marker::SOI {
            continue;
        }
        if read_u8(reader).context("read marker code")? != marker::PREFIX {
            continue;
        }
        if read_u8(reader).context("read marker code")? != marker::APP1 {
            continue;
        }

        // Segment length includes its own two bytes.
        let len = read_u16(reader)
            .context("read segment length")?
            .checked_sub(2)
            .ok_or_else(|| anyhow!("invalid APP1 segment length"))?;
        let mut segment = vec![0u8; len.into()];
        reader
            .read_exact(&mut segment)
            .context("read APP1 segment")?;
        if segment.starts_with(&marker::EXIF_ID) {
            segment.drain(..marker::EXIF_ID.len());
            return Ok(segment);
        }
    }
}
