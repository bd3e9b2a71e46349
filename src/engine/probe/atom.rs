//! QuickTime/MP4 creation-time extraction.
//! Walks the top-level atom list to `moov`, then `mvhd`, and reads the
//! creation timestamp: seconds since 1904-01-01 UTC, 32-bit in version 0
//! headers and 64-bit in version 1.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};

use super::{read_u32, read_u64, read_u8};

struct AtomHead {
    /// Payload length, header already consumed.
    length: u64,
    fourcc: [u8; 4],
}

pub(super) fn created_at(path: &Path) -> Result<DateTime<Local>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    seek_to(&mut reader, *b"moov")?;
    seek_to(&mut reader, *b"mvhd")?;
    let created = read_mvhd_creation(&mut reader)?;
    Ok(created.with_timezone(&Local))
}

/// Advance past atoms until one with the wanted fourcc; the reader is left
/// at the start of its payload. EOF surfaces as a read error.
fn seek_to<R: Read + Seek>(reader: &mut R, fourcc: [u8; 4]) -> Result<AtomHead> {
    loop {
        let head = read_head(reader)?;
        if head.fourcc == fourcc {
            return Ok(head);
        }
        reader
            .seek(SeekFrom::Current(head.length as i64))
            .context("seek past atom")?;
    }
}

fn read_head<R: Read>(reader: &mut R) -> Result<AtomHead> {
    let length = read_u32(reader).context("read atom size")? as u64;
    let mut fourcc = [0u8; 4];
    reader.read_exact(&mut fourcc).context("read atom type")?;
    if length == 1 {
        // Size 1 flags a 64-bit extended size following the fourcc.
        let length = read_u64(reader).context("read extended atom size")?;
        if length < 16 {
            bail!("invalid extended atom length {length}");
        }
        return Ok(AtomHead {
            length: length - 16,
            fourcc,
        });
    }
    if length < 8 {
        bail!("invalid atom length {length}");
    }
    Ok(AtomHead {
        length: length - 8,
        fourcc,
    })
}

fn read_mvhd_creation<R: Read>(reader: &mut R) -> Result<DateTime<Utc>> {
    // mvhd layout: 1 byte version, 3 bytes flags, then the creation time
    // (u32 in version 0, u64 in version 1).
    let version = read_u8(reader).context("read mvhd version")?;
    let mut flags = [0u8; 3];
    reader.read_exact(&mut flags).context("read mvhd flags")?;

    let seconds = if version == 0 {
        read_u32(reader).context("read mvhd creation time")? as i64
    } else {
        read_u64(reader).context("read mvhd creation time")? as i64
    };
    let delta =
        TimeDelta::try_seconds(seconds).ok_or_else(|| anyhow!("creation time out of range"))?;
    Ok(quicktime_epoch()? + delta)
}

fn quicktime_epoch() -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(1904, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow!("QuickTime epoch not representable"))
}
