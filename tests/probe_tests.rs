use std::fs;

use assert_fs::prelude::*;
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use pattern_move::{engine, OrganizeRequest, RunContext, RunOptions};

/// Minimal MP4: an `ftyp` atom followed by `moov` containing an `mvhd`
/// (version 0) with the given creation time.
fn tiny_mp4(created_utc: DateTime<Utc>) -> Vec<u8> {
    let epoch = Utc.with_ymd_and_hms(1904, 1, 1, 0, 0, 0).unwrap();
    let seconds = (created_utc - epoch).num_seconds() as u32;

    let mut mvhd_body = vec![0u8; 4]; // version + flags
    mvhd_body.extend_from_slice(&seconds.to_be_bytes()); // creation
    mvhd_body.extend_from_slice(&seconds.to_be_bytes()); // modification
    mvhd_body.extend_from_slice(&1000u32.to_be_bytes()); // timescale
    mvhd_body.extend_from_slice(&0u32.to_be_bytes()); // duration

    let mut mvhd = Vec::new();
    mvhd.extend_from_slice(&((8 + mvhd_body.len()) as u32).to_be_bytes());
    mvhd.extend_from_slice(b"mvhd");
    mvhd.extend_from_slice(&mvhd_body);

    let mut moov = Vec::new();
    moov.extend_from_slice(&((8 + mvhd.len()) as u32).to_be_bytes());
    moov.extend_from_slice(b"moov");
    moov.extend_from_slice(&mvhd);

    let mut out = Vec::new();
    out.extend_from_slice(&16u32.to_be_bytes());
    out.extend_from_slice(b"ftyp");
    out.extend_from_slice(b"isommp42");
    out.extend_from_slice(&moov);
    out
}

#[test]
fn commit_places_video_by_embedded_creation_date() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("in");
    let target = temp.child("out");
    source.create_dir_all().unwrap();
    target.create_dir_all().unwrap();

    let shot_at = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
    let clip = source.child("clip.mp4");
    clip.write_binary(&tiny_mp4(shot_at)).unwrap();

    let req = OrganizeRequest {
        pattern: "{CREATED_YYYY}/{CREATED_MM}{CREATED_DD}/{FILE_NAME}".into(),
        source_root: source.path().to_path_buf(),
        target_root: target.path().to_path_buf(),
    };
    let opts = RunOptions {
        workers: 1,
        ..RunOptions::default()
    };
    let result = engine::commit(&req, &opts, &RunContext::default()).unwrap();
    assert_eq!(result.succeeded, 1);

    // The engine renders in local time; derive the expected directory the
    // same way so the test holds in any timezone.
    let local: DateTime<Local> = shot_at.into();
    let expected = target
        .path()
        .join(format!("{:04}", local.year()))
        .join(format!("{:02}{:02}", local.month(), local.day()))
        .join("clip.mp4");
    assert!(
        expected.exists(),
        "expected {} to exist",
        expected.display()
    );
    assert!(!clip.path().exists());
}

#[test]
fn disabled_probe_ignores_embedded_dates() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("in");
    let target = temp.child("out");
    source.create_dir_all().unwrap();
    target.create_dir_all().unwrap();

    let shot_at = Utc.with_ymd_and_hms(1999, 1, 2, 12, 0, 0).unwrap();
    source
        .child("clip.mp4")
        .write_binary(&tiny_mp4(shot_at))
        .unwrap();

    let req = OrganizeRequest {
        pattern: "{CREATED_YYYY}/{FILE_NAME}".into(),
        source_root: source.path().to_path_buf(),
        target_root: target.path().to_path_buf(),
    };
    let opts = RunOptions {
        workers: 1,
        probe_capture_time: false,
        ..RunOptions::default()
    };
    let result = engine::commit(&req, &opts, &RunContext::default()).unwrap();
    assert_eq!(result.succeeded, 1);

    // With the probe off the file was just written, so it cannot land in the
    // embedded 1999 bucket.
    assert!(!target.path().join("1999").exists());
    let years: Vec<_> = fs::read_dir(target.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(years.len(), 1);
}
