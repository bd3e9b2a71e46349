use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serial_test::serial;
use tempfile::tempdir;

const CONFIG_ENV: &str = "PATTERN_MOVE_CONFIG";

/// A minimal existing config so the binary neither creates a template under
/// the real user config dir nor bails on a dangling env override.
fn write_cfg(dir: &Path) -> PathBuf {
    let path = dir.join("config.xml");
    let xml = r#"<config>
  <pattern_version>1</pattern_version>
  <log_level>quiet</log_level>
</config>"#;
    fs::write(&path, xml).unwrap();
    path
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
#[serial]
fn print_config_reports_explicit_override() {
    let td = tempdir().unwrap();
    let cfg_path = write_cfg(td.path());

    let me = assert_cmd::cargo::cargo_bin!("pattern_move");
    let out = Command::new(me)
        .env(CONFIG_ENV, &cfg_path)
        .arg("--print-config")
        .output()
        .expect("spawn binary");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains(CONFIG_ENV),
        "unexpected stdout: {stdout}"
    );
}

#[test]
#[serial]
fn no_subcommand_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = write_cfg(td.path());

    let me = assert_cmd::cargo::cargo_bin!("pattern_move");
    let out = Command::new(me)
        .env(CONFIG_ENV, &cfg_path)
        .output()
        .expect("spawn binary");

    assert!(!out.status.success(), "expected failure without subcommand");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("no subcommand"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
#[serial]
fn preview_lists_mappings_and_moves_nothing() {
    let td = tempdir().unwrap();
    let cfg_path = write_cfg(td.path());
    let source = td.path().join("in");
    let target = td.path().join("out");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&target).unwrap();
    write_file(&source.join("letter.txt"), "dear");

    let me = assert_cmd::cargo::cargo_bin!("pattern_move");
    let out = Command::new(me)
        .env(CONFIG_ENV, &cfg_path)
        .args(["preview", "--pattern", "{FILE_NAME}"])
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("letter.txt"), "unexpected stdout: {stdout}");

    assert!(source.join("letter.txt").exists());
    assert!(!target.join("letter.txt").exists());
}

#[test]
#[serial]
fn commit_moves_the_tree() {
    let td = tempdir().unwrap();
    let cfg_path = write_cfg(td.path());
    let source = td.path().join("in");
    let target = td.path().join("out");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&target).unwrap();
    write_file(&source.join("a.txt"), "alpha");
    write_file(&source.join("nested/b.txt"), "beta");

    let me = assert_cmd::cargo::cargo_bin!("pattern_move");
    let out = Command::new(me)
        .env(CONFIG_ENV, &cfg_path)
        .args(["commit", "--pattern", "{FILE_NAME}", "--workers", "1"])
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(!source.join("a.txt").exists());
    assert!(!source.join("nested/b.txt").exists());
    assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(target.join("b.txt")).unwrap(), "beta");
}

#[test]
#[serial]
fn commit_dry_run_touches_nothing() {
    let td = tempdir().unwrap();
    let cfg_path = write_cfg(td.path());
    let source = td.path().join("in");
    let target = td.path().join("out");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&target).unwrap();
    write_file(&source.join("keep.txt"), "here");

    let me = assert_cmd::cargo::cargo_bin!("pattern_move");
    let out = Command::new(me)
        .env(CONFIG_ENV, &cfg_path)
        .args(["commit", "--dry-run", "--pattern", "{FILE_NAME}"])
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Dry-run"), "unexpected stdout: {stdout}");
    assert!(source.join("keep.txt").exists());
    assert!(!target.join("keep.txt").exists());
}

#[test]
#[serial]
fn collision_is_a_process_failure_naming_both_sources() {
    let td = tempdir().unwrap();
    let cfg_path = write_cfg(td.path());
    let source = td.path().join("in");
    let target = td.path().join("out");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&target).unwrap();
    write_file(&source.join("docs/x.txt"), "1");
    write_file(&source.join("images/x.txt"), "2");

    let me = assert_cmd::cargo::cargo_bin!("pattern_move");
    let out = Command::new(me)
        .env(CONFIG_ENV, &cfg_path)
        .args(["commit", "--pattern", "{FILE_NAME}"])
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .output()
        .expect("spawn binary");

    assert!(!out.status.success(), "collision must fail the run");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("docs"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("images"), "unexpected stderr: {stderr}");

    assert!(source.join("docs/x.txt").exists());
    assert!(source.join("images/x.txt").exists());
    assert!(!target.join("x.txt").exists());
}

#[test]
#[serial]
fn save_config_persists_effective_settings() {
    let td = tempdir().unwrap();
    let cfg_path = write_cfg(td.path());
    let source = td.path().join("in");
    let target = td.path().join("out");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&target).unwrap();

    let me = assert_cmd::cargo::cargo_bin!("pattern_move");
    let out = Command::new(me)
        .env(CONFIG_ENV, &cfg_path)
        .args(["preview", "--pattern", "{FILE_NAME}", "--save-config"])
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let saved = fs::read_to_string(&cfg_path).unwrap();
    assert!(saved.contains("{FILE_NAME}"), "saved config: {saved}");
    assert!(saved.contains("source_root"), "saved config: {saved}");
}
