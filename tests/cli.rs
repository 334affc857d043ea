use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn snapgrab_cmd() -> Command {
    Command::cargo_bin("snapgrab").expect("binary exists")
}

/// Writes a gallery blob with one PNG record so gallery subcommands have
/// something to operate on without touching the capture pipeline.
fn seeded_gallery(temp: &TempDir) -> PathBuf {
    let blob = temp.path().join("gallery.json");
    std::fs::write(
        &blob,
        r#"[{
            "id": "7f9c24e5-2a7e-4c6b-9d2e-000000000001",
            "name": "desk",
            "tags": ["work"],
            "format": "png",
            "width": 4,
            "height": 2,
            "timestamp": "2026-08-20T09:30:00+00:00",
            "data": "AQIDBA=="
        }]"#,
    )
    .unwrap();
    blob
}

#[test]
fn help_prints_usage() {
    snapgrab_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Screenshot capture and gallery tool for Linux desktops",
        ));
}

#[test]
fn empty_gallery_lists_as_empty() {
    let temp = TempDir::new().unwrap();
    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "list"])
        .arg("--gallery")
        .arg(temp.path().join("gallery.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("gallery is empty"));
}

#[test]
fn seeded_gallery_lists_record() {
    let temp = TempDir::new().unwrap();
    let blob = seeded_gallery(&temp);

    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "list", "--gallery"])
        .arg(&blob)
        .assert()
        .success()
        .stdout(predicate::str::contains("desk"))
        .stdout(predicate::str::contains("7f9c24e5"))
        .stdout(predicate::str::contains("work"));
}

#[test]
fn rename_by_id_prefix_persists() {
    let temp = TempDir::new().unwrap();
    let blob = seeded_gallery(&temp);

    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "rename", "7f9c24e5", "standup", "--gallery"])
        .arg(&blob)
        .assert()
        .success()
        .stdout(predicate::str::contains("renamed"));

    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "list", "--gallery"])
        .arg(&blob)
        .assert()
        .success()
        .stdout(predicate::str::contains("standup"));
}

#[test]
fn delete_unknown_id_fails() {
    let temp = TempDir::new().unwrap();
    let blob = seeded_gallery(&temp);

    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "delete", "deadbeef", "--gallery"])
        .arg(&blob)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no screenshot matches"));
}

#[test]
fn clear_requires_confirmation_flag() {
    let temp = TempDir::new().unwrap();
    let blob = seeded_gallery(&temp);

    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "clear", "--gallery"])
        .arg(&blob)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn save_writes_raw_image_bytes() {
    let temp = TempDir::new().unwrap();
    let blob = seeded_gallery(&temp);
    let out = temp.path().join("desk.png");

    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "save", "7f9c24e5", "--out"])
        .arg(&out)
        .arg("--gallery")
        .arg(&blob)
        .assert()
        .success();

    assert_eq!(std::fs::read(&out).unwrap(), [1, 2, 3, 4]);
}

#[test]
fn export_produces_zip_archive() {
    let temp = TempDir::new().unwrap();
    let blob = seeded_gallery(&temp);
    let out = temp.path().join("shots.zip");

    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["gallery", "export", "--out"])
        .arg(&out)
        .arg("--gallery")
        .arg(&blob)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 1 screenshot(s)"));

    assert!(out.exists());
}

#[test]
fn capture_rejects_malformed_rect() {
    let temp = TempDir::new().unwrap();
    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["capture", "--rect", "not-a-region"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn capture_rejects_out_of_range_quality() {
    let temp = TempDir::new().unwrap();
    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["capture", "--quality", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("5 is not in 10..=100"));
}

#[test]
fn capture_width_requires_height() {
    let temp = TempDir::new().unwrap();
    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["capture", "--width", "300"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn capture_help_notes_lossless_formats() {
    snapgrab_cmd()
        .args(["capture", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PNG and WebP encode lossless"));
}

#[test]
fn capture_fails_cleanly_without_portal() {
    let temp = TempDir::new().unwrap();
    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .env_remove("DBUS_SESSION_BUS_ADDRESS")
        .env_remove("XDG_RUNTIME_DIR")
        .args(["capture", "--rect", "0,0 20x20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("screenshot portal is unavailable"));
}

#[test]
fn watch_rejects_out_flag() {
    let temp = TempDir::new().unwrap();
    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["watch", "--interval", "5", "--out", "shots.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--out only applies"));
}

#[test]
fn watch_rejects_zero_interval() {
    let temp = TempDir::new().unwrap();
    snapgrab_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["watch", "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval must be at least"));
}
