mod common;

use assert_cmd::Command;
use common::{jpeg_bytes, png_bytes, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_subcommand_help() {
    for sub in ["open", "compress", "info"] {
        let mut cmd = Command::cargo_bin("img-preview").unwrap();
        cmd.args([sub, "--help"]);
        cmd.assert().success();
    }
}

#[test]
fn test_compress_missing_args() {
    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.args(["compress"]);
    cmd.assert().failure();
}

#[test]
fn test_compress_nonexistent_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.args(["compress", "nonexistent.jpg", "-o"])
        .arg(temp_dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_compress_writes_download() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "photo.jpg", &jpeg_bytes(120, 80));
    let out_dir = temp_dir.path().join("out");

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("compress").arg(&input).args(["-q", "50", "-o"]).arg(&out_dir);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("120 x 80"))
        .stdout(predicate::str::contains("Compression ratio:"));

    let written = out_dir.join("compressed_photo.jpg");
    assert!(written.exists());
    let bytes = std::fs::read(written).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
}

#[test]
fn test_compress_with_invalid_quality() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "photo.jpg", &jpeg_bytes(8, 8));

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("compress").arg(&input).args(["--quality", "0"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quality value: 0"));
}

#[test]
fn test_compress_text_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "notes.txt", b"not an image");

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("compress").arg(&input).arg("-o").arg(temp_dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type: text/plain"));
    assert!(!temp_dir.path().join("compressed_notes.txt").exists());
}

#[test]
fn test_compress_fake_image_fails_to_decode() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "fake.jpg", b"fake image data");

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("compress").arg(&input).arg("-o").arg(temp_dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode image"));
}

#[test]
fn test_info_reports_dimensions() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "logo.png", &png_bytes(32, 16));

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("info").arg(&input);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("32 x 16"))
        .stdout(predicate::str::contains("image/png"))
        .stdout(predicate::str::contains("optimizer effort"));
}

#[test]
fn test_info_nonexistent_file() {
    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.args(["info", "nonexistent.jpg"]);
    cmd.assert().failure();
}

#[test]
fn test_open_session_script() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "photo.jpg", &jpeg_bytes(64, 48));
    let out_dir = temp_dir.path().join("downloads");

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("open").arg(&input).arg("-o").arg(&out_dir);
    cmd.write_stdin("quality 10\nquality 90\nquality 30\nstatus\nsave\nquit\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Quality: 30%"))
        .stdout(predicate::str::contains("64 x 48"))
        .stdout(predicate::str::contains("Saved"));

    assert!(out_dir.join("compressed_photo.jpg").exists());
}

#[test]
fn test_open_session_reports_bad_commands_and_continues() {
    let temp_dir = TempDir::new().unwrap();
    let text = write_file(temp_dir.path(), "notes.txt", b"hello");

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("open").arg("-o").arg(temp_dir.path());
    cmd.write_stdin(format!("dance\nopen {}\nsave\nquit\n", text.display()));
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("unknown command"))
        .stderr(predicate::str::contains("Unsupported file type"))
        .stderr(predicate::str::contains("Nothing to download"));
}

#[test]
fn test_open_session_survives_non_utf8_line() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "photo.jpg", &jpeg_bytes(32, 24));
    let out_dir = temp_dir.path().join("downloads");

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("open").arg(&input).arg("-o").arg(&out_dir);
    cmd.write_stdin(b"open /tmp/caf\xe9.jpg\nquality 30\nsave\nquit\n".to_vec());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("not valid UTF-8"))
        .stdout(predicate::str::contains("Quality: 30%"));

    assert!(out_dir.join("compressed_photo.jpg").exists());
}

#[test]
fn test_compress_reports_encode_failure() {
    let temp_dir = TempDir::new().unwrap();
    // Decodes as PNG but is declared as an icon, which has no encoder.
    let input = write_file(temp_dir.path(), "favicon.ico", &png_bytes(16, 16));

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("compress").arg(&input).arg("-o").arg(temp_dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to re-encode image"))
        .stderr(predicate::str::contains("Nothing to download").not());
    assert!(!temp_dir.path().join("compressed_favicon.ico").exists());
}

#[test]
fn test_compress_text_file_error_is_the_cause() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_file(temp_dir.path(), "notes.txt", b"plain words");

    let mut cmd = Command::cargo_bin("img-preview").unwrap();
    cmd.arg("compress").arg(&input).arg("-o").arg(temp_dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Caused by"))
        .stderr(predicate::str::contains("Nothing to download").not());
}
