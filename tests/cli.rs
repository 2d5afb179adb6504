//! Drives the compiled binary.

use image::{Rgb, RgbImage};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn thumbfit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_thumbfit"))
}

#[test]
fn empty_source_exits_with_failure() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("empty");
    fs::create_dir_all(&source).unwrap();
    let output = tmp.path().join("out");

    let out = thumbfit()
        .current_dir(tmp.path())
        .arg("--source")
        .arg(&source)
        .arg("--output")
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("No images found"));
    assert!(!output.exists());
}

#[test]
fn missing_source_exits_with_failure() {
    let tmp = TempDir::new().unwrap();
    let out = thumbfit()
        .current_dir(tmp.path())
        .args(["--source", "does-not-exist", "thumbs"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn thumbs_prints_progress_and_summary() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("lv1");
    fs::create_dir_all(&source).unwrap();
    RgbImage::from_pixel(200, 100, Rgb([200, 40, 40]))
        .save(source.join("0001.jpg"))
        .unwrap();
    let report = tmp.path().join("report.json");

    let out = thumbfit()
        .current_dir(tmp.path())
        .arg("--source")
        .arg(&source)
        .args(["--output", "thumbs", "thumbs", "--report"])
        .arg(&report)
        .output()
        .unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[1/1] 0001.jpg -> WEBP"), "{stdout}");
    assert!(stdout.contains("Processed: 1 images"), "{stdout}");
    assert!(stdout.contains("OK: all images are under 20KB!"), "{stdout}");
    assert!(tmp.path().join("thumbs").join("0001.webp").exists());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["records"][0]["filename"], "0001.jpg");
    assert_eq!(json["webp_count"], 1);
}

#[test]
fn config_file_is_picked_up_from_working_directory() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("photos")).unwrap();
    fs::write(
        tmp.path().join("thumbfit.toml"),
        "input_dir = \"photos\"\n[budget]\nmax_bytes = 10240\n",
    )
    .unwrap();

    let out = thumbfit().current_dir(tmp.path()).arg("check").output().unwrap();

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Input: photos (0 images)"), "{stdout}");
    assert!(stdout.contains("Budget: 10KB"), "{stdout}");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "[budget]\nmax_kb = 20\n").unwrap();

    let out = thumbfit()
        .current_dir(tmp.path())
        .arg("--config")
        .arg(&config)
        .arg("check")
        .output()
        .unwrap();

    assert!(!out.status.success());
}

#[test]
fn gen_config_prints_valid_toml() {
    let out = thumbfit().arg("gen-config").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let value: toml::Value = toml::from_str(&text).unwrap();
    assert_eq!(value["budget"]["max_bytes"].as_integer(), Some(20480));
}
