//! End-to-end checks of the `imcls` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::TempDir;

/// Temp dir with an empty config file so the user's config is never read.
fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").unwrap();
    (dir, config)
}

fn write_png(dir: &Path) -> PathBuf {
    let path = dir.join("cat.png");
    RgbImage::from_pixel(12, 9, Rgb([200, 120, 40]))
        .save(&path)
        .unwrap();
    path
}

fn imcls(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("imcls").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_models_list_shows_catalog() {
    let (_dir, config) = workspace();

    imcls(&config)
        .args(["models", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("InceptionV3"))
        .stdout(predicate::str::contains("ResNet50"))
        .stdout(predicate::str::contains("Xception"))
        .stdout(predicate::str::contains("224x224"));
}

#[test]
fn test_models_status_reports_missing_assets() {
    let (dir, config) = workspace();

    imcls(&config)
        .args(["models", "status", "--json"])
        .env("NO_COLOR", "1")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"size_bytes\": null"));
}

#[test]
fn test_labels_by_index() {
    let (_dir, config) = workspace();

    imcls(&config)
        .args(["labels", "--index", "281"])
        .assert()
        .success()
        .stdout("tabby\n");
}

#[test]
fn test_labels_index_out_of_range() {
    let (_dir, config) = workspace();

    imcls(&config)
        .args(["labels", "--index", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_labels_search() {
    let (_dir, config) = workspace();

    imcls(&config)
        .args(["labels", "--search", "RETRIEVER"])
        .assert()
        .success()
        .stdout(predicate::str::contains("golden retriever"));
}

#[test]
fn test_classify_missing_image() {
    let (dir, config) = workspace();

    imcls(&config)
        .arg("classify")
        .arg(dir.path().join("nope.jpg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_classify_unknown_model() {
    let (dir, config) = workspace();
    let image = write_png(dir.path());

    imcls(&config)
        .arg("classify")
        .arg(&image)
        .args(["--model", "MobileNet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown model: MobileNet"));
}

#[test]
fn test_classify_without_model_assets() {
    let (dir, config) = workspace();
    let image = write_png(dir.path());

    imcls(&config)
        .arg("classify")
        .arg(&image)
        .args(["--model", "ResNet50", "--lazy", "--asset-dir"])
        .arg(dir.path().join("assets"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model ResNet50 failed to load"));
}

#[test]
fn test_config_init_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");

    imcls(&config).args(["config", "init"]).assert().success();
    assert!(config.exists());

    imcls(&config)
        .args(["config", "get", "prediction.top_k"])
        .assert()
        .success()
        .stdout("10\n");

    imcls(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_set_round_trips_through_file() {
    let (_dir, config) = workspace();

    imcls(&config)
        .args(["config", "set", "prediction.default_model", "Xception"])
        .assert()
        .success();

    imcls(&config)
        .args(["config", "get", "prediction.default_model"])
        .assert()
        .success()
        .stdout("\"Xception\"\n");
}

#[test]
fn test_config_get_unknown_key() {
    let (_dir, config) = workspace();

    imcls(&config)
        .args(["config", "get", "prediction.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
