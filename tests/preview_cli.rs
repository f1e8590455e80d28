use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{timestamp}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn blockshade() -> Command {
    Command::new(env!("CARGO_BIN_EXE_blockshade"))
}

#[test]
fn software_preview_writes_png() {
    let dir = temp_dir("blockshade_cli_png");
    let output = dir.join("frame.png");

    let status = blockshade()
        .args(["--backend", "software", "--width", "96", "--height", "64"])
        .arg("--config")
        .arg(dir.join("missing.toml"))
        .arg("--output")
        .arg(&output)
        .status()
        .expect("run blockshade");
    assert!(status.success());

    let image = image::open(&output).expect("decode preview").to_rgba8();
    assert_eq!(image.dimensions(), (96, 64));
    // Something other than the clear color was drawn.
    let first = *image.get_pixel(0, 0);
    assert!(image.pixels().any(|p| *p != first));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn effective_config_is_saved() {
    let dir = temp_dir("blockshade_cli_config");
    let saved = dir.join("saved.toml");

    let status = blockshade()
        .args(["--backend", "software", "--width", "32", "--height", "24"])
        .arg("--config")
        .arg(dir.join("missing.toml"))
        .arg("--output")
        .arg(dir.join("frame.png"))
        .arg("--save-config")
        .arg(&saved)
        .status()
        .expect("run blockshade");
    assert!(status.success());

    let contents = std::fs::read_to_string(&saved).expect("read saved config");
    assert!(contents.contains("width = 32"));
    assert!(contents.contains("backend = \"software\""));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn zero_sized_output_is_rejected() {
    let dir = temp_dir("blockshade_cli_zero");
    let status = blockshade()
        .args(["--width", "0"])
        .arg("--config")
        .arg(dir.join("missing.toml"))
        .arg("--output")
        .arg(dir.join("frame.png"))
        .status()
        .expect("run blockshade");
    assert!(!status.success());
    let _ = std::fs::remove_dir_all(&dir);
}
