use std::sync::Mutex;

use tempfile::NamedTempFile;

use overlay_kernel::config::OverlaydConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "OVERLAY_CONFIG",
        "OVERLAY_VIDEO_PATH",
        "OVERLAY_ORACLE",
        "OVERLAY_MAX_DIM",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "video_path": "/var/lib/overlay/flight.mp4",
        "oracle": "stub",
        "max_dim": 512
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("OVERLAY_CONFIG", file.path());
    std::env::set_var("OVERLAY_MAX_DIM", "320");

    let cfg = OverlaydConfig::load().expect("load config");
    assert_eq!(cfg.video_path, "/var/lib/overlay/flight.mp4");
    assert_eq!(cfg.oracle, "stub");
    assert_eq!(cfg.max_dim, 320);

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = OverlaydConfig::load().expect("load config");
    assert_eq!(cfg.video_path, "stub://parade");
    assert_eq!(cfg.oracle, "stub");
    assert_eq!(cfg.max_dim, overlay_kernel::MAX_DIM);
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("OVERLAY_MAX_DIM", "not-a-number");
    assert!(OverlaydConfig::load().is_err());

    std::env::set_var("OVERLAY_MAX_DIM", "0");
    assert!(OverlaydConfig::load().is_err());

    clear_env();
}
