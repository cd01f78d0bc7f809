//! Session script loading and end-to-end runs.

use std::io::Write;
use std::path::PathBuf;

use camface_capture::CaptureConfig;
use camface_cli::{load_script, run_session, Args, OverlaySize};
use camface_models::{FacingMode, Rotation, Size, ViewRect};
use clap::Parser;
use tempfile::NamedTempFile;

const SCRIPT: &str = r#"{
    "cameras": [
        {
            "picture_sizes": [{"width": 4000, "height": 3000}, {"width": 1600, "height": 1200}],
            "preview_sizes": [{"width": 1920, "height": 1080}, {"width": 1440, "height": 1080}],
            "flash_modes": ["off", "auto"],
            "focus_modes": ["auto", "continuous-picture"],
            "sensor_orientation": 90,
            "facing": "back",
            "max_detected_faces": 4
        },
        {
            "picture_sizes": [{"width": 1600, "height": 1200}],
            "preview_sizes": [{"width": 1280, "height": 960}],
            "sensor_orientation": 270,
            "facing": "front"
        }
    ],
    "display_rotation": 0,
    "overlay": {"width": 1000, "height": 2000},
    "faces": [
        [{"rect": {"left": 0, "top": 0, "right": 500, "bottom": 500}, "score": 92, "id": 1}],
        [],
        [
            {"rect": {"left": -1000, "top": -1000, "right": 1000, "bottom": 1000}, "score": 40},
            {"rect": {"left": 0, "top": 0, "right": 500, "bottom": 500}, "score": 88}
        ]
    ]
}"#;

fn write_script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write script");
    file
}

#[test]
fn test_load_script() {
    let file = write_script(SCRIPT);

    let script = load_script(file.path()).unwrap();

    assert_eq!(script.cameras.len(), 2);
    assert_eq!(script.cameras[1].facing, FacingMode::Front);
    assert_eq!(script.cameras[1].sensor_orientation, Rotation::Deg270);
    assert!(script.cameras[1].flash_modes.is_empty());
    assert_eq!(script.overlay, OverlaySize { width: 1000, height: 2000 });
    assert_eq!(script.faces.len(), 3);
    assert!(script.take_picture);
}

#[test]
fn test_load_script_defaults() {
    let file = write_script(
        r#"{"cameras": [{"picture_sizes": [], "preview_sizes": [], "facing": "back"}]}"#,
    );

    let script = load_script(file.path()).unwrap();

    assert_eq!(script.display_rotation, Rotation::Deg0);
    assert_eq!(script.overlay, OverlaySize::default());
    assert!(script.faces.is_empty());
}

#[test]
fn test_load_script_rejects_bad_input() {
    let no_cameras = write_script(r#"{"cameras": []}"#);
    assert!(load_script(no_cameras.path()).is_err());

    let bad_rotation = write_script(
        r#"{"cameras": [{"picture_sizes": [], "preview_sizes": [], "facing": "back", "sensor_orientation": 45}]}"#,
    );
    assert!(load_script(bad_rotation.path()).is_err());

    assert!(load_script(&PathBuf::from("/nonexistent/session.json")).is_err());
}

#[test]
fn test_load_script_rejects_zero_size() {
    let zero_preview = write_script(
        r#"{"cameras": [{"picture_sizes": [{"width": 1600, "height": 1200}], "preview_sizes": [{"width": 0, "height": 1080}], "facing": "back"}]}"#,
    );

    let err = load_script(zero_preview.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("zero"));
}

#[tokio::test]
async fn test_run_session_back_camera() {
    let file = write_script(SCRIPT);
    let script = load_script(file.path()).unwrap();

    let report = run_session(script, &CaptureConfig::default(), None)
        .await
        .unwrap();

    assert_eq!(report.opened.picture_size, Size::new(4000, 3000));
    assert_eq!(report.opened.preview.size, Size::new(1440, 1080));
    assert_eq!(report.opened.orientation, Rotation::Deg90);
    assert_eq!(report.faces_drawn, 3);
    assert_eq!(report.frames.len(), 2);
    assert!(report.frames[0][0].approx_eq(&ViewRect::new(250.0, 1000.0, 500.0, 1500.0), 1e-9));
    assert_eq!(report.frames[1].len(), 2);
    assert_eq!(report.picture_bytes, Some(12));
    assert_eq!(report.events, vec!["init_finished", "image_available"]);
    assert!(!report.device.open);
    assert_eq!(report.device.pictures, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["opened"]["facing"], "back");
    assert_eq!(json["opened"]["orientation"], 90);
}

#[tokio::test]
async fn test_run_session_front_camera_without_detector() {
    let file = write_script(SCRIPT);
    let mut script = load_script(file.path()).unwrap();
    script.take_picture = false;

    let report = run_session(script, &CaptureConfig::default(), Some(FacingMode::Front))
        .await
        .unwrap();

    assert_eq!(report.opened.facing, FacingMode::Front);
    // No size satisfies the minimum, so the first listed preview is used.
    assert!(report.opened.preview.is_fallback());
    assert_eq!(report.opened.flash_mode, None);
    assert_eq!(report.faces_drawn, 0);
    assert!(report.frames.is_empty());
    assert_eq!(report.picture_bytes, None);
    assert_eq!(report.events, vec!["init_finished"]);
}

#[tokio::test]
async fn test_run_session_empty_catalog_fails() {
    let file = write_script(
        r#"{"cameras": [{"picture_sizes": [], "preview_sizes": [], "facing": "back"}]}"#,
    );
    let script = load_script(file.path()).unwrap();

    let err = run_session(script, &CaptureConfig::default(), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No picture sizes supplied"));
}

#[test]
fn test_args_parse() {
    let args =
        Args::try_parse_from(["camface", "--metrics", "--facing", "front", "session.json"]).unwrap();
    assert_eq!(
        args,
        Args {
            script: PathBuf::from("session.json"),
            facing: Some(FacingMode::Front),
            metrics: true,
        }
    );

    let args = Args::try_parse_from(["camface", "session.json"]).unwrap();
    assert_eq!(args.facing, None);
    assert!(!args.metrics);
}

#[test]
fn test_args_parse_errors() {
    assert!(Args::try_parse_from(["camface"]).is_err());
    assert!(Args::try_parse_from(["camface", "--facing"]).is_err());
    assert!(Args::try_parse_from(["camface", "--facing", "sideways", "a.json"]).is_err());
    assert!(Args::try_parse_from(["camface", "--verbose", "a.json"]).is_err());
    assert!(Args::try_parse_from(["camface", "a.json", "b.json"]).is_err());
}
