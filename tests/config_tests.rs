use std::path::PathBuf;
use std::time::Duration;

use wheel_gallery::config::{Configuration, ImageSourceKind};

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.image_source, ImageSourceKind::Mock);
    assert_eq!(cfg.gallery.min_count, 10);
    assert_eq!(cfg.gallery.max_count, 20);
    assert_eq!(cfg.gallery.debounce, Duration::from_millis(100));
    assert_eq!(cfg.gallery.crossfade, Duration::from_millis(100));
    assert!((cfg.wheel.diameter - 240.0).abs() < f64::EPSILON);
    assert_eq!(cfg.thumbnails.item_size, 160);
    assert_eq!(cfg.remote.endpoint, "https://pixabay.com/api/");
    assert_eq!(cfg.remote.keywords.len(), 4);
    assert_eq!(cfg.random_seed, None);
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
image-source: remote
random-seed: 7
gallery:
  min-count: 3
  max-count: 5
  debounce: 250ms
remote:
  api-key: "abc"
  keywords: [lakes]
  request-timeout: 5s
wheel:
  min-tap-degrees: 30
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.image_source, ImageSourceKind::Remote);
    assert_eq!(cfg.random_seed, Some(7));
    assert_eq!(cfg.gallery.min_count, 3);
    assert_eq!(cfg.gallery.debounce, Duration::from_millis(250));
    // Unset keys in a present section keep their defaults.
    assert_eq!(cfg.gallery.crossfade, Duration::from_millis(100));
    assert_eq!(cfg.remote.api_key.as_deref(), Some("abc"));
    assert_eq!(cfg.remote.keywords, vec!["lakes".to_string()]);
    assert_eq!(cfg.remote.request_timeout, Duration::from_secs(5));
    assert!((cfg.wheel.min_tap_degrees - 30.0).abs() < f64::EPSILON);
    assert!((cfg.wheel.max_tap_degrees - 180.0).abs() < f64::EPSILON);
}

#[test]
fn parse_local_source_with_limited_selection() {
    let yaml = r#"
image-source: local
local:
  library-path: /photos
  limited-selection: [a.jpg, trips/b.png]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.local.library_path, Some(PathBuf::from("/photos")));
    assert_eq!(
        cfg.local.limited_selection,
        Some(vec![PathBuf::from("a.jpg"), PathBuf::from("trips/b.png")])
    );
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(serde_yaml::from_str::<Configuration>("gallery:\n  min-cnt: 3\n").is_err());
    assert!(serde_yaml::from_str::<Configuration>("image-source: cloud\n").is_err());
}

#[test]
fn inverted_count_range_is_rejected() {
    let cfg: Configuration =
        serde_yaml::from_str("gallery:\n  min-count: 9\n  max-count: 4\n").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("min-count"));
}

#[test]
fn zero_min_count_is_rejected() {
    let cfg: Configuration = serde_yaml::from_str("gallery:\n  min-count: 0\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn tap_range_is_validated() {
    let cfg: Configuration =
        serde_yaml::from_str("wheel:\n  min-tap-degrees: 90\n  max-tap-degrees: 45\n").unwrap();
    assert!(cfg.validated().is_err());
    let cfg: Configuration = serde_yaml::from_str("wheel:\n  max-tap-degrees: 400\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn remote_requires_api_key() {
    let cfg: Configuration = serde_yaml::from_str("image-source: remote\n").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("api-key"));
}

#[test]
fn local_requires_library_path() {
    let cfg: Configuration = serde_yaml::from_str("image-source: local\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn from_yaml_file_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let err = Configuration::from_yaml_file(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("nope.yaml"));

    let present = dir.path().join("config.yaml");
    std::fs::write(&present, "mock:\n  width: 64\n  height: 32\n").unwrap();
    let cfg = Configuration::from_yaml_file(&present).unwrap();
    assert_eq!((cfg.mock.width, cfg.mock.height), (64, 32));
}

#[test]
fn debug_output_hides_the_api_key() {
    let yaml = "image-source: remote\nremote:\n  api-key: s3cr3t-key\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let dump = format!("{cfg:#?}");
    assert!(!dump.contains("s3cr3t-key"), "{dump}");
    assert!(dump.contains("<redacted>"));
    assert!(dump.contains("pixabay.com"));
    assert_eq!(cfg.remote.api_key.as_deref(), Some("s3cr3t-key"));
}
