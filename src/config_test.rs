//! Tests for `DemoConfig`.

use std::time::Duration;

use crate::config::{DemoConfig, ENV_API_URL, ENV_STEP_DELAY_MS};
use crate::error::DemoError;

#[test]
fn defaults() {
  let cfg = DemoConfig::default();
  assert_eq!(cfg.step_delay(), Duration::from_millis(1500));
  assert_eq!(cfg.composite_delay(), Duration::from_millis(2000));
  assert_eq!(cfg.api_url, "http://localhost:5000");
  assert_eq!(cfg.categories, vec!["electronics", "home"]);
  assert_eq!(cfg.initial_balance, 15000.0);
  assert!(cfg.validate().is_ok());
}

#[test]
fn load_partial_file_fills_defaults() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("demo.json");
  std::fs::write(&path, r#"{"step_delay_ms": 200, "query": "phone"}"#).unwrap();
  let cfg = DemoConfig::load(&path).expect("load");
  assert_eq!(cfg.step_delay_ms, 200);
  assert_eq!(cfg.query, "phone");
  assert_eq!(cfg.max_price, 2000.0);
}

#[test]
fn load_rejects_invalid_json() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("demo.json");
  std::fs::write(&path, "{not json").unwrap();
  assert!(matches!(DemoConfig::load(&path), Err(DemoError::Json(_))));
  assert!(matches!(
    DemoConfig::load(&dir.path().join("missing.json")),
    Err(DemoError::Io(_))
  ));
}

#[test]
fn overrides_apply_known_names_only() {
  let mut cfg = DemoConfig::default();
  cfg
    .apply_overrides([
      (ENV_API_URL, "http://10.0.0.2:5000"),
      (ENV_STEP_DELAY_MS, " 250 "),
      ("PATH", "/usr/bin"),
    ])
    .unwrap();
  assert_eq!(cfg.api_url, "http://10.0.0.2:5000");
  assert_eq!(cfg.step_delay_ms, 250);
}

#[test]
fn override_with_bad_delay_fails() {
  let mut cfg = DemoConfig::default();
  let err = cfg.apply_overrides([(ENV_STEP_DELAY_MS, "fast")]).unwrap_err();
  assert!(matches!(err, DemoError::InvalidConfig(_)));
}

#[test]
fn validate_rejects_bad_values() {
  let cfg = DemoConfig {
    step_delay_ms: 0,
    ..DemoConfig::default()
  };
  assert!(cfg.validate().is_err());
  let cfg = DemoConfig {
    api_url: "  ".to_string(),
    ..DemoConfig::default()
  };
  assert!(cfg.validate().is_err());
  let cfg = DemoConfig {
    max_price: 0.0,
    ..DemoConfig::default()
  };
  assert!(cfg.validate().is_err());
  let cfg = DemoConfig {
    composite_delay_ms: 0,
    ..DemoConfig::default()
  };
  assert!(cfg.validate().is_ok());
}

#[test]
fn validate_rejects_delay_above_one_hour() {
  let cfg = DemoConfig {
    step_delay_ms: crate::MAX_STEP_DELAY_MS + 1,
    ..DemoConfig::default()
  };
  assert!(matches!(cfg.validate(), Err(DemoError::InvalidConfig(_))));
  let cfg = DemoConfig {
    step_delay_ms: u64::MAX,
    ..DemoConfig::default()
  };
  assert!(cfg.validate().is_err());
}

#[test]
fn lookup_reads_only_known_names() {
  let asked = std::sync::Mutex::new(Vec::new());
  let mut cfg = DemoConfig::default();
  cfg
    .apply_lookup(|name| {
      asked.lock().unwrap().push(name.to_string());
      (name == ENV_STEP_DELAY_MS).then(|| "40".to_string())
    })
    .unwrap();
  assert_eq!(cfg.step_delay_ms, 40);
  assert_eq!(cfg.api_url, "http://localhost:5000");
  assert_eq!(*asked.lock().unwrap(), vec![ENV_API_URL, ENV_STEP_DELAY_MS]);
}

#[cfg(unix)]
#[test]
fn apply_env_ignores_unrelated_non_unicode_variable() {
  use std::ffi::OsStr;
  use std::os::unix::ffi::OsStrExt;

  let name = "STEPWEAVE_TEST_UNRELATED_BYTES";
  // SAFETY: no other test reads or writes this variable.
  unsafe { std::env::set_var(name, OsStr::from_bytes(b"\xff\xfe")) };
  let mut cfg = DemoConfig::default();
  let result = cfg.apply_env();
  unsafe { std::env::remove_var(name) };
  assert!(result.is_ok());
}
