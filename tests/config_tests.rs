// Integration tests for the persisted configuration document.

use anyhow::Result;
use shortstory::Config;
use tempfile::TempDir;

#[test]
fn missing_fields_fall_back_to_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "openai_api_key": "sk-0123456789abc" }"#)?;

    let cfg = Config::load_from(&path)?;
    assert!(cfg.has_valid_token());
    assert_eq!(cfg.language, "auto");
    assert_eq!(cfg.model, "whisper-1");
    assert!(!cfg.save_location.is_empty());

    Ok(())
}

#[test]
fn empty_values_are_backfilled() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "openai_api_key": "", "save_location": "", "language": "", "model": "" }"#,
    )?;

    let cfg = Config::load_from(&path)?;
    assert!(!cfg.has_valid_token());
    assert_eq!(cfg.language, "auto");
    assert_eq!(cfg.model, "whisper-1");
    assert!(!cfg.save_location.is_empty());

    Ok(())
}

#[test]
fn save_round_trips() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.json");

    let cfg = Config {
        openai_api_key: "sk-0123456789abc".to_string(),
        save_location: "/tmp/sessions".to_string(),
        language: "en".to_string(),
        model: "whisper-1".to_string(),
    };
    cfg.save_to(&path)?;

    let loaded = Config::load_from(&path)?;
    assert_eq!(loaded.openai_api_key, cfg.openai_api_key);
    assert_eq!(loaded.save_location, cfg.save_location);
    assert_eq!(loaded.language, cfg.language);
    assert_eq!(loaded.model, cfg.model);

    Ok(())
}

#[test]
fn short_token_is_not_valid() {
    let cfg = Config {
        openai_api_key: "short".to_string(),
        ..Config::default()
    };
    assert!(!cfg.has_valid_token());
    assert!(!Config::default().has_valid_token());
}
