use super::*;

fn settings_from(raw: RawSettings) -> Settings {
    Settings::from_raw(raw).expect("settings should resolve")
}

#[test]
fn defaults_resolve_without_any_sources() {
    let settings = settings_from(RawSettings::default());

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.database.url, None);
    assert_eq!(
        settings.database.max_connections.get(),
        DEFAULT_DB_MAX_CONNECTIONS
    );
    assert_eq!(settings.uploads.directory, PathBuf::from(DEFAULT_UPLOAD_DIR));
    assert_eq!(settings.outputs.directory, PathBuf::from(DEFAULT_OUTPUT_DIR));
    assert_eq!(settings.drafts.ttl_seconds.get(), DEFAULT_DRAFT_TTL_SECONDS);
    assert_eq!(settings.generation.endpoint, None);
    assert_eq!(
        settings.generation.timeout,
        Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS)
    );
}

#[test]
fn serve_overrides_take_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(9000);
    raw.drafts.ttl_seconds = Some(60);

    let overrides = ServeOverrides {
        server_port: Some(9100),
        drafts_ttl_seconds: Some(120),
        database_url: Some("postgres://localhost/postweave".to_string()),
        ..Default::default()
    };
    raw.apply_serve_overrides(&overrides);

    let settings = settings_from(raw);
    assert_eq!(settings.server.addr.port(), 9100);
    assert_eq!(settings.drafts.ttl_seconds.get(), 120);
    assert_eq!(
        settings.database.url.as_deref(),
        Some("postgres://localhost/postweave")
    );
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "server.port",
            ..
        })
    ));
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.drafts.ttl_seconds = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "drafts.ttl_seconds",
            ..
        })
    ));
}

#[test]
fn blank_database_url_is_treated_as_unset() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());
    let settings = settings_from(raw);
    assert_eq!(settings.database.url, None);
}

#[test]
fn log_level_parses_case_insensitively() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("DEBUG".to_string());
    let settings = settings_from(raw);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}
