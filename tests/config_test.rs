//! Verifies the shipped configuration files deserialize into `AppConfig`.

use docvault_core::config::AppConfig;

#[test]
fn default_config_loads() {
    let config = AppConfig::load("default").expect("default config should load");

    assert_eq!(config.server.port, 8080);
    assert!(!config.auth.jwt_secret.is_empty());
    assert!(config.storage.max_upload_size_bytes > 0);
    assert!(config
        .storage
        .allowed_mime_types
        .iter()
        .any(|m| m == "application/pdf"));
    assert!(config.worker.enabled);
}

#[test]
fn production_overlay_loads() {
    let config = AppConfig::load("production").expect("production config should load");

    assert_eq!(config.logging.format, "json");
    // Overlay keeps defaults it does not override.
    assert_eq!(config.server.port, 8080);
}
