use chat_relay::config::{AppConfig, load_completion_settings};
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("RELAY_SERVER__PORT");
        env::remove_var("RELAY_SERVER__HOST");
        env::remove_var("RELAY_SERVER__ALLOWED_ORIGINS");
        env::remove_var("RELAY_AUTH__SECRET");
        env::remove_var("RELAY_AUTH__TOKEN_TTL_MINUTES");
        env::remove_var("RELAY_COMPLETION__REQUEST_TIMEOUT_SECS");
        env::remove_var("SECRET_KEY");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("HOST");
        env::remove_var("TOKEN_TTL_MINUTES");
        env::remove_var("COMPLETION_TIMEOUT_SECS");
    }
}

// The test harness injects its own argv, so every test parses an explicit
// one instead of going through AppConfig::load().
fn load_clean() -> AppConfig {
    AppConfig::load_from_args(["chat-relay"]).expect("Failed to load config")
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load_clean();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.allowed_origins.len(), 4);
    assert!(
        config
            .server
            .allowed_origins
            .contains(&"http://localhost:8000".to_string())
    );
    assert_eq!(config.auth.secret, "YOUR_SUPER_SECRET_KEY_REPLACE_ME");
    assert_eq!(config.auth.token_ttl_minutes, 30);
    assert_eq!(config.auth.seed_user, "testuser");
    assert_eq!(config.auth.seed_password, "password123");
    assert_eq!(config.completion.request_timeout_secs, 15);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("RELAY_SERVER__PORT", "9090");
    }

    let config = load_clean();
    assert_eq!(config.server.port, 9090);

    clear_env_vars();
}

#[test]
#[serial]
fn test_secret_key_env_wins() {
    clear_env_vars();
    unsafe {
        env::set_var("RELAY_AUTH__SECRET", "prefixed-secret");
        env::set_var("SECRET_KEY", "bare-secret");
    }

    let config = load_clean();
    assert_eq!(config.auth.secret, "bare-secret");

    clear_env_vars();
}

#[test]
#[serial]
fn test_origin_list_env() {
    clear_env_vars();
    unsafe {
        env::set_var(
            "RELAY_SERVER__ALLOWED_ORIGINS",
            "http://one.test:1000,http://two.test:2000",
        );
    }

    let config = load_clean();
    assert_eq!(
        config.server.allowed_origins,
        vec![
            "http://one.test:1000".to_string(),
            "http://two.test:2000".to_string()
        ]
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_override_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("RELAY_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args(["chat-relay", "--port", "7171"])
        .expect("Failed to load config");
    assert_eq!(config.server.port, 7171);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let mut temp_file = NamedTempFile::with_suffix(".yaml").expect("Failed to create temp config");
    writeln!(temp_file, "server:\n  port: 7070\nauth:\n  token_ttl_minutes: 5")
        .expect("Failed to write temp config");

    unsafe {
        env::set_var(
            "CONFIG_FILE",
            temp_file.path().to_str().expect("temp path is not UTF-8"),
        );
    }

    let config = load_clean();
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.auth.token_ttl_minutes, 5);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    // Create ./config.yaml
    let config_content = r#"
server:
  port: 6060
    "#;
    let cwd_path = "config.yaml";
    fs::write(cwd_path, config_content).expect("Failed to write ./config.yaml");

    let config = load_clean();

    // Clean up before asserting so a failure doesn't leave the file behind
    let result = std::panic::catch_unwind(|| {
        assert_eq!(config.server.port, 6060);
    });

    fs::remove_file(cwd_path).unwrap();

    if let Err(e) = result {
        std::panic::resume_unwind(e);
    }
}

#[test]
#[serial]
fn test_completion_settings_require_base_url() {
    unsafe {
        env::remove_var("LLM_BASE_URL");
        env::set_var("LLM_MODEL", "test-model");
    }

    let err = load_completion_settings().unwrap_err();
    assert!(err.contains("LLM_BASE_URL"));

    unsafe {
        env::remove_var("LLM_MODEL");
    }
}

#[test]
#[serial]
fn test_completion_settings_loaded() {
    unsafe {
        env::set_var("LLM_BASE_URL", "http://localhost:11434");
        env::set_var("LLM_MODEL", "test-model");
        env::set_var("LLM_API_KEY", "   ");
    }

    let settings = load_completion_settings().expect("Failed to load completion settings");
    assert_eq!(settings.base_url, "http://localhost:11434");
    assert_eq!(settings.model, "test-model");
    // Blank keys are treated as absent
    assert!(settings.api_key.is_none());

    unsafe {
        env::remove_var("LLM_BASE_URL");
        env::remove_var("LLM_MODEL");
        env::remove_var("LLM_API_KEY");
    }
}
