// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the VaultGuard configuration system.

use figment::Jail;
use vaultguard_config::diagnostic::ConfigError;
use vaultguard_config::model::{BlobBackend, VaultGuardConfig};
use vaultguard_config::{
    load_and_validate_path, load_and_validate_str, load_config, load_config_from_str,
};

/// Every section and key parses from a single file.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[vault]
identity = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
log_level = "debug"
confirm_writes = true

[kdf]
memory_cost = 131072
iterations = 4
parallelism = 2

[generator]
default_length = 20

[blob_store]
backend = "filesystem"
api_url = "http://10.0.0.5:5001"
data_dir = "/var/lib/vaultguard/blobs"
timeout_secs = 10
verify_content_id = false
pin = false

[registry]
rpc_url = "https://rpc.example.org"
contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
receipt_timeout_secs = 120
poll_interval_ms = 250
gas_limit = 200000

[storage]
database_path = "/tmp/index.db"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(
        config.vault.identity.as_deref(),
        Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
    );
    assert_eq!(config.vault.log_level, "debug");
    assert!(config.vault.confirm_writes);
    assert_eq!(config.kdf.memory_cost, 131072);
    assert_eq!(config.kdf.iterations, 4);
    assert_eq!(config.kdf.parallelism, 2);
    assert_eq!(config.generator.default_length, 20);
    assert_eq!(config.blob_store.backend, BlobBackend::Filesystem);
    assert_eq!(config.blob_store.data_dir, "/var/lib/vaultguard/blobs");
    assert_eq!(config.blob_store.timeout_secs, 10);
    assert!(!config.blob_store.verify_content_id);
    assert!(!config.blob_store.pin);
    assert_eq!(config.registry.rpc_url, "https://rpc.example.org");
    assert_eq!(config.registry.receipt_timeout_secs, 120);
    assert_eq!(config.registry.poll_interval_ms, 250);
    assert_eq!(config.registry.gas_limit, Some(200000));
    assert_eq!(config.storage.database_path, "/tmp/index.db");
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert!(config.vault.identity.is_none());
    assert_eq!(config.vault.log_level, "info");
    assert!(!config.vault.confirm_writes);
    assert_eq!(config.kdf.memory_cost, 65536);
    assert_eq!(config.kdf.iterations, 3);
    assert_eq!(config.kdf.parallelism, 4);
    assert_eq!(config.generator.default_length, 12);
    assert_eq!(config.blob_store.backend, BlobBackend::Ipfs);
    assert_eq!(config.blob_store.api_url, "http://127.0.0.1:5001");
    assert!(config.blob_store.verify_content_id);
    assert_eq!(config.registry.rpc_url, "http://127.0.0.1:8545");
    assert!(config.registry.contract_address.is_none());
    assert_eq!(config.registry.receipt_timeout_secs, 60);
    assert_eq!(config.registry.poll_interval_ms, 500);
}

#[test]
fn unknown_top_level_section_rejected() {
    let err = load_config_from_str("[wallet]\nkey = 1\n").expect_err("should reject");
    assert!(format!("{err}").contains("wallet"), "got: {err}");
}

#[test]
fn unknown_backend_rejected() {
    let err = load_config_from_str("[blob_store]\nbackend = \"s3\"\n").expect_err("should reject");
    assert!(format!("{err}").contains("s3"), "got: {err}");
}

#[test]
fn unknown_key_carries_suggestion_and_valid_keys() {
    let toml = r#"
[kdf]
iteratons = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "iteratons"
                && suggestion.as_deref() == Some("iterations")
                && valid_keys.contains("memory_cost")
        })
    });
    assert!(found, "expected UnknownKey for `iteratons`, got: {errors:?}");
}

#[test]
fn invalid_type_reported_with_key_path() {
    let toml = r#"
[registry]
poll_interval_ms = "fast"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    let found = errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key == "registry.poll_interval_ms"));
    assert!(found, "got: {errors:?}");
}

#[test]
fn validation_runs_after_successful_parse() {
    let toml = r#"
[kdf]
memory_cost = 8
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("kdf.memory_cost"));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "rpc_ur".to_string(),
        suggestion: Some("rpc_url".to_string()),
        valid_keys: "rpc_url, contract_address".to_string(),
        span: None,
        src: None,
    };
    assert_eq!(
        error.code().map(|c| c.to_string()).as_deref(),
        Some("vaultguard::config::unknown_key")
    );
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `rpc_url`"), "got: {help}");

    let mut buf = String::new();
    miette::GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("rpc_ur"));
}

#[test]
fn explicit_path_is_loaded_and_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[generator]\ndefault_length = 32\n").expect("write");

    let config = load_and_validate_path(&path).expect("should load");
    assert_eq!(config.generator.default_length, 32);
}

#[test]
fn unknown_key_in_explicit_path_gets_span() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[vault]\nidentiy = \"0xabc\"\n").expect("write");

    let errors = load_and_validate_path(&path).expect_err("should reject");
    let spanned = errors
        .iter()
        .any(|e| matches!(e, ConfigError::UnknownKey { span: Some(_), src: Some(_), .. }));
    assert!(spanned, "got: {errors:?}");
}

/// Section names with underscores map to `blob_store.*`, not `blob.store.*`.
#[test]
fn env_overrides_map_underscored_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("VAULTGUARD_BLOB_STORE_API_URL", "http://ipfs.internal:5001");
        jail.set_env("VAULTGUARD_REGISTRY_POLL_INTERVAL_MS", "125");
        jail.set_env("VAULTGUARD_VAULT_IDENTITY", "0xabc");

        let config: VaultGuardConfig = load_config()?;
        assert_eq!(config.blob_store.api_url, "http://ipfs.internal:5001");
        assert_eq!(config.registry.poll_interval_ms, 125);
        assert_eq!(config.vault.identity.as_deref(), Some("0xabc"));
        Ok(())
    });
}

#[test]
fn env_overrides_local_file() {
    Jail::expect_with(|jail| {
        jail.create_file("vaultguard.toml", "[generator]\ndefault_length = 16\n")?;
        let config = load_config()?;
        assert_eq!(config.generator.default_length, 16);

        jail.set_env("VAULTGUARD_GENERATOR_DEFAULT_LENGTH", "24");
        let config = load_config()?;
        assert_eq!(config.generator.default_length, 24);
        Ok(())
    });
}

/// The passphrase variable is read by the vault, never treated as a config key.
#[test]
fn passphrase_env_var_is_not_a_config_key() {
    Jail::expect_with(|jail| {
        jail.set_env("VAULTGUARD_PASSPHRASE", "correct horse battery staple");
        let config = load_config()?;
        assert_eq!(config.kdf.iterations, 3);
        Ok(())
    });
}
