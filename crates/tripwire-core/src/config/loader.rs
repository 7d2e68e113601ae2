//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Serde defaults of the model
//! 2. The TOML file
//! 3. `TRIPWIRE_*` environment variables for top-level keys

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};

use super::model::TripwireConfig;

pub const DEFAULT_CONFIG_FILE: &str = "tripwire.toml";

/// Top-level keys that may be overridden from the environment.
const ENV_KEYS: &[&str] = &["state_directory", "request_timeout_secs"];

/// Load `./tripwire.toml` with env var overrides. A missing file yields the
/// defaults.
pub fn load_config() -> Result<TripwireConfig, figment::Error> {
    load_config_from_path(Path::new(DEFAULT_CONFIG_FILE))
}

/// Load from a TOML string only. No environment lookup.
pub fn load_config_from_str(toml_content: &str) -> Result<TripwireConfig, figment::Error> {
    Figment::new().merge(Toml::string(toml_content)).extract()
}

/// Load from a specific file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TripwireConfig, figment::Error> {
    build_figment(path).extract()
}

/// The Figment used by [`load_config_from_path`], before extraction.
pub fn build_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(env_provider())
}

fn env_provider() -> Env {
    // Project tables are arrays, which env vars cannot address. Only the
    // scalar top-level keys are taken.
    Env::prefixed("TRIPWIRE_").only(ENV_KEYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{StateConfig, TriggerConfig};
    use crate::domain::{BucketRegion, BuildCondition};
    use secrecy::ExposeSecret;
    use std::path::PathBuf;

    const FULL: &str = r#"
state_directory = "/var/lib/tripwire"
request_timeout_secs = 15

[[projects]]
name = "webapp"

[projects.trigger]
type = "queue"
name = "webapp-queue"
queue_url = "https://sqs.us-east-1.amazonaws.com/123456789012/webapp"
aws_access_key = "AKIAEXAMPLE"
aws_secret_access_key = "shh"
seconds = 45
max_messages = 5

[projects.state]
type = "remote"
bucket = "build-state"
bucket_region = "eu"
aws_access_key = "AKIAEXAMPLE"
aws_secret_access_key = "shh"
fallback_to_file_state = true

[[projects]]
name = "nightly"

[projects.trigger]
type = "composite"

[[projects.trigger.triggers]]
type = "interval"
seconds = 3600

[[projects.trigger.triggers]]
type = "queue"
queue_url = "https://queue.example.com/nightly"
aws_access_key = "a"
aws_secret_access_key = "b"
build_condition = "if_modification_exists"
"#;

    #[test]
    fn full_document_loads() {
        let config = load_config_from_str(FULL).unwrap();

        assert_eq!(config.state_directory, PathBuf::from("/var/lib/tripwire"));
        assert_eq!(config.request_timeout_secs, Some(15));
        assert_eq!(config.projects.len(), 2);

        let webapp = &config.projects[0];
        let TriggerConfig::Queue(queue) = &webapp.trigger else {
            panic!("expected queue trigger, got {}", webapp.trigger.kind());
        };
        assert_eq!(queue.name.as_deref(), Some("webapp-queue"));
        assert_eq!(queue.seconds, 45);
        assert_eq!(queue.max_messages, 5);
        assert_eq!(queue.build_condition, BuildCondition::ForceBuild);
        assert_eq!(queue.credentials.access_key, "AKIAEXAMPLE");
        assert_eq!(queue.credentials.secret_access_key.expose_secret(), "shh");

        let StateConfig::Remote(remote) = &webapp.state else {
            panic!("expected remote state");
        };
        assert_eq!(remote.bucket, "build-state");
        assert_eq!(remote.bucket_region, BucketRegion::Eu);
        assert!(remote.fallback_to_file_state);
        assert!(remote.create_bucket);

        let TriggerConfig::Composite(composite) = &config.projects[1].trigger else {
            panic!("expected composite trigger");
        };
        assert_eq!(composite.triggers.len(), 2);
        assert!(matches!(config.projects[1].state, StateConfig::Local(_)));
    }

    #[test]
    fn defaults_apply_to_omitted_keys() {
        let config = load_config_from_str(
            r#"
[[projects]]
name = "webapp"
trigger = { type = "queue", queue_url = "https://q.example.com/a" }
"#,
        )
        .unwrap();

        assert_eq!(config.state_directory, PathBuf::from("state"));
        assert_eq!(config.request_timeout_secs, None);
        let TriggerConfig::Queue(queue) = &config.projects[0].trigger else {
            panic!("expected queue trigger");
        };
        assert_eq!(queue.seconds, 30);
        assert_eq!(queue.max_messages, 10);
        assert!(queue.credentials.blank_fields().len() == 2);
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = load_config_from_str("state_dir = \"x\"").unwrap_err();
        assert!(err.to_string().contains("state_dir"));
    }

    #[test]
    fn unknown_trigger_type_is_rejected() {
        let result = load_config_from_str(
            r#"
[[projects]]
name = "webapp"
trigger = { type = "cron" }
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_from_path(Path::new("/nonexistent/tripwire.toml")).unwrap();
        assert!(config.projects.is_empty());
    }

    #[test]
    fn override_layers_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripwire.toml");
        std::fs::write(&path, "request_timeout_secs = 5\n").unwrap();

        let config: TripwireConfig = build_figment(&path)
            .merge(("request_timeout_secs", 9))
            .extract()
            .unwrap();

        assert_eq!(config.request_timeout_secs, Some(9));
    }
}
