//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: credentials present, queue
//! URLs well formed, batch sizes within the service cap. Every problem is
//! collected; nothing is constructed from a config that fails here.

use std::collections::HashSet;

use super::error::ConfigError;
use super::model::{StateConfig, TriggerConfig, TripwireConfig};
use crate::domain::{AccessKeyPair, QueueUrl};
use crate::trigger::queue::MAX_MESSAGES_CAP;

/// Validate a deserialized configuration.
///
/// Returns `Err` with all collected errors (does not fail fast).
pub fn validate_config(config: &TripwireConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.request_timeout_secs == Some(0) {
        errors.push(ConfigError::invalid(
            "request_timeout_secs must be at least 1 when set",
        ));
    }

    if config.projects.is_empty() {
        errors.push(ConfigError::invalid(
            "no projects configured, add at least one [[projects]] entry",
        ));
    }

    let mut seen_names = HashSet::new();
    for (i, project) in config.projects.iter().enumerate() {
        let name = project.name.trim();
        if name.is_empty() {
            errors.push(ConfigError::invalid(format!(
                "projects[{i}].name must not be empty"
            )));
        } else if name.contains(['/', '\\']) {
            errors.push(ConfigError::invalid(format!(
                "projects[{i}].name `{name}` must not contain path separators"
            )));
        } else if !seen_names.insert(name) {
            errors.push(ConfigError::invalid(format!(
                "duplicate project name `{name}` in [[projects]] array"
            )));
        }

        validate_trigger(
            &project.trigger,
            &format!("projects[{i}].trigger"),
            &mut errors,
        );
        validate_state(&project.state, &format!("projects[{i}].state"), &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_trigger(trigger: &TriggerConfig, path: &str, errors: &mut Vec<ConfigError>) {
    match trigger {
        TriggerConfig::Queue(queue) => {
            validate_credentials(&queue.credentials, path, errors);
            validate_seconds(queue.seconds, path, errors);

            if let Err(e) = QueueUrl::parse(&queue.queue_url) {
                errors.push(ConfigError::invalid(format!("{path}.queue_url: {e}")));
            }

            if !(1..=MAX_MESSAGES_CAP).contains(&queue.max_messages) {
                errors.push(ConfigError::invalid(format!(
                    "{path}.max_messages must be between 1 and {MAX_MESSAGES_CAP}, got {}",
                    queue.max_messages
                )));
            }
        }
        TriggerConfig::Interval(interval) => validate_seconds(interval.seconds, path, errors),
        TriggerConfig::Composite(composite) => {
            if composite.triggers.is_empty() {
                errors.push(ConfigError::invalid(format!(
                    "{path}.triggers must contain at least one trigger"
                )));
            }
            for (j, child) in composite.triggers.iter().enumerate() {
                validate_trigger(child, &format!("{path}.triggers[{j}]"), errors);
            }
        }
    }
}

/// Intervals must fit a `chrono::Duration` so deadlines can be computed.
fn validate_seconds(seconds: u64, path: &str, errors: &mut Vec<ConfigError>) {
    let fits = i64::try_from(seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .is_some();
    if !fits {
        errors.push(ConfigError::invalid(format!(
            "{path}.seconds is too large, got {seconds}"
        )));
    }
}

fn validate_state(state: &StateConfig, path: &str, errors: &mut Vec<ConfigError>) {
    match state {
        StateConfig::Remote(remote) => {
            if remote.bucket.trim().is_empty() {
                errors.push(ConfigError::invalid(format!(
                    "{path}.bucket must not be empty"
                )));
            }
            validate_credentials(&remote.credentials, path, errors);
        }
        StateConfig::Local(_) => {}
    }
}

fn validate_credentials(credentials: &AccessKeyPair, path: &str, errors: &mut Vec<ConfigError>) {
    for field in credentials.blank_fields() {
        errors.push(ConfigError::invalid(format!("{path}.{field} must not be empty")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_config_from_str;
    use rstest::rstest;

    fn messages(toml: &str) -> Vec<String> {
        let config = load_config_from_str(toml).unwrap();
        match validate_config(&config) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }

    const VALID: &str = r#"
[[projects]]
name = "webapp"
trigger = { type = "queue", queue_url = "https://q.example.com/webapp", aws_access_key = "a", aws_secret_access_key = "b" }
state = { type = "remote", bucket = "build-state", aws_access_key = "a", aws_secret_access_key = "b" }
"#;

    #[test]
    fn valid_config_passes() {
        assert!(messages(VALID).is_empty());
    }

    #[test]
    fn empty_config_is_rejected() {
        assert_eq!(
            messages(""),
            vec!["no projects configured, add at least one [[projects]] entry"]
        );
    }

    #[test]
    fn all_errors_are_collected() {
        let errors = messages(
            r#"
request_timeout_secs = 0

[[projects]]
name = ""
trigger = { type = "queue", queue_url = "not a url", max_messages = 11 }
state = { type = "remote", bucket = " " }
"#,
        );

        assert_eq!(errors.len(), 9, "{errors:#?}");
        assert!(errors.iter().any(|e| e.contains("request_timeout_secs")));
        assert!(errors.iter().any(|e| e == "projects[0].name must not be empty"));
        assert!(errors.iter().any(|e| e.starts_with("projects[0].trigger.queue_url")));
        assert!(errors.iter().any(|e| e.contains("between 1 and 10, got 11")));
        assert!(errors.iter().any(|e| e == "projects[0].state.bucket must not be empty"));
        assert!(errors
            .iter()
            .any(|e| e == "projects[0].state.aws_secret_access_key must not be empty"));
    }

    #[test]
    fn duplicate_project_names_are_rejected() {
        let doubled = format!("{VALID}{VALID}");
        assert_eq!(
            messages(&doubled),
            vec!["duplicate project name `webapp` in [[projects]] array"]
        );
    }

    #[rstest]
    #[case::ftp("ftp://q.example.com/a")]
    #[case::relative("/queues/a")]
    #[case::blank("   ")]
    fn queue_url_must_be_absolute_http(#[case] url: &str) {
        let toml = VALID.replace("https://q.example.com/webapp", url);
        let errors = messages(&toml);
        assert_eq!(errors.len(), 1, "{errors:#?}");
        assert!(errors[0].starts_with("projects[0].trigger.queue_url"));
    }

    #[rstest]
    #[case::zero(0, false)]
    #[case::one(1, true)]
    #[case::cap(10, true)]
    #[case::over_cap(11, false)]
    fn max_messages_range(#[case] max: u32, #[case] ok: bool) {
        let toml = VALID.replace(
            "aws_secret_access_key = \"b\" }\nstate",
            &format!("aws_secret_access_key = \"b\", max_messages = {max} }}\nstate"),
        );
        assert_eq!(messages(&toml).is_empty(), ok);
    }

    #[rstest]
    #[case::ordinary(3_600, true)]
    #[case::largest_chrono_duration(i64::MAX as u64 / 1_000, true)]
    #[case::over_chrono_range(i64::MAX as u64 / 1_000 + 1, false)]
    #[case::i64_max(i64::MAX as u64, false)]
    fn trigger_seconds_must_fit_a_duration(#[case] seconds: u64, #[case] ok: bool) {
        let toml = format!(
            r#"
[[projects]]
name = "nightly"
trigger = {{ type = "interval", seconds = {seconds} }}
"#
        );
        let errors = messages(&toml);
        assert_eq!(errors.is_empty(), ok, "{errors:#?}");
        if !ok {
            assert_eq!(
                errors,
                vec![format!("projects[0].trigger.seconds is too large, got {seconds}")]
            );
        }
    }

    #[test]
    fn queue_seconds_are_bounded_too() {
        let toml = VALID.replace(
            "aws_secret_access_key = \"b\" }\nstate",
            "aws_secret_access_key = \"b\", seconds = 9223372036854775807 }\nstate",
        );
        assert_eq!(
            messages(&toml),
            vec!["projects[0].trigger.seconds is too large, got 9223372036854775807"]
        );
    }

    #[test]
    fn composite_children_are_validated() {
        let errors = messages(
            r#"
[[projects]]
name = "nightly"

[projects.trigger]
type = "composite"

[[projects.trigger.triggers]]
type = "composite"

[[projects.trigger.triggers]]
type = "queue"
queue_url = "https://q.example.com/a"
aws_access_key = "a"
"#,
        );
        assert_eq!(
            errors,
            vec![
                "projects[0].trigger.triggers[0].triggers must contain at least one trigger",
                "projects[0].trigger.triggers[1].aws_secret_access_key must not be empty",
            ]
        );
    }

    #[test]
    fn project_names_cannot_escape_the_state_directory() {
        let toml = VALID.replace("name = \"webapp\"", "name = \"../webapp\"");
        assert_eq!(
            messages(&toml),
            vec!["projects[0].name `../webapp` must not contain path separators"]
        );
    }
}
