//! Decision model: what a trigger tells the host after a tick.

use serde::{Deserialize, Serialize};

/// How the host should treat a requested integration.
///
/// Serialized as snake_case to match the configuration file
/// (`no_build`, `force_build`, `if_modification_exists`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildCondition {
    /// Do not build.
    NoBuild,

    /// Build even if source control reports no modifications.
    ForceBuild,

    /// Build only if the host finds modifications.
    IfModificationExists,
}

impl std::fmt::Display for BuildCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildCondition::NoBuild => "no_build",
            BuildCondition::ForceBuild => "force_build",
            BuildCondition::IfModificationExists => "if_modification_exists",
        };
        f.write_str(s)
    }
}

/// Result of one trigger tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerDecision {
    /// Nothing to do this tick.
    NoRequest,

    /// The host should start an integration.
    BuildRequested {
        condition: BuildCondition,
        /// Name of the trigger that asked for the build.
        source: String,
    },
}

impl TriggerDecision {
    pub fn build_requested(condition: BuildCondition, source: impl Into<String>) -> Self {
        // A NoBuild condition never turns into a request.
        if condition == BuildCondition::NoBuild {
            return TriggerDecision::NoRequest;
        }
        TriggerDecision::BuildRequested {
            condition,
            source: source.into(),
        }
    }

    pub fn is_requested(&self) -> bool {
        matches!(self, TriggerDecision::BuildRequested { .. })
    }

    pub fn condition(&self) -> Option<BuildCondition> {
        match self {
            TriggerDecision::NoRequest => None,
            TriggerDecision::BuildRequested { condition, .. } => Some(*condition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_build_condition_is_never_a_request() {
        let decision = TriggerDecision::build_requested(BuildCondition::NoBuild, "queueTrigger");
        assert_eq!(decision, TriggerDecision::NoRequest);
        assert_eq!(decision.condition(), None);
    }

    #[test]
    fn build_condition_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&BuildCondition::IfModificationExists).unwrap();
        assert_eq!(json, "\"if_modification_exists\"");
        assert_eq!(BuildCondition::ForceBuild.to_string(), "force_build");
    }
}
