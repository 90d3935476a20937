//! Error types for the claw-alertsync crate.

use thiserror::Error;

/// Errors that can occur while reconciling alerting configuration.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing declarative objects from the backing store failed.
    #[error("list {resource}: {reason}")]
    List {
        /// The kind of object being listed.
        resource: &'static str,
        /// The reason the listing failed.
        reason: String,
    },

    /// Reading the group that owns a set of rules failed.
    ///
    /// A group that does not exist is not an error; listers report it as `None`.
    #[error("get alert group {scope}:{name}: {reason}")]
    GroupLookup {
        /// The namespace the group was looked up in.
        scope: String,
        /// The group name.
        name: String,
        /// The reason the lookup failed.
        reason: String,
    },

    /// The alertmanager endpoint cannot be resolved yet.
    #[error("alertmanager not ready: {reason}")]
    NotReady {
        /// Why the endpoint is unavailable.
        reason: String,
    },

    /// Encoding the configuration document failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading or writing the published configuration secret failed.
    #[error("secret store: {reason}")]
    SecretStore {
        /// The reason the store operation failed.
        reason: String,
    },

    /// Publishing a rule-group artifact failed.
    #[error("rule store: {reason}")]
    RuleStore {
        /// The reason the publish failed.
        reason: String,
    },

    /// The syncer configuration is invalid.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The reason the configuration was rejected.
        reason: String,
    },
}

impl SyncError {
    /// Returns true if the error only means the alerting stack is not up yet.
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_list() {
        let err = SyncError::List {
            resource: "notifiers",
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "list notifiers: connection refused");
    }

    #[test]
    fn error_display_group_lookup() {
        let err = SyncError::GroupLookup {
            scope: "c-abc".to_string(),
            name: "g1".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "get alert group c-abc:g1: timeout");
    }

    #[test]
    fn error_display_not_ready() {
        let err = SyncError::NotReady {
            reason: "no endpoints".to_string(),
        };
        assert_eq!(err.to_string(), "alertmanager not ready: no endpoints");
        assert!(err.is_not_ready());
    }

    #[test]
    fn error_display_secret_store() {
        let err = SyncError::SecretStore {
            reason: "conflict".to_string(),
        };
        assert_eq!(err.to_string(), "secret store: conflict");
        assert!(!err.is_not_ready());
    }

    #[test]
    fn error_display_invalid_config() {
        let err = SyncError::InvalidConfig {
            reason: "cluster name cannot be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config: cluster name cannot be empty"
        );
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("invalid json");
        assert!(json_err.is_err());
        let sync_err: SyncError = json_err.unwrap_err().into();
        assert!(matches!(sync_err, SyncError::Serialization(_)));
    }

    #[test]
    fn error_from_serde_yaml() {
        let yaml_err = serde_yaml::from_str::<u32>("[not, a, number]");
        assert!(yaml_err.is_err());
        let sync_err: SyncError = yaml_err.unwrap_err().into();
        assert!(matches!(sync_err, SyncError::Serialization(_)));
    }
}
