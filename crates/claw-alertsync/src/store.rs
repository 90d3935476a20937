//! Interfaces to the platform the syncer runs in.
//!
//! The syncer reads declarative objects through an [`AlertLister`], checks
//! the alerting stack through an [`AlertmanagerProbe`], and writes its two
//! artifacts through a [`SecretStore`] and a [`RuleStore`]. In-memory
//! implementations live in [`crate::memory`].

use std::collections::BTreeMap;

use crate::error::Result;
use crate::rules::{PrometheusRule, RuleGroup};
use crate::types::{AlertGroup, AlertRule, Notifier};

/// Read access to groups, rules and notifiers.
///
/// List results are unordered. Implementations report listing failures as
/// `SyncError::List` and group read failures as `SyncError::GroupLookup`.
pub trait AlertLister: Send + Sync {
    /// Lists every notifier of the cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_notifiers(&self) -> Result<Vec<Notifier>>;

    /// Lists every cluster alert rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_cluster_rules(&self) -> Result<Vec<AlertRule>>;

    /// Lists every project alert rule, across all projects and clusters.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_project_rules(&self) -> Result<Vec<AlertRule>>;

    /// Gets a cluster group; `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_cluster_group(&self, cluster: &str, name: &str) -> Result<Option<AlertGroup>>;

    /// Gets a project group; `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_project_group(&self, project: &str, name: &str) -> Result<Option<AlertGroup>>;
}

/// A key-value secret holding the published Alertmanager config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secret {
    /// Secret name.
    pub name: String,
    /// Data entries.
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Secret {
    /// Creates an empty secret.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    /// Returns the bytes stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }
}

/// Storage for the published config secret.
pub trait SecretStore: Send + Sync {
    /// Gets a secret; `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::SecretStore` if the store cannot be read.
    fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    /// Creates or replaces a secret.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::SecretStore` if the write fails.
    fn put(&self, namespace: &str, secret: Secret) -> Result<()>;
}

/// Storage for Prometheus rule artifacts.
///
/// Only [`RuleStore::sync_rule`] talks to the backend; the other methods
/// hand out fresh containers and can be overridden to seed them.
pub trait RuleStore: Send + Sync {
    /// Returns the artifact container for one scope.
    fn default_rule(&self, namespace: &str, name: &str) -> PrometheusRule {
        PrometheusRule::new(namespace, name)
    }

    /// Returns an empty rule group for a group id.
    fn rule_group(&self, group_id: &str) -> RuleGroup {
        RuleGroup::new(group_id)
    }

    /// Creates or updates an artifact.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::RuleStore` if the backend rejects the artifact.
    fn sync_rule(&self, rule: &PrometheusRule) -> Result<()>;
}

/// Readiness of the Alertmanager deployment.
pub trait AlertmanagerProbe: Send + Sync {
    /// Returns true if alerting is deployed in the cluster.
    fn is_deployed(&self) -> bool;

    /// Resolves the Alertmanager endpoint.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotReady` while the endpoint is unavailable.
    fn endpoint(&self) -> Result<String>;
}
