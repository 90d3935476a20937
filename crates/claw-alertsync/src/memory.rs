//! In-memory implementations of the store traits.
//!
//! Used by tests and by single-node setups that keep alerting objects in
//! process. Each store can be told to fail so error paths can be exercised.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::rules::PrometheusRule;
use crate::store::{AlertLister, AlertmanagerProbe, RuleStore, Secret, SecretStore};
use crate::types::{AlertGroup, AlertRule, Notifier};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// Which [`MemoryLister`] call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListerCall {
    /// [`AlertLister::list_notifiers`].
    Notifiers,
    /// [`AlertLister::list_cluster_rules`].
    ClusterRules,
    /// [`AlertLister::list_project_rules`].
    ProjectRules,
    /// Both group getters.
    Groups,
}

/// An [`AlertLister`] over in-memory collections.
#[derive(Debug, Default)]
pub struct MemoryLister {
    notifiers: RwLock<Vec<Notifier>>,
    cluster_rules: RwLock<Vec<AlertRule>>,
    project_rules: RwLock<Vec<AlertRule>>,
    cluster_groups: RwLock<BTreeMap<Key, AlertGroup>>,
    project_groups: RwLock<BTreeMap<Key, AlertGroup>>,
    failure: RwLock<Option<(ListerCall, String)>>,
}

impl MemoryLister {
    /// Creates an empty lister.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a notifier.
    pub fn put_notifier(&self, notifier: Notifier) {
        let mut notifiers = self.notifiers.write();
        notifiers.retain(|n| n.name != notifier.name);
        notifiers.push(notifier);
    }

    /// Removes a notifier by name.
    pub fn remove_notifier(&self, name: &str) {
        self.notifiers.write().retain(|n| n.name != name);
    }

    /// Adds or replaces a cluster rule.
    pub fn put_cluster_rule(&self, rule: AlertRule) {
        Self::put_rule(&self.cluster_rules, rule);
    }

    /// Adds or replaces a project rule.
    pub fn put_project_rule(&self, rule: AlertRule) {
        Self::put_rule(&self.project_rules, rule);
    }

    /// Adds or replaces a cluster group.
    pub fn put_cluster_group(&self, group: AlertGroup) {
        self.cluster_groups
            .write()
            .insert(key(&group.namespace, &group.name), group);
    }

    /// Adds or replaces a project group.
    pub fn put_project_group(&self, group: AlertGroup) {
        self.project_groups
            .write()
            .insert(key(&group.namespace, &group.name), group);
    }

    /// Removes a cluster group, leaving its rules behind.
    pub fn remove_cluster_group(&self, cluster: &str, name: &str) {
        self.cluster_groups.write().remove(&key(cluster, name));
    }

    /// Makes `call` fail with `reason` until [`Self::clear_failure`].
    pub fn fail(&self, call: ListerCall, reason: impl Into<String>) {
        *self.failure.write() = Some((call, reason.into()));
    }

    /// Stops failing.
    pub fn clear_failure(&self) {
        *self.failure.write() = None;
    }

    fn put_rule(rules: &RwLock<Vec<AlertRule>>, rule: AlertRule) {
        let mut rules = rules.write();
        rules.retain(|r| !(r.namespace == rule.namespace && r.name == rule.name));
        rules.push(rule);
    }

    fn check(&self, call: ListerCall) -> Option<String> {
        self.failure
            .read()
            .as_ref()
            .filter(|(failing, _)| *failing == call)
            .map(|(_, reason)| reason.clone())
    }

    fn list<T: Clone>(&self, call: ListerCall, resource: &'static str, items: &RwLock<Vec<T>>) -> Result<Vec<T>> {
        if let Some(reason) = self.check(call) {
            return Err(SyncError::List { resource, reason });
        }
        Ok(items.read().clone())
    }

    fn get_group(&self, groups: &RwLock<BTreeMap<Key, AlertGroup>>, namespace: &str, name: &str) -> Result<Option<AlertGroup>> {
        if let Some(reason) = self.check(ListerCall::Groups) {
            return Err(SyncError::GroupLookup {
                scope: namespace.to_string(),
                name: name.to_string(),
                reason,
            });
        }
        Ok(groups.read().get(&key(namespace, name)).cloned())
    }
}

impl AlertLister for MemoryLister {
    fn list_notifiers(&self) -> Result<Vec<Notifier>> {
        self.list(ListerCall::Notifiers, "notifiers", &self.notifiers)
    }

    fn list_cluster_rules(&self) -> Result<Vec<AlertRule>> {
        self.list(ListerCall::ClusterRules, "cluster alert rules", &self.cluster_rules)
    }

    fn list_project_rules(&self) -> Result<Vec<AlertRule>> {
        self.list(ListerCall::ProjectRules, "project alert rules", &self.project_rules)
    }

    fn get_cluster_group(&self, cluster: &str, name: &str) -> Result<Option<AlertGroup>> {
        self.get_group(&self.cluster_groups, cluster, name)
    }

    fn get_project_group(&self, project: &str, name: &str) -> Result<Option<AlertGroup>> {
        self.get_group(&self.project_groups, project, name)
    }
}

#[derive(Debug, Clone)]
struct StoredSecret {
    secret: Secret,
    updated_at: DateTime<Utc>,
}

/// A [`SecretStore`] over an in-memory map.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<BTreeMap<Key, StoredSecret>>,
    writes: AtomicUsize,
    failure: RwLock<Option<String>>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a secret without counting it as a write.
    pub fn insert(&self, namespace: &str, secret: Secret) {
        self.secrets.write().insert(
            key(namespace, &secret.name),
            StoredSecret {
                secret,
                updated_at: Utc::now(),
            },
        );
    }

    /// Returns a stored secret.
    #[must_use]
    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .read()
            .get(&key(namespace, name))
            .map(|s| s.secret.clone())
    }

    /// Returns when a secret was last written.
    #[must_use]
    pub fn updated_at(&self, namespace: &str, name: &str) -> Option<DateTime<Utc>> {
        self.secrets
            .read()
            .get(&key(namespace, name))
            .map(|s| s.updated_at)
    }

    /// Returns how many times [`SecretStore::put`] succeeded.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every read and write fail with `reason`.
    pub fn fail(&self, reason: impl Into<String>) {
        *self.failure.write() = Some(reason.into());
    }

    fn check(&self) -> Result<()> {
        match self.failure.read().as_ref() {
            Some(reason) => Err(SyncError::SecretStore {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        self.check()?;
        Ok(self.secret(namespace, name))
    }

    fn put(&self, namespace: &str, secret: Secret) -> Result<()> {
        self.check()?;
        debug!(namespace = %namespace, name = %secret.name, "storing secret");
        self.insert(namespace, secret);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A [`RuleStore`] over an in-memory map.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<BTreeMap<Key, PrometheusRule>>,
    syncs: AtomicUsize,
    failure: RwLock<Option<String>>,
}

impl MemoryRuleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a published artifact.
    #[must_use]
    pub fn get(&self, namespace: &str, name: &str) -> Option<PrometheusRule> {
        self.rules.read().get(&key(namespace, name)).cloned()
    }

    /// Returns every published artifact, ordered by namespace then name.
    #[must_use]
    pub fn list(&self) -> Vec<PrometheusRule> {
        self.rules.read().values().cloned().collect()
    }

    /// Returns how many times [`RuleStore::sync_rule`] succeeded.
    #[must_use]
    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }

    /// Makes every sync fail with `reason`.
    pub fn fail_syncs(&self, reason: impl Into<String>) {
        *self.failure.write() = Some(reason.into());
    }
}

impl RuleStore for MemoryRuleStore {
    fn sync_rule(&self, rule: &PrometheusRule) -> Result<()> {
        if let Some(reason) = self.failure.read().as_ref() {
            return Err(SyncError::RuleStore {
                reason: reason.clone(),
            });
        }
        self.rules
            .write()
            .insert(key(&rule.namespace, &rule.name), rule.clone());
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An [`AlertmanagerProbe`] with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    deployed: bool,
    endpoint: Option<String>,
}

impl StaticProbe {
    /// Alerting is deployed and reachable at `endpoint`.
    #[must_use]
    pub fn ready(endpoint: impl Into<String>) -> Self {
        Self {
            deployed: true,
            endpoint: Some(endpoint.into()),
        }
    }

    /// Alerting is deployed but has no endpoint yet.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            deployed: true,
            endpoint: None,
        }
    }

    /// Alerting is not deployed.
    #[must_use]
    pub const fn not_deployed() -> Self {
        Self {
            deployed: false,
            endpoint: None,
        }
    }
}

impl AlertmanagerProbe for StaticProbe {
    fn is_deployed(&self) -> bool {
        self.deployed
    }

    fn endpoint(&self) -> Result<String> {
        self.endpoint.clone().ok_or_else(|| SyncError::NotReady {
            reason: "alertmanager endpoint has no address".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComparisonOperator, MetricRule, RulePayload};

    fn rule(name: &str) -> AlertRule {
        AlertRule::builder(
            name,
            "c1:g1",
            RulePayload::Metric(MetricRule::new("up", ComparisonOperator::Equal, 0.0)),
        )
        .build()
        .unwrap()
    }

    mod lister_tests {
        use super::*;

        #[test]
        fn put_replaces_by_name() {
            let lister = MemoryLister::new();
            lister.put_cluster_rule(rule("r1"));
            lister.put_cluster_rule(rule("r1"));
            lister.put_cluster_rule(rule("r2"));

            assert_eq!(lister.list_cluster_rules().unwrap().len(), 2);
        }

        #[test]
        fn group_lookup() {
            let lister = MemoryLister::new();
            lister.put_cluster_group(AlertGroup::new("c1", "g1"));

            assert!(lister.get_cluster_group("c1", "g1").unwrap().is_some());
            assert!(lister.get_cluster_group("c1", "g2").unwrap().is_none());
            assert!(lister.get_project_group("c1", "g1").unwrap().is_none());

            lister.remove_cluster_group("c1", "g1");
            assert!(lister.get_cluster_group("c1", "g1").unwrap().is_none());
        }

        #[test]
        fn injected_failure() {
            let lister = MemoryLister::new();
            lister.fail(ListerCall::ProjectRules, "etcd unavailable");

            assert!(lister.list_cluster_rules().is_ok());
            match lister.list_project_rules() {
                Err(SyncError::List { resource, reason }) => {
                    assert_eq!(resource, "project alert rules");
                    assert_eq!(reason, "etcd unavailable");
                }
                other => panic!("expected List error, got {other:?}"),
            }

            lister.clear_failure();
            assert!(lister.list_project_rules().is_ok());
        }
    }

    mod secret_store_tests {
        use super::*;

        #[test]
        fn put_counts_writes() {
            let store = MemorySecretStore::new();
            store.insert("ns", Secret::new("seeded"));
            assert_eq!(store.write_count(), 0);

            store.put("ns", Secret::new("s1")).unwrap();
            assert_eq!(store.write_count(), 1);
            assert!(store.get("ns", "s1").unwrap().is_some());
            assert!(store.updated_at("ns", "s1").is_some());
            assert!(store.get("other", "s1").unwrap().is_none());
        }

        #[test]
        fn failure() {
            let store = MemorySecretStore::new();
            store.fail("forbidden");
            assert!(matches!(
                store.put("ns", Secret::new("s1")),
                Err(SyncError::SecretStore { .. })
            ));
            assert_eq!(store.write_count(), 0);
        }
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn states() {
            assert!(StaticProbe::ready("10.0.0.1:9093").endpoint().is_ok());
            assert!(StaticProbe::pending().is_deployed());
            assert!(StaticProbe::pending().endpoint().unwrap_err().is_not_ready());
            assert!(!StaticProbe::not_deployed().is_deployed());
        }
    }
}
