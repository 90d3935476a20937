//! The config syncer: top-level reconciliation.
//!
//! [`ConfigSyncer::sync`] recomputes everything from the current state of
//! the backing store on every call:
//! - lists notifiers, cluster rules and project rules
//! - partitions active rules by scope and group
//! - publishes metric rules as Prometheus rule artifacts
//! - assembles the Alertmanager document and writes it to the config
//!   secret if its bytes differ from what is stored
//!
//! Each trigger (group, rule or notifier change in either scope) runs the
//! same full sync. Concurrent syncs may race on the final write; the last
//! write wins and the next sync converges to the same bytes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alertmanager::{Config, GlobalConfig, PromDuration};
use crate::assembler::ConfigAssembler;
use crate::error::{Result, SyncError};
use crate::partition::RulePartition;
use crate::route::{RouteBuilder, RouteTiming};
use crate::rules::MetricRulePublisher;
use crate::store::{AlertLister, AlertmanagerProbe, RuleStore, Secret, SecretStore};
use crate::template::NOTIFICATION_TMPL;
use crate::types::Notifier;

/// Configuration for the config syncer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncerConfig {
    /// Name of the cluster being reconciled.
    pub cluster_name: String,
    /// Namespace of the cluster rule artifact and the Alertmanager secret.
    pub monitoring_namespace: String,
    /// Prefix of per-project monitoring namespaces.
    pub project_namespace_prefix: String,
    /// Alertmanager app name; the secret is `alertmanager-<app>`.
    pub alertmanager_app_name: String,
    /// Secret key holding the config document.
    pub config_key: String,
    /// Secret key holding the notification template.
    pub template_key: String,
    /// Path Alertmanager loads the template from.
    pub template_path: String,
    /// PagerDuty events endpoint.
    pub pagerduty_url: String,
    /// Global resolve timeout (in seconds).
    pub resolve_timeout_secs: u64,
    /// Default group wait for group and rule routes (in seconds).
    pub group_wait_secs: u64,
    /// Default group interval for group and rule routes (in seconds).
    pub group_interval_secs: u64,
    /// Default repeat interval for group and rule routes (in seconds).
    pub repeat_interval_secs: u64,
    /// Group interval for cluster event routes (in seconds).
    pub event_group_interval_secs: u64,
}

impl Default for SyncerConfig {
    fn default() -> Self {
        Self {
            cluster_name: "local".to_string(),
            monitoring_namespace: "cattle-prometheus".to_string(),
            project_namespace_prefix: "cattle-prometheus-".to_string(),
            alertmanager_app_name: "cluster-alerting".to_string(),
            config_key: "alertmanager.yaml".to_string(),
            template_key: "notification.tmpl".to_string(),
            template_path: "/etc/alertmanager/config/notification.tmpl".to_string(),
            pagerduty_url: "https://events.pagerduty.com/generic/2010-04-15/create_event.json"
                .to_string(),
            resolve_timeout_secs: 300, // 5 minutes
            group_wait_secs: 10,
            group_interval_secs: 10,
            repeat_interval_secs: 10,
            event_group_interval_secs: 1,
        }
    }
}

impl SyncerConfig {
    /// Creates the default configuration for a cluster.
    #[must_use]
    pub fn for_cluster(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Serialization` for malformed JSON and
    /// `SyncError::InvalidConfig` if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidConfig` if a name is empty or a timing is zero.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("cluster name", &self.cluster_name),
            ("monitoring namespace", &self.monitoring_namespace),
            ("alertmanager app name", &self.alertmanager_app_name),
            ("config key", &self.config_key),
            ("template key", &self.template_key),
        ];
        for (what, value) in names {
            if value.is_empty() {
                return Err(SyncError::InvalidConfig {
                    reason: format!("{what} cannot be empty"),
                });
            }
        }

        let timings = [
            ("group wait", self.group_wait_secs),
            ("group interval", self.group_interval_secs),
            ("repeat interval", self.repeat_interval_secs),
            ("event group interval", self.event_group_interval_secs),
        ];
        for (what, secs) in timings {
            if secs == 0 {
                return Err(SyncError::InvalidConfig {
                    reason: format!("{what} must be positive"),
                });
            }
        }

        Ok(())
    }

    /// Returns the name of the Alertmanager config secret.
    #[must_use]
    pub fn secret_name(&self) -> String {
        format!("alertmanager-{}", self.alertmanager_app_name)
    }

    /// Returns the monitoring namespace of a project.
    #[must_use]
    pub fn project_namespace(&self, project: &str) -> String {
        format!("{}{project}", self.project_namespace_prefix)
    }

    /// Returns the route builder for the configured timings.
    #[must_use]
    pub const fn route_builder(&self) -> RouteBuilder {
        RouteBuilder::new(
            RouteTiming::new(
                self.group_wait_secs,
                self.group_interval_secs,
                self.repeat_interval_secs,
            ),
            self.event_group_interval_secs,
        )
    }

    /// Returns the global section of the document.
    #[must_use]
    pub fn global(&self) -> GlobalConfig {
        GlobalConfig {
            resolve_timeout: PromDuration::from_secs(self.resolve_timeout_secs),
            smtp_require_tls: false,
            pagerduty_url: (!self.pagerduty_url.is_empty()).then(|| self.pagerduty_url.clone()),
        }
    }
}

/// What a sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Alerting is not deployed; nothing was computed.
    NotDeployed,
    /// Alertmanager has no endpoint yet; retry later.
    NotReady,
    /// The document matched the stored bytes; nothing was written.
    Unchanged,
    /// A new document was written.
    Published,
}

impl SyncOutcome {
    /// Returns the outcome as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotDeployed => "not_deployed",
            Self::NotReady => "not_ready",
            Self::Unchanged => "unchanged",
            Self::Published => "published",
        }
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The watch event that requested a sync, carrying the object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTrigger {
    /// A cluster alert group changed.
    ClusterGroup(String),
    /// A project alert group changed.
    ProjectGroup(String),
    /// A cluster alert rule changed.
    ClusterRule(String),
    /// A project alert rule changed.
    ProjectRule(String),
    /// A notifier changed.
    Notifier(String),
}

impl SyncTrigger {
    /// Returns the kind of object that changed.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ClusterGroup(_) => "cluster_group",
            Self::ProjectGroup(_) => "project_group",
            Self::ClusterRule(_) => "cluster_rule",
            Self::ProjectRule(_) => "project_rule",
            Self::Notifier(_) => "notifier",
        }
    }

    /// Returns the key of the object that changed.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::ClusterGroup(key)
            | Self::ProjectGroup(key)
            | Self::ClusterRule(key)
            | Self::ProjectRule(key)
            | Self::Notifier(key) => key,
        }
    }
}

/// Reconciles alerting objects into Alertmanager config and Prometheus rules.
pub struct ConfigSyncer {
    config: SyncerConfig,
    lister: Arc<dyn AlertLister>,
    secrets: Arc<dyn SecretStore>,
    rules: Arc<dyn RuleStore>,
    probe: Arc<dyn AlertmanagerProbe>,
}

impl std::fmt::Debug for ConfigSyncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSyncer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConfigSyncer {
    /// Creates a syncer.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidConfig` if the configuration is invalid.
    pub fn new(
        config: SyncerConfig,
        lister: Arc<dyn AlertLister>,
        secrets: Arc<dyn SecretStore>,
        rules: Arc<dyn RuleStore>,
        probe: Arc<dyn AlertmanagerProbe>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            lister,
            secrets,
            rules,
            probe,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncerConfig {
        &self.config
    }

    /// Runs a full sync on behalf of a watch event.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::sync`].
    pub fn handle(&self, trigger: &SyncTrigger) -> Result<SyncOutcome> {
        debug!(trigger = trigger.kind(), key = %trigger.key(), "alert config sync triggered");
        self.sync()
    }

    /// Recomputes and publishes both artifacts.
    ///
    /// # Errors
    ///
    /// Returns an error if listing, a group lookup, serialization or either
    /// publish fails. Nothing is written to the config secret unless the
    /// whole document was built.
    pub fn sync(&self) -> Result<SyncOutcome> {
        if !self.probe.is_deployed() {
            debug!(cluster = %self.config.cluster_name, "alerting not deployed, skipping sync");
            return Ok(SyncOutcome::NotDeployed);
        }

        match self.probe.endpoint() {
            Ok(_) => {}
            Err(e) if e.is_not_ready() => {
                debug!(cluster = %self.config.cluster_name, error = %e, "alertmanager not ready, deferring sync");
                return Ok(SyncOutcome::NotReady);
            }
            Err(e) => return Err(e),
        }

        let notifiers = self.lister.list_notifiers()?;
        let cluster_rules = self.lister.list_cluster_rules()?;
        let project_rules = self.lister.list_project_rules()?;
        let partition =
            RulePartition::new(&self.config.cluster_name, &cluster_rules, &project_rules);

        self.publish_rules(&partition)?;

        let data = self.build_config(&partition, &notifiers)?.to_yaml()?;
        self.publish_config(data)
    }

    /// Computes the serialized document without publishing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if listing, a group lookup or serialization fails.
    pub fn render(&self) -> Result<Vec<u8>> {
        let notifiers = self.lister.list_notifiers()?;
        let cluster_rules = self.lister.list_cluster_rules()?;
        let project_rules = self.lister.list_project_rules()?;
        let partition =
            RulePartition::new(&self.config.cluster_name, &cluster_rules, &project_rules);

        self.build_config(&partition, &notifiers)?.to_yaml()
    }

    fn publish_rules(&self, partition: &RulePartition<'_>) -> Result<()> {
        let publisher = MetricRulePublisher::new(self.rules.as_ref(), &self.config.cluster_name);

        publisher.publish(
            &self.config.monitoring_namespace,
            &self.config.cluster_name,
            &partition.cluster,
            None,
        )?;

        for (project, groups) in &partition.projects {
            publisher.publish(
                &self.config.project_namespace(project),
                project,
                groups,
                Some(project),
            )?;
        }

        Ok(())
    }

    fn build_config(&self, partition: &RulePartition<'_>, notifiers: &[Notifier]) -> Result<Config> {
        let mut config = Config::base(self.config.global(), self.config.template_path.clone());
        let assembler = ConfigAssembler::new(
            self.lister.as_ref(),
            &self.config.cluster_name,
            notifiers,
            self.config.route_builder(),
        );

        assembler.add_cluster_groups(&mut config, &partition.cluster)?;
        assembler.add_project_groups(&mut config, &partition.projects)?;

        Ok(config)
    }

    fn publish_config(&self, data: Vec<u8>) -> Result<SyncOutcome> {
        let namespace = &self.config.monitoring_namespace;
        let name = self.config.secret_name();

        let current = self.secrets.get(namespace, &name)?;
        let unchanged = current
            .as_ref()
            .and_then(|s| s.get(&self.config.config_key))
            .is_some_and(|stored| stored == data.as_slice());
        if unchanged {
            debug!(namespace = %namespace, secret = %name, "config unchanged, not updating secret");
            return Ok(SyncOutcome::Unchanged);
        }

        let mut secret = current.unwrap_or_else(|| Secret::new(name.clone()));
        let bytes = data.len();
        secret.data.insert(self.config.config_key.clone(), data);
        secret.data.insert(
            self.config.template_key.clone(),
            NOTIFICATION_TMPL.as_bytes().to_vec(),
        );
        self.secrets.put(namespace, secret)?;

        info!(namespace = %namespace, secret = %name, bytes, "updated alertmanager config");
        Ok(SyncOutcome::Published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryLister, MemoryRuleStore, MemorySecretStore, StaticProbe};

    mod config_tests {
        use super::*;

        #[test]
        fn defaults() {
            let config = SyncerConfig::default();
            assert!(config.validate().is_ok());
            assert_eq!(config.secret_name(), "alertmanager-cluster-alerting");
            assert_eq!(config.project_namespace("p-1"), "cattle-prometheus-p-1");
            assert_eq!(config.route_builder().defaults(), RouteTiming::new(10, 10, 10));
            assert_eq!(config.global().resolve_timeout, PromDuration::from_secs(300));
        }

        #[test]
        fn from_json_fills_defaults() {
            let config = SyncerConfig::from_json(r#"{"cluster_name": "c-abc"}"#).unwrap();
            assert_eq!(config.cluster_name, "c-abc");
            assert_eq!(config.group_wait_secs, 10);
        }

        #[test]
        fn from_json_rejects_zero_timing() {
            let result = SyncerConfig::from_json(r#"{"repeat_interval_secs": 0}"#);
            match result {
                Err(SyncError::InvalidConfig { reason }) => {
                    assert!(reason.contains("repeat interval"));
                }
                other => panic!("expected InvalidConfig, got {other:?}"),
            }
        }

        #[test]
        fn rejects_empty_cluster_name() {
            let config = SyncerConfig::for_cluster("");
            assert!(config.validate().is_err());
        }

        #[test]
        fn empty_pagerduty_url_is_omitted() {
            let config = SyncerConfig {
                pagerduty_url: String::new(),
                ..SyncerConfig::default()
            };
            assert!(config.global().pagerduty_url.is_none());
        }
    }

    mod trigger_tests {
        use super::*;

        #[test]
        fn kind_and_key() {
            let trigger = SyncTrigger::ProjectRule("p-1/r1".to_string());
            assert_eq!(trigger.kind(), "project_rule");
            assert_eq!(trigger.key(), "p-1/r1");
            assert_eq!(SyncTrigger::Notifier("n".to_string()).kind(), "notifier");
        }

        #[test]
        fn outcome_display() {
            assert_eq!(SyncOutcome::Published.to_string(), "published");
            assert_eq!(SyncOutcome::NotReady.to_string(), "not_ready");
        }
    }

    mod readiness_tests {
        use super::*;

        fn syncer(probe: StaticProbe) -> (ConfigSyncer, Arc<MemorySecretStore>) {
            let secrets = Arc::new(MemorySecretStore::new());
            let syncer = ConfigSyncer::new(
                SyncerConfig::for_cluster("c1"),
                Arc::new(MemoryLister::new()),
                secrets.clone(),
                Arc::new(MemoryRuleStore::new()),
                Arc::new(probe),
            )
            .unwrap();
            (syncer, secrets)
        }

        #[test]
        fn not_deployed_is_noop() {
            let (syncer, secrets) = syncer(StaticProbe::not_deployed());
            assert_eq!(syncer.sync().unwrap(), SyncOutcome::NotDeployed);
            assert_eq!(secrets.write_count(), 0);
        }

        #[test]
        fn pending_endpoint_defers() {
            let (syncer, secrets) = syncer(StaticProbe::pending());
            assert_eq!(syncer.sync().unwrap(), SyncOutcome::NotReady);
            assert_eq!(secrets.write_count(), 0);
        }

        #[test]
        fn empty_cluster_publishes_base_document() {
            let (syncer, secrets) = syncer(StaticProbe::ready("10.0.0.1:9093"));
            assert_eq!(syncer.sync().unwrap(), SyncOutcome::Published);

            let secret = secrets
                .secret("cattle-prometheus", "alertmanager-cluster-alerting")
                .unwrap();
            let config = Config::from_yaml(secret.get("alertmanager.yaml").unwrap()).unwrap();
            assert_eq!(config.receivers.len(), 1);
            assert!(config.route.routes.is_empty());
            assert_eq!(
                secret.get("notification.tmpl"),
                Some(NOTIFICATION_TMPL.as_bytes())
            );
        }

        #[test]
        fn invalid_config_rejected() {
            let result = ConfigSyncer::new(
                SyncerConfig::for_cluster(""),
                Arc::new(MemoryLister::new()),
                Arc::new(MemorySecretStore::new()),
                Arc::new(MemoryRuleStore::new()),
                Arc::new(StaticProbe::ready("x")),
            );
            assert!(result.is_err());
        }
    }
}
