//! Alertmanager configuration syncing for Clawbernetes.
//!
//! `claw-alertsync` turns declarative alerting objects into the two
//! artifacts an Alertmanager/Prometheus stack consumes:
//!
//! - a routing document (`alertmanager.yaml`) stored in a secret, with one
//!   receiver and one route subtree per alert group
//! - Prometheus rule artifacts holding the metric rules of each scope
//!
//! # Features
//!
//! - **Full recomputation**: every sync rebuilds both artifacts from the
//!   current state, so any watch event converges the same way
//! - **Deterministic output**: groups and rules are walked in sorted order
//!   and the secret is only written when its bytes change
//! - **Notifier channels**: PagerDuty, webhook, Slack and SMTP, with
//!   per-recipient address overrides
//! - **Pluggable stores**: listing, secret and rule storage sit behind
//!   traits; in-memory versions live in [`memory`]
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use claw_alertsync::memory::{MemoryLister, MemoryRuleStore, MemorySecretStore, StaticProbe};
//! use claw_alertsync::{
//!     AlertGroup, AlertRule, ConfigSyncer, EventRule, Notifier, NotifierChannel, Recipient,
//!     RulePayload, SlackSettings, SyncOutcome, SyncerConfig,
//! };
//!
//! let lister = Arc::new(MemoryLister::new());
//! lister.put_notifier(Notifier::new(
//!     "ops-slack",
//!     NotifierChannel::Slack(SlackSettings {
//!         url: "https://hooks.slack.com/services/T0/B0/X".to_string(),
//!         default_recipient: "#alerts".to_string(),
//!     }),
//! ));
//! lister.put_cluster_group(
//!     AlertGroup::new("c1", "g1").with_recipient(Recipient::new("c1:ops-slack")),
//! );
//! lister.put_cluster_rule(
//!     AlertRule::builder(
//!         "warning-events",
//!         "c1:g1",
//!         RulePayload::Event(EventRule {
//!             event_type: "Warning".to_string(),
//!             resource_kind: "Pod".to_string(),
//!         }),
//!     )
//!     .build()
//!     .unwrap(),
//! );
//!
//! let secrets = Arc::new(MemorySecretStore::new());
//! let syncer = ConfigSyncer::new(
//!     SyncerConfig::for_cluster("c1"),
//!     lister,
//!     secrets.clone(),
//!     Arc::new(MemoryRuleStore::new()),
//!     Arc::new(StaticProbe::ready("10.43.0.10:9093")),
//! )
//! .unwrap();
//!
//! assert_eq!(syncer.sync().unwrap(), SyncOutcome::Published);
//! assert_eq!(syncer.sync().unwrap(), SyncOutcome::Unchanged);
//! assert_eq!(secrets.write_count(), 1);
//! ```

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/claw-alertsync/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod alertmanager;
pub mod assembler;
pub mod classify;
pub mod error;
pub mod memory;
pub mod partition;
pub mod recipients;
pub mod route;
pub mod rules;
pub mod store;
pub mod syncer;
pub mod template;
pub mod types;

// Re-export main types at crate root
pub use alertmanager::{Config, GlobalConfig, PromDuration, Receiver, Route};
pub use error::{Result, SyncError};
pub use rules::{MetricRulePublisher, PrometheusRule, Rule, RuleGroup};
pub use store::{AlertLister, AlertmanagerProbe, RuleStore, Secret, SecretStore};
pub use syncer::{ConfigSyncer, SyncOutcome, SyncTrigger, SyncerConfig};
pub use types::{
    AlertGroup, AlertRule, AlertRuleBuilder, AlertSeverity, CommonRuleField, ComparisonOperator,
    EventRule, MetricRule, NodeRule, Notifier, NotifierChannel, PagerdutySettings, PodRule,
    Recipient, RuleKind, RulePayload, RuleState, Scope, SlackSettings, SmtpSettings,
    SystemServiceRule, WebhookSettings, WorkloadRule,
};
