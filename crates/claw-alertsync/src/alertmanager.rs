//! Alertmanager configuration document.
//!
//! The types here serialize to the YAML layout Alertmanager reads from its
//! config secret. Field order is declaration order and every map is a
//! [`BTreeMap`], so the same document always encodes to the same bytes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SyncError};

/// Name of the placeholder receiver the root route points at.
pub const DEFAULT_RECEIVER: &str = "default";

/// A duration in whole seconds, written in Prometheus notation (`1h30m`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PromDuration(u64);

impl PromDuration {
    // No years: humantime reads `1y` as 365.25 days.
    const UNITS: [(&'static str, u64); 5] = [
        ("w", 7 * 24 * 3600),
        ("d", 24 * 3600),
        ("h", 3600),
        ("m", 60),
        ("s", 1),
    ];

    /// Creates a duration from seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the duration in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0s");
        }
        let mut rest = self.0;
        for (unit, size) in Self::UNITS {
            let count = rest / size;
            if count > 0 {
                write!(f, "{count}{unit}")?;
                rest %= size;
            }
        }
        Ok(())
    }
}

impl FromStr for PromDuration {
    type Err = SyncError;

    /// Parses `1h30m`-style durations, truncated to whole seconds.
    fn from_str(s: &str) -> Result<Self> {
        humantime::parse_duration(s)
            .map(|d| Self(d.as_secs()))
            .map_err(|e| SyncError::Serialization(format!("invalid duration '{s}': {e}")))
    }
}

impl Serialize for PromDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PromDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Settings applied to every receiver unless overridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Time after which an alert is declared resolved if not updated.
    pub resolve_timeout: PromDuration,
    /// Default SMTP TLS requirement.
    #[serde(default)]
    pub smtp_require_tls: bool,
    /// PagerDuty events endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagerduty_url: Option<String>,
}

/// A node in the routing tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Receiver for alerts matching this node. Only group nodes carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Label equality matchers.
    #[serde(rename = "match", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub matchers: BTreeMap<String, String>,
    /// How long to buffer the first notification of a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_wait: Option<PromDuration>,
    /// How long to wait before notifying about new alerts in a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_interval: Option<PromDuration>,
    /// How long to wait before re-sending a notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<PromDuration>,
    /// Child nodes, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Route {
    /// Returns the child whose matchers contain `label=value`.
    #[must_use]
    pub fn find_child(&self, label: &str, value: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.matchers.get(label).is_some_and(|v| v == value))
    }
}

/// PagerDuty receiver entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerdutyConfig {
    /// Integration service key.
    pub service_key: String,
    /// Incident description template.
    pub description: String,
}

/// Webhook receiver entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Target URL.
    pub url: String,
}

/// Slack receiver entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Incoming webhook URL.
    pub api_url: String,
    /// Channel to post to.
    pub channel: String,
    /// Message body template.
    pub text: String,
    /// Message title template.
    pub title: String,
    /// Link attached to the title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title_link: String,
    /// Attachment color template.
    pub color: String,
}

/// Email receiver entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub from: String,
    /// `host:port` of the SMTP server.
    pub smarthost: String,
    /// Auth user name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_username: String,
    /// Auth password.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_password: String,
    /// Whether TLS is required.
    pub require_tls: bool,
    /// Extra mail headers, e.g. `Subject`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// HTML body template.
    pub html: String,
}

/// A named bundle of channel configs; one per alert group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    /// Receiver name, equal to the owning group id.
    pub name: String,
    /// PagerDuty entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pagerduty_configs: Vec<PagerdutyConfig>,
    /// Webhook entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub webhook_configs: Vec<WebhookConfig>,
    /// Slack entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slack_configs: Vec<SlackConfig>,
    /// Email entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email_configs: Vec<EmailConfig>,
}

impl Receiver {
    /// Creates an empty receiver.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the total number of channel entries.
    #[must_use]
    pub fn config_count(&self) -> usize {
        self.pagerduty_configs.len()
            + self.webhook_configs.len()
            + self.slack_configs.len()
            + self.email_configs.len()
    }
}

/// The complete Alertmanager document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Global defaults.
    pub global: GlobalConfig,
    /// Root of the routing tree.
    pub route: Route,
    /// Receivers, in the order groups were assembled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receivers: Vec<Receiver>,
    /// Template file paths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,
}

impl Config {
    /// Creates the base document every reconcile starts from.
    ///
    /// The root route sends everything to the channel-less default receiver;
    /// group routes are appended beneath it.
    #[must_use]
    pub fn base(global: GlobalConfig, template_path: impl Into<String>) -> Self {
        Self {
            global,
            route: Route {
                receiver: Some(DEFAULT_RECEIVER.to_string()),
                matchers: BTreeMap::new(),
                group_wait: Some(PromDuration::from_secs(60)),
                group_interval: Some(PromDuration::from_secs(0)),
                repeat_interval: Some(PromDuration::from_secs(3600)),
                routes: Vec::new(),
            },
            receivers: vec![Receiver::new(DEFAULT_RECEIVER)],
            templates: vec![template_path.into()],
        }
    }

    /// Returns the receiver with the given name.
    #[must_use]
    pub fn receiver(&self, name: &str) -> Option<&Receiver> {
        self.receivers.iter().find(|r| r.name == name)
    }

    /// Encodes the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Serialization` if encoding fails.
    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        Ok(serde_yaml::to_string(self)?.into_bytes())
    }

    /// Decodes a document from YAML.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Serialization` if the bytes are not a valid document.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }
}
