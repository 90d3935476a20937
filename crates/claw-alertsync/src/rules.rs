//! Prometheus rule-group artifacts.
//!
//! Metric rules are compiled into [`Rule`]s, collected per group into a
//! [`RuleGroup`], and per scope into one [`PrometheusRule`] artifact: one for
//! the cluster, one per project. The [`MetricRulePublisher`] pushes each
//! artifact to a [`RuleStore`].
//!
//! This pipeline does not look at recipients. A group whose notifiers are
//! all missing still gets its rules evaluated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::partition::GroupRules;
use crate::route::{ALERT_TYPE_LABEL, GROUP_ID_LABEL, RULE_ID_LABEL};
use crate::store::RuleStore;
use crate::types::{AlertRule, MetricRule};

/// A single alerting rule evaluated by Prometheus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Alert name; the rule id.
    pub alert: String,
    /// `PromQL` expression.
    pub expr: String,
    /// Pending duration before firing.
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub for_duration: Option<String>,
    /// Labels attached to fired alerts.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Annotations attached to fired alerts.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// Rules of one alert group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    /// Group id.
    pub name: String,
    /// Rules, in rule-name order.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    /// Creates an empty rule group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Appends a rule.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Returns true if the group holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The rule artifact of one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusRule {
    /// Namespace the artifact is stored in.
    pub namespace: String,
    /// Artifact name: the cluster or project name.
    pub name: String,
    /// Rule groups, in group-id order.
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

impl PrometheusRule {
    /// Creates an empty artifact.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Attaches a group, replacing any existing group with the same name.
    pub fn add_group(&mut self, group: RuleGroup) {
        match self.groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
    }

    /// Returns the group with the given name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Returns the number of rules across all groups.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }
}

/// Compiles a metric rule into a Prometheus alerting rule.
///
/// `project_name` is set for project rules and becomes a label.
#[must_use]
pub fn metric_to_rule(
    rule: &AlertRule,
    metric: &MetricRule,
    cluster_name: &str,
    project_name: Option<&str>,
) -> Rule {
    let rule_id = rule.rule_id();
    let threshold = metric.threshold_value.to_string();

    let expr = match metric.comparison.as_symbol() {
        Some(symbol) => format!("{} {symbol} {threshold}", metric.expression),
        None => metric.expression.clone(),
    };

    let mut labels = BTreeMap::from([
        (ALERT_TYPE_LABEL.to_string(), "metric".to_string()),
        ("alert_name".to_string(), rule.common.display_name.clone()),
        (GROUP_ID_LABEL.to_string(), rule.group_name.clone()),
        (RULE_ID_LABEL.to_string(), rule_id.clone()),
        ("severity".to_string(), rule.common.severity.as_str().to_string()),
        ("cluster_name".to_string(), cluster_name.to_string()),
        ("comparison".to_string(), metric.comparison.as_str().to_string()),
        ("expression".to_string(), metric.expression.clone()),
        ("threshold_value".to_string(), threshold),
    ]);
    if !metric.duration.is_empty() {
        labels.insert("duration".to_string(), metric.duration.clone());
    }
    if let Some(project) = project_name {
        labels.insert("project_name".to_string(), project.to_string());
    }

    Rule {
        alert: rule_id,
        expr,
        for_duration: (!metric.duration.is_empty()).then(|| metric.duration.clone()),
        labels,
        annotations: BTreeMap::from([("current_value".to_string(), "{{ $value }}".to_string())]),
    }
}

/// Publishes metric rules as one artifact per scope.
#[derive(Debug)]
pub struct MetricRulePublisher<'a, S: RuleStore + ?Sized> {
    store: &'a S,
    cluster_name: &'a str,
}

impl<'a, S: RuleStore + ?Sized> MetricRulePublisher<'a, S> {
    /// Creates a publisher for one cluster.
    #[must_use]
    pub const fn new(store: &'a S, cluster_name: &'a str) -> Self {
        Self {
            store,
            cluster_name,
        }
    }

    /// Builds the artifact for one scope without publishing it.
    ///
    /// Every group gets an entry, even when it holds no metric rules.
    #[must_use]
    pub fn build(&self, namespace: &str, name: &str, groups: &GroupRules<'_>, project: Option<&str>) -> PrometheusRule {
        let mut artifact = self.store.default_rule(namespace, name);

        for (group_id, rules) in groups {
            let mut group = self.store.rule_group(group_id);
            for rule in rules.iter().filter(|r| r.is_active()) {
                if let Some(metric) = rule.payload.as_metric() {
                    group.add_rule(metric_to_rule(rule, metric, self.cluster_name, project));
                }
            }
            artifact.add_group(group);
        }

        artifact
    }

    /// Builds and publishes the artifact for one scope.
    ///
    /// Any scope with at least one group is published, even when every
    /// group is empty, so rules that were deactivated or turned into other
    /// kinds are dropped from the stored artifact. Returns true if published.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::RuleStore` if the store rejects the artifact.
    pub fn publish(
        &self,
        namespace: &str,
        name: &str,
        groups: &GroupRules<'_>,
        project: Option<&str>,
    ) -> Result<bool> {
        let artifact = self.build(namespace, name, groups, project);

        if artifact.groups.is_empty() {
            debug!(namespace = %namespace, name = %name, "no alert groups, skipping rule publish");
            return Ok(false);
        }

        self.store.sync_rule(&artifact)?;
        info!(
            namespace = %namespace,
            name = %name,
            groups = artifact.groups.len(),
            rules = artifact.rule_count(),
            "published prometheus rules"
        );
        Ok(true)
    }
}
