//! Declarative alerting inputs.
//!
//! These are the objects operators create and this crate only reads:
//! - [`AlertGroup`]: a named bucket of rules sharing [`Recipient`]s
//! - [`AlertRule`]: one alert condition, carrying exactly one [`RulePayload`]
//! - [`Notifier`]: a configured notification channel
//!
//! Object references are composite `namespace:name` strings, see [`split_ref`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Splits a `namespace:name` reference at the first colon.
///
/// A reference without a colon has an empty namespace.
#[must_use]
pub fn split_ref(reference: &str) -> (&str, &str) {
    reference.split_once(':').unwrap_or(("", reference))
}

/// Joins a namespace and a name into a composite reference.
#[must_use]
pub fn join_ref(namespace: &str, name: &str) -> String {
    format!("{namespace}:{name}")
}

/// Builds the rule id used in route matchers and rule-group labels.
#[must_use]
pub fn rule_id(group_id: &str, rule_name: &str) -> String {
    format!("{group_id}_{rule_name}")
}

/// Whether an object belongs to the whole cluster or to one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Cluster-wide object.
    Cluster,
    /// Object owned by a single project.
    Project,
}

impl Scope {
    /// Returns the scope as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Project => "project",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The severity level of an alert rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational alert, no action required.
    Info,
    /// Warning alert, should be investigated.
    #[default]
    Warning,
    /// Critical alert, requires immediate attention.
    Critical,
}

impl AlertSeverity {
    /// Returns the severity as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Activation state of an alert rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleState {
    /// The rule takes part in every generated artifact.
    #[default]
    Active,
    /// The rule is excluded from every generated artifact.
    Inactive,
}

impl RuleState {
    /// Returns true if the rule should be reconciled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Comparison applied between a metric expression and its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonOperator {
    /// Equal (==).
    Equal,
    /// Not equal (!=).
    NotEqual,
    /// Greater than (>).
    GreaterThan,
    /// Less than (<).
    LessThan,
    /// Greater than or equal (>=).
    GreaterOrEqual,
    /// Less than or equal (<=).
    LessOrEqual,
    /// The expression firing at all is the condition; no threshold applies.
    HasValue,
}

impl ComparisonOperator {
    /// Returns the operator as a `PromQL` symbol, or `None` for [`Self::HasValue`].
    #[must_use]
    pub const fn as_symbol(&self) -> Option<&'static str> {
        match self {
            Self::Equal => Some("=="),
            Self::NotEqual => Some("!="),
            Self::GreaterThan => Some(">"),
            Self::LessThan => Some("<"),
            Self::GreaterOrEqual => Some(">="),
            Self::LessOrEqual => Some("<="),
            Self::HasValue => None,
        }
    }

    /// Returns the operator's declarative name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not-equal",
            Self::GreaterThan => "greater-than",
            Self::LessThan => "less-than",
            Self::GreaterOrEqual => "greater-or-equal",
            Self::LessOrEqual => "less-or-equal",
            Self::HasValue => "has-value",
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification target attached to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Composite reference to a [`Notifier`] (`cluster:notifier`).
    pub notifier_name: String,
    /// Optional address overriding the notifier's default recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl Recipient {
    /// Creates a recipient that uses the notifier's default address.
    #[must_use]
    pub fn new(notifier_name: impl Into<String>) -> Self {
        Self {
            notifier_name: notifier_name.into(),
            recipient: None,
        }
    }

    /// Overrides the delivery address.
    #[must_use]
    pub fn with_override(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Returns the override address if one is set and non-empty.
    #[must_use]
    pub fn override_address(&self) -> Option<&str> {
        self.recipient.as_deref().filter(|r| !r.is_empty())
    }
}

/// A named bucket of alert rules sharing notification recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertGroup {
    /// Group name, unique within its namespace.
    pub name: String,
    /// Cluster name for cluster groups, project name for project groups.
    pub namespace: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Ordered notification targets.
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

impl AlertGroup {
    /// Creates a group with no recipients.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            namespace: namespace.into(),
            recipients: Vec::new(),
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn with_recipient(mut self, recipient: Recipient) -> Self {
        self.recipients.push(recipient);
        self
    }

    /// Returns the composite group id (`namespace:name`).
    #[must_use]
    pub fn id(&self) -> String {
        join_ref(&self.namespace, &self.name)
    }
}

/// Fields shared by every alert rule regardless of payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonRuleField {
    /// Human-readable rule name, exported as the `alert_name` label.
    #[serde(default)]
    pub display_name: String,
    /// Severity of alerts raised by this rule.
    #[serde(default)]
    pub severity: AlertSeverity,
    /// Override for the group-wait timing, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_wait_secs: Option<u64>,
    /// Override for the group-interval timing, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_interval_secs: Option<u64>,
    /// Override for the repeat-interval timing, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval_secs: Option<u64>,
}

/// A `PromQL` threshold rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRule {
    /// The `PromQL` expression.
    pub expression: String,
    /// How the expression is compared against the threshold.
    pub comparison: ComparisonOperator,
    /// The threshold value.
    #[serde(default)]
    pub threshold_value: f64,
    /// Prometheus `for` duration, e.g. `5m`.
    #[serde(default)]
    pub duration: String,
}

impl MetricRule {
    /// Creates a metric rule.
    #[must_use]
    pub fn new(
        expression: impl Into<String>,
        comparison: ComparisonOperator,
        threshold_value: f64,
    ) -> Self {
        Self {
            expression: expression.into(),
            comparison,
            threshold_value,
            duration: String::new(),
        }
    }

    /// Sets the `for` duration.
    #[must_use]
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }
}

/// A cluster event rule, e.g. warning events on pods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRule {
    /// Event type, e.g. `Warning`.
    pub event_type: String,
    /// Kind of the involved object.
    pub resource_kind: String,
}

/// A node condition rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRule {
    /// Node name; empty when a selector is used.
    #[serde(default)]
    pub node_name: String,
    /// Label selector for nodes.
    #[serde(default)]
    pub selector: std::collections::BTreeMap<String, String>,
    /// Condition, e.g. `notready`, `mem`, `cpu`.
    pub condition: String,
    /// Memory threshold percentage.
    #[serde(default)]
    pub mem_threshold: u32,
    /// CPU threshold percentage.
    #[serde(default)]
    pub cpu_threshold: u32,
}

/// A system service health rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemServiceRule {
    /// The system component condition, e.g. `etcd`.
    pub condition: String,
}

/// A pod health rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodRule {
    /// Composite pod reference.
    pub pod_name: String,
    /// Condition, e.g. `notrunning`, `notscheduled`, `restarts`.
    pub condition: String,
    /// Restart count threshold.
    #[serde(default)]
    pub restart_times: u32,
    /// Window for counting restarts, in seconds.
    #[serde(default)]
    pub restart_interval_secs: u64,
}

/// A workload availability rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadRule {
    /// Composite workload id; empty when a selector is used.
    #[serde(default)]
    pub workload_id: String,
    /// Label selector for workloads.
    #[serde(default)]
    pub selector: std::collections::BTreeMap<String, String>,
    /// Minimum percentage of available replicas.
    pub available_percentage: u32,
}

/// The single condition payload carried by an alert rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RulePayload {
    /// `PromQL` threshold.
    Metric(MetricRule),
    /// Cluster event.
    Event(EventRule),
    /// Node condition.
    Node(NodeRule),
    /// System service health.
    SystemService(SystemServiceRule),
    /// Pod health.
    Pod(PodRule),
    /// Workload availability.
    Workload(WorkloadRule),
}

impl RulePayload {
    /// Returns the payload kind.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::Metric(_) => RuleKind::Metric,
            Self::Event(_) => RuleKind::Event,
            Self::Node(_) => RuleKind::Node,
            Self::SystemService(_) => RuleKind::SystemService,
            Self::Pod(_) => RuleKind::Pod,
            Self::Workload(_) => RuleKind::Workload,
        }
    }

    /// Returns the metric payload, if this is a metric rule.
    #[must_use]
    pub const fn as_metric(&self) -> Option<&MetricRule> {
        match self {
            Self::Metric(metric) => Some(metric),
            _ => None,
        }
    }
}

/// Payload discriminant, used for dispatch and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// `PromQL` threshold.
    Metric,
    /// Cluster event.
    Event,
    /// Node condition.
    Node,
    /// System service health.
    SystemService,
    /// Pod health.
    Pod,
    /// Workload availability.
    Workload,
}

impl RuleKind {
    /// Returns the kind as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Event => "event",
            Self::Node => "node",
            Self::SystemService => "systemService",
            Self::Pod => "pod",
            Self::Workload => "workload",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alert rule belonging to exactly one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// Rule name, unique within its namespace.
    pub name: String,
    /// Cluster name for cluster rules, project name for project rules.
    pub namespace: String,
    /// Composite id of the owning group.
    pub group_name: String,
    /// Composite project id (`cluster:project`) for project rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Display name, severity and timing overrides.
    #[serde(default)]
    pub common: CommonRuleField,
    /// The rule's condition.
    pub payload: RulePayload,
    /// Activation state.
    #[serde(default)]
    pub state: RuleState,
}

impl AlertRule {
    /// Maximum allowed length for rule names.
    pub const MAX_NAME_LENGTH: usize = 256;

    /// Creates a new alert rule builder.
    pub fn builder(
        name: impl Into<String>,
        group_name: impl Into<String>,
        payload: RulePayload,
    ) -> AlertRuleBuilder {
        AlertRuleBuilder::new(name, group_name, payload)
    }

    /// Returns the payload kind.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        self.payload.kind()
    }

    /// Returns the id used to match this rule in routes and rule groups.
    #[must_use]
    pub fn rule_id(&self) -> String {
        rule_id(&self.group_name, &self.name)
    }

    /// Returns true if the rule takes part in reconciliation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Builder for creating [`AlertRule`] instances.
#[derive(Debug)]
pub struct AlertRuleBuilder {
    name: String,
    group_name: String,
    project_name: Option<String>,
    common: CommonRuleField,
    payload: RulePayload,
    state: RuleState,
}

impl AlertRuleBuilder {
    fn new(name: impl Into<String>, group_name: impl Into<String>, payload: RulePayload) -> Self {
        Self {
            name: name.into(),
            group_name: group_name.into(),
            project_name: None,
            common: CommonRuleField::default(),
            payload,
            state: RuleState::Active,
        }
    }

    /// Marks this as a project rule owned by `project` (`cluster:project`).
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project_name = Some(project.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.common.display_name = display_name.into();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub const fn severity(mut self, severity: AlertSeverity) -> Self {
        self.common.severity = severity;
        self
    }

    /// Overrides the group-wait timing.
    #[must_use]
    pub const fn group_wait_secs(mut self, secs: u64) -> Self {
        self.common.group_wait_secs = Some(secs);
        self
    }

    /// Overrides the group-interval timing.
    #[must_use]
    pub const fn group_interval_secs(mut self, secs: u64) -> Self {
        self.common.group_interval_secs = Some(secs);
        self
    }

    /// Overrides the repeat-interval timing.
    #[must_use]
    pub const fn repeat_interval_secs(mut self, secs: u64) -> Self {
        self.common.repeat_interval_secs = Some(secs);
        self
    }

    /// Sets the activation state.
    #[must_use]
    pub const fn state(mut self, state: RuleState) -> Self {
        self.state = state;
        self
    }

    /// Builds the [`AlertRule`].
    ///
    /// The rule's namespace is taken from the project id for project rules
    /// and from the group id otherwise.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidConfig` if:
    /// - The name is empty or exceeds the maximum length
    /// - The group reference is not a `namespace:name` pair
    pub fn build(self) -> Result<AlertRule> {
        if self.name.is_empty() {
            return Err(SyncError::InvalidConfig {
                reason: "rule name cannot be empty".to_string(),
            });
        }

        if self.name.len() > AlertRule::MAX_NAME_LENGTH {
            return Err(SyncError::InvalidConfig {
                reason: format!(
                    "rule name exceeds maximum length of {} characters",
                    AlertRule::MAX_NAME_LENGTH
                ),
            });
        }

        let (group_ns, group) = split_ref(&self.group_name);
        if group_ns.is_empty() || group.is_empty() {
            return Err(SyncError::InvalidConfig {
                reason: format!("group reference '{}' is not namespace:name", self.group_name),
            });
        }

        let namespace = match &self.project_name {
            Some(project) => split_ref(project).1.to_string(),
            None => group_ns.to_string(),
        };
        let mut common = self.common;
        if common.display_name.is_empty() {
            common.display_name.clone_from(&self.name);
        }

        Ok(AlertRule {
            name: self.name,
            namespace,
            group_name: self.group_name,
            project_name: self.project_name,
            common,
            payload: self.payload,
            state: self.state,
        })
    }
}

/// PagerDuty channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagerdutySettings {
    /// Integration service key.
    pub service_key: String,
}

/// Generic webhook channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Target URL.
    pub url: String,
}

/// Slack channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackSettings {
    /// Incoming webhook URL.
    pub url: String,
    /// Default channel.
    pub default_recipient: String,
}

/// SMTP channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettings {
    /// Mail server host.
    pub host: String,
    /// Mail server port.
    pub port: u16,
    /// Auth user name.
    #[serde(default)]
    pub username: String,
    /// Auth password.
    #[serde(default)]
    pub password: String,
    /// Sender address.
    pub sender: String,
    /// Default recipient address.
    pub default_recipient: String,
    /// Whether TLS is required.
    #[serde(default)]
    pub tls: bool,
}

/// The channel a notifier delivers through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotifierChannel {
    /// PagerDuty incidents.
    Pagerduty(PagerdutySettings),
    /// HTTP webhook.
    Webhook(WebhookSettings),
    /// Slack message.
    Slack(SlackSettings),
    /// Email.
    Smtp(SmtpSettings),
}

impl NotifierChannel {
    /// Returns the channel name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pagerduty(_) => "pagerduty",
            Self::Webhook(_) => "webhook",
            Self::Slack(_) => "slack",
            Self::Smtp(_) => "smtp",
        }
    }
}

/// A cluster notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifier {
    /// Notifier name, unique within the cluster.
    pub name: String,
    /// Configured channel; `None` until an operator fills it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<NotifierChannel>,
}

impl Notifier {
    /// Creates a notifier with a configured channel.
    #[must_use]
    pub fn new(name: impl Into<String>, channel: NotifierChannel) -> Self {
        Self {
            name: name.into(),
            channel: Some(channel),
        }
    }

    /// Returns the composite reference recipients use for this notifier.
    #[must_use]
    pub fn reference(&self, cluster_name: &str) -> String {
        join_ref(cluster_name, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric() -> RulePayload {
        RulePayload::Metric(MetricRule::new(
            "node_load1",
            ComparisonOperator::GreaterThan,
            4.0,
        ))
    }

    mod ref_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("c-abc:g1", ("c-abc", "g1") ; "namespaced")]
        #[test_case("g1", ("", "g1") ; "bare name")]
        #[test_case("c-abc:p-x:y", ("c-abc", "p-x:y") ; "splits at first colon")]
        fn split(input: &str, expected: (&str, &str)) {
            assert_eq!(split_ref(input), expected);
        }

        #[test]
        fn join_then_split() {
            let joined = join_ref("p-123", "group");
            assert_eq!(joined, "p-123:group");
            assert_eq!(split_ref(&joined), ("p-123", "group"));
        }

        #[test]
        fn rule_id_format() {
            assert_eq!(rule_id("c-abc:g1", "r1"), "c-abc:g1_r1");
        }
    }

    mod comparison_tests {
        use super::*;
        use test_case::test_case;

        #[test_case(ComparisonOperator::Equal, Some("==") ; "equal")]
        #[test_case(ComparisonOperator::NotEqual, Some("!=") ; "not equal")]
        #[test_case(ComparisonOperator::GreaterThan, Some(">") ; "greater")]
        #[test_case(ComparisonOperator::LessThan, Some("<") ; "less")]
        #[test_case(ComparisonOperator::GreaterOrEqual, Some(">=") ; "greater or equal")]
        #[test_case(ComparisonOperator::LessOrEqual, Some("<=") ; "less or equal")]
        #[test_case(ComparisonOperator::HasValue, None ; "has value")]
        fn symbol(op: ComparisonOperator, expected: Option<&str>) {
            assert_eq!(op.as_symbol(), expected);
        }

        #[test]
        fn deserializes_kebab_case() {
            let op: ComparisonOperator = serde_json::from_str("\"greater-or-equal\"").unwrap();
            assert_eq!(op, ComparisonOperator::GreaterOrEqual);
            assert_eq!(op.to_string(), "greater-or-equal");
        }
    }

    mod recipient_tests {
        use super::*;

        #[test]
        fn override_address_ignores_empty() {
            assert_eq!(Recipient::new("c:n").override_address(), None);
            assert_eq!(
                Recipient::new("c:n").with_override("").override_address(),
                None
            );
            assert_eq!(
                Recipient::new("c:n")
                    .with_override("#ops")
                    .override_address(),
                Some("#ops")
            );
        }

        #[test]
        fn group_id() {
            let group = AlertGroup::new("c-abc", "g1").with_recipient(Recipient::new("c-abc:n1"));
            assert_eq!(group.id(), "c-abc:g1");
            assert_eq!(group.recipients.len(), 1);
        }
    }

    mod rule_builder_tests {
        use super::*;

        #[test]
        fn cluster_rule_defaults() {
            let rule = AlertRule::builder("r1", "c-abc:g1", metric()).build().unwrap();

            assert_eq!(rule.namespace, "c-abc");
            assert_eq!(rule.common.display_name, "r1");
            assert_eq!(rule.common.severity, AlertSeverity::Warning);
            assert_eq!(rule.state, RuleState::Active);
            assert!(rule.is_active());
            assert_eq!(rule.kind(), RuleKind::Metric);
            assert_eq!(rule.rule_id(), "c-abc:g1_r1");
        }

        #[test]
        fn project_rule_namespace() {
            let rule = AlertRule::builder("r1", "p-xyz:g1", metric())
                .project("c-abc:p-xyz")
                .display_name("High load")
                .build()
                .unwrap();

            assert_eq!(rule.namespace, "p-xyz");
            assert_eq!(rule.project_name.as_deref(), Some("c-abc:p-xyz"));
            assert_eq!(rule.common.display_name, "High load");
        }

        #[test]
        fn timing_overrides() {
            let rule = AlertRule::builder("r1", "c-abc:g1", metric())
                .group_wait_secs(30)
                .group_interval_secs(60)
                .repeat_interval_secs(3600)
                .build()
                .unwrap();

            assert_eq!(rule.common.group_wait_secs, Some(30));
            assert_eq!(rule.common.group_interval_secs, Some(60));
            assert_eq!(rule.common.repeat_interval_secs, Some(3600));
        }

        #[test]
        fn empty_name_fails() {
            let result = AlertRule::builder("", "c-abc:g1", metric()).build();
            assert!(matches!(result, Err(SyncError::InvalidConfig { .. })));
        }

        #[test]
        fn long_name_fails() {
            let name = "x".repeat(AlertRule::MAX_NAME_LENGTH + 1);
            let result = AlertRule::builder(name, "c-abc:g1", metric()).build();
            assert!(result.is_err());
        }

        #[test]
        fn bare_group_reference_fails() {
            let result = AlertRule::builder("r1", "g1", metric()).build();
            match result {
                Err(SyncError::InvalidConfig { reason }) => {
                    assert!(reason.contains("namespace:name"));
                }
                _ => panic!("expected InvalidConfig error"),
            }
        }

        #[test]
        fn inactive_state() {
            let rule = AlertRule::builder("r1", "c-abc:g1", metric())
                .state(RuleState::Inactive)
                .build()
                .unwrap();
            assert!(!rule.is_active());
        }
    }

    mod payload_tests {
        use super::*;

        #[test]
        fn kinds() {
            let event = RulePayload::Event(EventRule {
                event_type: "Warning".to_string(),
                resource_kind: "Pod".to_string(),
            });
            assert_eq!(event.kind(), RuleKind::Event);
            assert!(event.as_metric().is_none());
            assert!(metric().as_metric().is_some());
            assert_eq!(RuleKind::SystemService.to_string(), "systemService");
        }

        #[test]
        fn rule_json_shape() {
            let json = r#"{
                "name": "r1",
                "namespace": "c-abc",
                "groupName": "c-abc:g1",
                "common": {"displayName": "Node load", "groupWaitSecs": 30},
                "payload": {"metric": {"expression": "up", "comparison": "equal", "thresholdValue": 0}},
                "state": "inactive"
            }"#;
            let rule: AlertRule = serde_json::from_str(json).unwrap();
            assert_eq!(rule.kind(), RuleKind::Metric);
            assert_eq!(rule.state, RuleState::Inactive);
            assert_eq!(rule.common.severity, AlertSeverity::Warning);
            assert_eq!(rule.common.display_name, "Node load");
            assert_eq!(rule.common.group_wait_secs, Some(30));
            assert_eq!(rule.common.repeat_interval_secs, None);
        }

        #[test]
        fn group_json_shape() {
            let json = r##"{
                "name": "g1",
                "namespace": "c-abc",
                "displayName": "Platform",
                "recipients": [
                    {"notifierName": "c-abc:slack"},
                    {"notifierName": "c-abc:mail", "recipient": "ops@example.com"}
                ]
            }"##;
            let group: AlertGroup = serde_json::from_str(json).unwrap();
            assert_eq!(group.display_name, "Platform");
            assert_eq!(group.recipients.len(), 2);
            assert_eq!(group.recipients[0].notifier_name, "c-abc:slack");
            assert_eq!(group.recipients[1].override_address(), Some("ops@example.com"));

            let encoded = serde_json::to_value(&group).unwrap();
            assert!(encoded.get("displayName").is_some());
            assert!(encoded.get("display_name").is_none());
        }
    }

    mod notifier_tests {
        use super::*;

        #[test]
        fn reference() {
            let notifier = Notifier::new(
                "n1",
                NotifierChannel::Webhook(WebhookSettings {
                    url: "http://hook".to_string(),
                }),
            );
            assert_eq!(notifier.reference("c-abc"), "c-abc:n1");
            assert_eq!(notifier.channel.as_ref().map(NotifierChannel::as_str), Some("webhook"));
        }
    }
}
