//! Rule classification.
//!
//! Which routing node a rule gets depends on both its payload kind and its
//! scope. Only metric payloads ever reach the rule-group pipeline; that
//! check lives on [`RulePayload::as_metric`](crate::types::RulePayload::as_metric).

use crate::types::{RuleKind, Scope};

/// How a rule is represented in the routing tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// A child node matching `alert_type=event` and the rule id, with the
    /// fast event group interval.
    Event,
    /// A child node matching the rule id, with the rule's own timing.
    Rule,
    /// No routing node; alerts fall through to the group node.
    Unrouted,
}

/// Classifies a rule kind within a scope.
///
/// Cluster scope routes event, metric, node and system-service rules.
/// Project scope routes metric, pod and workload rules.
#[must_use]
pub const fn route_class(scope: Scope, kind: RuleKind) -> RouteClass {
    match (scope, kind) {
        (Scope::Cluster, RuleKind::Event) => RouteClass::Event,
        (Scope::Cluster, RuleKind::Metric | RuleKind::Node | RuleKind::SystemService)
        | (Scope::Project, RuleKind::Metric | RuleKind::Pod | RuleKind::Workload) => {
            RouteClass::Rule
        }
        _ => RouteClass::Unrouted,
    }
}
