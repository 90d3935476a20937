//! Routing-tree construction.
//!
//! Every group with a working receiver gets one node under the root,
//! matching on `group_id`. Rules hang beneath their group node, matching on
//! `rule_id`; cluster event rules additionally match `alert_type=event` and
//! use a short group interval so bursts of events are flushed quickly.

use std::collections::BTreeMap;

use crate::alertmanager::{PromDuration, Route};
use crate::types::CommonRuleField;

/// Label carrying the composite group id.
pub const GROUP_ID_LABEL: &str = "group_id";
/// Label carrying the rule id.
pub const RULE_ID_LABEL: &str = "rule_id";
/// Label carrying the alert type (`event`, `metric`, ...).
pub const ALERT_TYPE_LABEL: &str = "alert_type";

/// Group wait, group interval and repeat interval for one route node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTiming {
    /// Group wait, in seconds.
    pub group_wait_secs: u64,
    /// Group interval, in seconds.
    pub group_interval_secs: u64,
    /// Repeat interval, in seconds.
    pub repeat_interval_secs: u64,
}

impl RouteTiming {
    /// Creates a timing triple.
    #[must_use]
    pub const fn new(group_wait_secs: u64, group_interval_secs: u64, repeat_interval_secs: u64) -> Self {
        Self {
            group_wait_secs,
            group_interval_secs,
            repeat_interval_secs,
        }
    }

    /// Applies a rule's overrides field by field; unset fields keep `self`.
    #[must_use]
    pub fn with_overrides(self, common: &CommonRuleField) -> Self {
        Self {
            group_wait_secs: common.group_wait_secs.unwrap_or(self.group_wait_secs),
            group_interval_secs: common.group_interval_secs.unwrap_or(self.group_interval_secs),
            repeat_interval_secs: common.repeat_interval_secs.unwrap_or(self.repeat_interval_secs),
        }
    }

    /// Replaces the group interval.
    #[must_use]
    pub const fn with_group_interval(mut self, secs: u64) -> Self {
        self.group_interval_secs = secs;
        self
    }
}

/// Builds route nodes from a set of group defaults.
#[derive(Debug, Clone, Copy)]
pub struct RouteBuilder {
    defaults: RouteTiming,
    event_group_interval_secs: u64,
}

impl RouteBuilder {
    /// Creates a builder with the group defaults and the event fast-path interval.
    #[must_use]
    pub const fn new(defaults: RouteTiming, event_group_interval_secs: u64) -> Self {
        Self {
            defaults,
            event_group_interval_secs,
        }
    }

    /// Returns the group defaults.
    #[must_use]
    pub const fn defaults(&self) -> RouteTiming {
        self.defaults
    }

    /// Builds the node for a group; it is the only node that names a receiver.
    #[must_use]
    pub fn group_route(&self, group_id: &str) -> Route {
        let mut route = self.route(
            BTreeMap::from([(GROUP_ID_LABEL.to_string(), group_id.to_string())]),
            self.defaults,
        );
        route.receiver = Some(group_id.to_string());
        route
    }

    /// Builds the node for a rule, inheriting group defaults it does not override.
    #[must_use]
    pub fn rule_route(&self, rule_id: &str, common: &CommonRuleField) -> Route {
        self.route(
            BTreeMap::from([(RULE_ID_LABEL.to_string(), rule_id.to_string())]),
            self.defaults.with_overrides(common),
        )
    }

    /// Builds the node for a cluster event rule.
    #[must_use]
    pub fn event_route(&self, rule_id: &str) -> Route {
        self.route(
            BTreeMap::from([
                (ALERT_TYPE_LABEL.to_string(), "event".to_string()),
                (RULE_ID_LABEL.to_string(), rule_id.to_string()),
            ]),
            self.defaults.with_group_interval(self.event_group_interval_secs),
        )
    }

    // The group interval is left out when it equals the default; the
    // inherited value is the same and the document stays smaller.
    fn route(&self, matchers: BTreeMap<String, String>, timing: RouteTiming) -> Route {
        let group_interval = (timing.group_interval_secs != self.defaults.group_interval_secs)
            .then(|| PromDuration::from_secs(timing.group_interval_secs));

        Route {
            receiver: None,
            matchers,
            group_wait: Some(PromDuration::from_secs(timing.group_wait_secs)),
            group_interval,
            repeat_interval: Some(PromDuration::from_secs(timing.repeat_interval_secs)),
            routes: Vec::new(),
        }
    }
}

/// Attaches `child` as the last sub-route of `parent`.
pub fn append_route(parent: &mut Route, child: Route) {
    parent.routes.push(child);
}
