//! Grouping of active rules by scope and group.
//!
//! Both pipelines walk the same partition. Keys are held in [`BTreeMap`]s
//! and rules inside a group are ordered by name, so every walk visits
//! groups and rules in the same order regardless of lister order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::{split_ref, AlertRule};

/// Rules of one scope, keyed by composite group id.
pub type GroupRules<'a> = BTreeMap<String, Vec<&'a AlertRule>>;

/// Active rules partitioned into cluster groups and per-project groups.
#[derive(Debug, Default)]
pub struct RulePartition<'a> {
    /// Cluster rules by group id.
    pub cluster: GroupRules<'a>,
    /// Project rules by project name, then group id.
    pub projects: BTreeMap<String, GroupRules<'a>>,
}

impl<'a> RulePartition<'a> {
    /// Partitions the listed rules of one cluster.
    ///
    /// Inactive rules are dropped, as are project rules whose project id
    /// names another cluster.
    #[must_use]
    pub fn new(cluster_name: &str, cluster_rules: &'a [AlertRule], project_rules: &'a [AlertRule]) -> Self {
        let mut partition = Self::default();

        for rule in cluster_rules.iter().filter(|r| r.is_active()) {
            partition
                .cluster
                .entry(rule.group_name.clone())
                .or_default()
                .push(rule);
        }

        for rule in project_rules.iter().filter(|r| r.is_active()) {
            let Some(project_id) = rule.project_name.as_deref() else {
                debug!(rule = %rule.name, "project rule without project, skipping");
                continue;
            };
            let (cluster, project) = split_ref(project_id);
            if cluster != cluster_name {
                continue;
            }
            partition
                .projects
                .entry(project.to_string())
                .or_default()
                .entry(rule.group_name.clone())
                .or_default()
                .push(rule);
        }

        partition.sort_rules();
        partition
    }

    fn sort_rules(&mut self) {
        let groups = self
            .cluster
            .values_mut()
            .chain(self.projects.values_mut().flat_map(BTreeMap::values_mut));
        for rules in groups {
            rules.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }
}
