//! Assembly of the Alertmanager document from partitioned rules.
//!
//! For every group, in sorted order, the assembler resolves the group's
//! recipients into a [`Receiver`]. Groups with no resolvable recipient are
//! left out of the document entirely. Otherwise the receiver is appended
//! and a group route, with one child per routed rule, is attached to the
//! root route.

use std::collections::BTreeMap;

use tracing::debug;

use crate::alertmanager::{Config, Receiver};
use crate::classify::{route_class, RouteClass};
use crate::error::Result;
use crate::partition::GroupRules;
use crate::recipients::RecipientResolver;
use crate::route::{append_route, RouteBuilder};
use crate::store::AlertLister;
use crate::types::{split_ref, AlertGroup, AlertRule, Notifier, Scope};

/// Builds receivers and routes for cluster and project groups.
pub struct ConfigAssembler<'a, L: AlertLister + ?Sized> {
    lister: &'a L,
    cluster_name: &'a str,
    resolver: RecipientResolver<'a>,
    routes: RouteBuilder,
}

impl<'a, L: AlertLister + ?Sized> ConfigAssembler<'a, L> {
    /// Creates an assembler for one cluster.
    #[must_use]
    pub fn new(lister: &'a L, cluster_name: &'a str, notifiers: &'a [Notifier], routes: RouteBuilder) -> Self {
        Self {
            lister,
            cluster_name,
            resolver: RecipientResolver::new(cluster_name, notifiers),
            routes,
        }
    }

    /// Adds every cluster group to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a group cannot be read for a reason other than
    /// not existing.
    pub fn add_cluster_groups(&self, config: &mut Config, groups: &GroupRules<'_>) -> Result<()> {
        for (group_id, rules) in groups {
            let (_, group_name) = split_ref(group_id);
            let group = self.lister.get_cluster_group(self.cluster_name, group_name)?;
            self.add_group(config, Scope::Cluster, group_id, group.as_ref(), rules);
        }
        Ok(())
    }

    /// Adds every project group to `config`, project by project.
    ///
    /// # Errors
    ///
    /// Returns an error if a group cannot be read for a reason other than
    /// not existing.
    pub fn add_project_groups(
        &self,
        config: &mut Config,
        projects: &BTreeMap<String, GroupRules<'_>>,
    ) -> Result<()> {
        for (project, groups) in projects {
            for (group_id, rules) in groups {
                let (_, group_name) = split_ref(group_id);
                let group = self.lister.get_project_group(project, group_name)?;
                self.add_group(config, Scope::Project, group_id, group.as_ref(), rules);
            }
        }
        Ok(())
    }

    fn add_group(
        &self,
        config: &mut Config,
        scope: Scope,
        group_id: &str,
        group: Option<&AlertGroup>,
        rules: &[&AlertRule],
    ) {
        let Some(group) = group else {
            debug!(scope = %scope, group = %group_id, "alert group not found, skipping its rules");
            return;
        };

        let mut receiver = Receiver::new(group_id);
        if !self.resolver.resolve(&mut receiver, &group.recipients) {
            debug!(
                scope = %scope,
                group = %group_id,
                rules = rules.len(),
                "no recipient resolved, group gets no receiver"
            );
            return;
        }
        config.receivers.push(receiver);

        let mut group_route = self.routes.group_route(group_id);
        for rule in rules.iter().filter(|r| r.is_active()) {
            let rule_id = rule.rule_id();
            match route_class(scope, rule.kind()) {
                RouteClass::Event => {
                    append_route(&mut group_route, self.routes.event_route(&rule_id));
                }
                RouteClass::Rule => {
                    append_route(&mut group_route, self.routes.rule_route(&rule_id, &rule.common));
                }
                RouteClass::Unrouted => {
                    debug!(
                        scope = %scope,
                        rule = %rule_id,
                        kind = %rule.kind(),
                        "rule kind has no route in this scope"
                    );
                }
            }
        }
        append_route(&mut config.route, group_route);
    }
}
