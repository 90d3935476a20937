//! Recipient resolution.
//!
//! A [`Recipient`] names a notifier by composite reference and may override
//! the notifier's default address. The [`RecipientResolver`] turns each
//! resolvable recipient into exactly one channel entry on a [`Receiver`].

use std::collections::HashMap;

use tracing::debug;

use crate::alertmanager::{EmailConfig, PagerdutyConfig, Receiver, SlackConfig, WebhookConfig};
use crate::template;
use crate::types::{Notifier, NotifierChannel, Recipient};

/// Resolves recipients against the cluster's notifiers.
#[derive(Debug)]
pub struct RecipientResolver<'a> {
    notifiers: HashMap<String, &'a Notifier>,
}

impl<'a> RecipientResolver<'a> {
    /// Indexes `notifiers` by their `cluster:name` reference.
    #[must_use]
    pub fn new(cluster_name: &str, notifiers: &'a [Notifier]) -> Self {
        let notifiers = notifiers
            .iter()
            .map(|n| (n.reference(cluster_name), n))
            .collect();
        Self { notifiers }
    }

    fn notifier(&self, reference: &str) -> Option<&'a Notifier> {
        self.notifiers.get(reference).copied()
    }

    /// Appends one channel entry to `receiver` per resolvable recipient.
    ///
    /// Returns true if at least one recipient resolved.
    pub fn resolve(&self, receiver: &mut Receiver, recipients: &[Recipient]) -> bool {
        let mut resolved = false;

        for recipient in recipients {
            if recipient.notifier_name.is_empty() {
                continue;
            }

            let Some(notifier) = self.notifier(&recipient.notifier_name) else {
                debug!(
                    receiver = %receiver.name,
                    notifier = %recipient.notifier_name,
                    "cannot find notifier, skipping recipient"
                );
                continue;
            };

            let Some(channel) = &notifier.channel else {
                debug!(
                    receiver = %receiver.name,
                    notifier = %recipient.notifier_name,
                    "notifier has no channel configured, skipping recipient"
                );
                continue;
            };

            add_channel(receiver, channel, recipient.override_address());
            resolved = true;
        }

        resolved
    }
}

fn add_channel(receiver: &mut Receiver, channel: &NotifierChannel, address: Option<&str>) {
    match channel {
        NotifierChannel::Pagerduty(settings) => {
            receiver.pagerduty_configs.push(PagerdutyConfig {
                service_key: address.unwrap_or(&settings.service_key).to_string(),
                description: template::TITLE.to_string(),
            });
        }
        NotifierChannel::Webhook(settings) => {
            receiver.webhook_configs.push(WebhookConfig {
                url: address.unwrap_or(&settings.url).to_string(),
            });
        }
        NotifierChannel::Slack(settings) => {
            receiver.slack_configs.push(SlackConfig {
                api_url: settings.url.clone(),
                channel: address.unwrap_or(&settings.default_recipient).to_string(),
                text: template::SLACK_TEXT.to_string(),
                title: template::TITLE.to_string(),
                title_link: String::new(),
                color: template::SLACK_COLOR.to_string(),
            });
        }
        NotifierChannel::Smtp(settings) => {
            receiver.email_configs.push(EmailConfig {
                to: address.unwrap_or(&settings.default_recipient).to_string(),
                from: settings.sender.clone(),
                smarthost: format!("{}:{}", settings.host, settings.port),
                auth_username: settings.username.clone(),
                auth_password: settings.password.clone(),
                require_tls: settings.tls,
                headers: [("Subject".to_string(), template::TITLE.to_string())].into(),
                html: template::EMAIL_HTML.to_string(),
            });
        }
    }
}
