//! Chat-webhook notification sink

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tactician_api::Notification;
use tactician_remote_api::{Notifier, NotifyError};
use tracing::{debug, warn};

use crate::wire::{Embed, EmbedField, WebhookPayload};

/// Posts each notification as a single embed to a webhook URL
#[derive(Debug)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    warned: AtomicBool,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            warned: AtomicBool::new(false),
        })
    }

    fn is_usable(&self) -> bool {
        self.url.starts_with("https://") || self.url.starts_with("http://")
    }
}

fn payload(notification: &Notification) -> WebhookPayload<'_> {
    WebhookPayload {
        embeds: vec![Embed {
            title: &notification.title,
            description: &notification.description,
            color: notification.color,
            fields: notification
                .fields
                .iter()
                .map(|f| EmbedField {
                    name: &f.name,
                    value: &f.value,
                    inline: f.inline,
                })
                .collect(),
            timestamp: notification
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }],
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.is_usable() {
            if !self.warned.swap(true, Ordering::SeqCst) {
                warn!(url = %self.url, "Webhook URL is not an HTTP(S) URL, skipping notifications");
            }
            return Ok(());
        }

        debug!(title = %notification.title, "Sending webhook notification");

        let response = self
            .client
            .post(&self.url)
            .json(&payload(notification))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
