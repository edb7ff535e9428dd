use crate::backup::function_path;
use crate::backup::notifications::Notification;
use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{convert_error_vec, Result};
use crate::backup::result_error::{AddFunctionName, AddMsg};
use function_name::named;
use itertools::Itertools;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::Span;

/// Discord refuses message content longer than this many characters
pub static DISCORD_MESSAGE_LIMIT: usize = 2000;
static REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize, Debug)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts messages to a Discord channel webhook.
#[derive(Debug)]
pub struct DiscordWebhook {
    url: RedactedString,
    client: Client,
    span: Span,
}

impl DiscordWebhook {
    pub fn new(url: RedactedString) -> Result<Self> {
        Self::with_span(url, tracing::info_span!("discord"))
    }

    pub fn with_span(url: RedactedString, span: Span) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::from)
            .add_msg("Building webhook http client failed")?;
        Ok(Self { url, client, span })
    }

    #[named]
    fn post(&self, content: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url.inner())
            .json(&WebhookPayload { content })
            .send()
            .map_err(|e| Error::from(e.without_url()))
            .add_fn_name(function_path!())?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            Err(Error::WebhookRejected { status, body }.add_fn_name(function_path!()))
        }
    }
}

impl Notification for DiscordWebhook {
    fn send(&self, msg: &str) -> Result<()> {
        let _entered = self.span.enter();
        let chunks = split_message(msg, DISCORD_MESSAGE_LIMIT);
        tracing::info!("Sending {} message(s) to Discord", chunks.len());

        let errors = chunks
            .iter()
            .filter_map(|chunk| self.post(chunk).err())
            .collect_vec();
        convert_error_vec(errors)
    }
}

/// Splits `msg` on line boundaries into chunks of at most `limit` characters.
///
/// A single line longer than `limit` is cut at character boundaries.
/// Whitespace-only input yields no chunks.
pub fn split_message(msg: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in msg.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            let chars = line.chars().collect_vec();
            let mut pieces = chars.chunks(limit).map(|c| c.iter().collect::<String>());
            let last = pieces.next_back();
            chunks.extend(pieces);
            if let Some(last) = last {
                current_len = last.chars().count();
                current = last;
            }
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.retain(|c| !c.trim().is_empty());
    chunks
}
