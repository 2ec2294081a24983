//! Telegram channel uploader
//!
//! The one destination with a documented API: the video goes to a channel
//! through the Bot API `sendVideo` call, no browser involved. Secrets come
//! from the environment; a missing secret fails handler construction, which
//! the dispatcher reports as a per-destination outcome.

use crate::browser::SessionManager;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{DestinationDescriptor, UploadOutcome, UploadRequest};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{info, warn};

const TOKEN_VAR: &str = "TG_BOT_TOKEN";
const CHAT_VAR: &str = "TG_CHAT_ID";

pub struct TelegramUploader {
    descriptor: DestinationDescriptor,
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramUploader {
    pub fn new(descriptor: DestinationDescriptor, _config: Config) -> AppResult<Self> {
        let token = secret(&descriptor, "bot_token", TOKEN_VAR)?;
        let chat_id = secret(&descriptor, "chat_id", CHAT_VAR)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AppError::Other(format!("HTTP client: {}", e)))?;

        Ok(Self {
            descriptor,
            token,
            chat_id,
            client,
        })
    }

    fn tag(&self) -> &str {
        &self.descriptor.display_name
    }

    async fn build_form(&self, request: &UploadRequest) -> anyhow::Result<Form> {
        let video = tokio::fs::read(&request.file_path)
            .await
            .with_context(|| format!("could not read {}", request.file_path.display()))?;
        let file_name = request
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        // Caption carries the title only; Telegram has no separate
        // description or tag fields on a video message.
        let mut form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", request.title.clone())
            .part(
                "video",
                Part::bytes(video).file_name(file_name).mime_str("video/mp4")?,
            );

        if let Some(thumbnail) = request.existing_thumbnail() {
            match tokio::fs::read(thumbnail).await {
                Ok(bytes) => {
                    let mime = match thumbnail.extension().and_then(|e| e.to_str()) {
                        Some("jpg") | Some("jpeg") => "image/jpeg",
                        _ => "image/png",
                    };
                    form = form.part(
                        "thumbnail",
                        Part::bytes(bytes)
                            .file_name("thumbnail")
                            .mime_str(mime)?,
                    );
                }
                Err(e) => warn!("[{}] could not read thumbnail, skipping: {}", self.tag(), e),
            }
        }

        Ok(form)
    }

    /// Public channels yield a t.me link; private chats have none.
    fn message_url(&self, message_id: Option<i64>) -> Option<String> {
        let channel = self.chat_id.strip_prefix('@')?;
        Some(format!("https://t.me/{}/{}", channel, message_id?))
    }
}

#[async_trait]
impl super::DestinationHandler for TelegramUploader {
    async fn upload(
        &self,
        request: &UploadRequest,
        _sessions: &SessionManager,
    ) -> anyhow::Result<UploadOutcome> {
        info!(
            "[{}] sending {} to {}",
            self.tag(),
            request.file_path.display(),
            self.chat_id
        );

        let url = format!("https://api.telegram.org/bot{}/sendVideo", self.token);
        let form = self.build_form(request).await?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("sendVideo request failed")?;
        let status = response.status();
        let body: JsonValue = response.json().await.context("sendVideo response was not JSON")?;

        let ok = body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
        if !ok {
            let description = body
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown API error");
            anyhow::bail!("Telegram API error ({}): {}", status, description);
        }

        let message_id = body
            .get("result")
            .and_then(|r| r.get("message_id"))
            .and_then(|v| v.as_i64());
        let link = self.message_url(message_id);
        info!("[{}] video sent, message_id={:?}", self.tag(), message_id);

        Ok(UploadOutcome::ok(&self.descriptor.key, link))
    }
}

/// Secret lookup: descriptor parameter first, then the environment.
fn secret(descriptor: &DestinationDescriptor, param: &str, var: &str) -> AppResult<String> {
    if let Some(value) = descriptor.param_str(param) {
        return Ok(value.to_string());
    }
    std::env::var(var).map_err(|_| {
        AppError::Config(ConfigError::EnvVarNotFound {
            var_name: var.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DestinationRegistry;

    fn descriptor_with(token: &str, chat: &str) -> DestinationDescriptor {
        let mut d = DestinationRegistry::builtin().get("telegram").unwrap().clone();
        d.parameters.insert("bot_token".into(), toml::Value::String(token.into()));
        d.parameters.insert("chat_id".into(), toml::Value::String(chat.into()));
        d
    }

    #[test]
    fn channel_message_url() {
        let uploader =
            TelegramUploader::new(descriptor_with("123:abc", "@mychannel"), Config::default())
                .unwrap();
        assert_eq!(
            uploader.message_url(Some(42)),
            Some("https://t.me/mychannel/42".to_string())
        );
    }

    #[test]
    fn numeric_chat_has_no_url() {
        let uploader =
            TelegramUploader::new(descriptor_with("123:abc", "-10012345"), Config::default())
                .unwrap();
        assert_eq!(uploader.message_url(Some(42)), None);
    }
}
