//! Destination handlers
//!
//! One module per publishing destination. Browser-driven destinations
//! (rutube, vk) are interaction state machines over a shared session;
//! telegram goes through the Bot API and needs no browser. All of them
//! satisfy the same contract so the dispatcher can treat them uniformly.

pub mod rutube;
pub mod telegram;
pub mod vk;

use crate::browser::SessionManager;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{DestinationDescriptor, UploadOutcome, UploadRequest};
use async_trait::async_trait;

/// What every destination module exposes to the dispatcher.
///
/// `upload` runs the whole per-destination flow; an `Err` is converted into
/// a failed outcome at the dispatcher boundary, so nothing escapes the batch.
#[async_trait]
pub trait DestinationHandler: Send + Sync {
    async fn upload(
        &self,
        request: &UploadRequest,
        sessions: &SessionManager,
    ) -> anyhow::Result<UploadOutcome>;
}

/// Constructor for a handler bound to one descriptor.
pub type HandlerFactory =
    fn(&DestinationDescriptor, &Config) -> AppResult<Box<dyn DestinationHandler>>;

/// Static capability table: destination key -> handler factory.
///
/// Registered at compile time; adding a destination means adding a module
/// and one arm here.
pub fn resolve(key: &str) -> Option<HandlerFactory> {
    match key {
        "rutube" => Some(|d, c| Ok(Box::new(rutube::RutubeUploader::new(d.clone(), c.clone())))),
        "vk" => Some(|d, c| Ok(Box::new(vk::VkUploader::new(d.clone(), c.clone())))),
        "telegram" => {
            Some(|d, c| Ok(Box::new(telegram::TelegramUploader::new(d.clone(), c.clone())?)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        for key in ["rutube", "vk", "telegram"] {
            assert!(resolve(key).is_some(), "no factory for {}", key);
        }
    }

    #[test]
    fn unknown_key_is_module_missing() {
        assert!(resolve("pinterest").is_none());
        assert!(resolve("").is_none());
    }
}
