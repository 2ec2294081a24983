//! VK group video uploader
//!
//! Uploads into a group's video section. Login state is detected from the
//! page itself: if a login button is visible, the flow clicks it and waits
//! for the URL to leave and return to the group page. Video processing on
//! VK exposes no reliable page marker, so that step falls back to a fixed
//! settle delay.

use crate::browser::SessionManager;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::PageDriver;
use crate::models::{DestinationDescriptor, UploadOutcome, UploadRequest};
use crate::workflow::steps::{
    self, handle_login, publish_and_wait, wait_for_element, wait_for_element_fallback,
};
use crate::workflow::wait::WaitPolicy;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_LOGIN_TRIGGERS: &[&str] = &[
    "button.quick_login_button",
    "button.quick_reg_button",
    "[data-testid='login-button']",
];
const DEFAULT_ADD_CONTROL: &str = "[data-testid='video-upload-button']";
const DEFAULT_FILE_INPUT: &str = "input[type='file'][class*='vkuiVisuallyHidden']";
const DEFAULT_TITLE_FIELD: &str = "input[name='video_title']";
const DEFAULT_VIDEO_LINK: &str = "a[href*='/video-']";
const DEFAULT_PUBLISH_BUTTON: &str = "[data-testid='video-publish']";
const DEFAULT_SETTLE_SECS: i64 = 5;

pub struct VkUploader {
    descriptor: DestinationDescriptor,
    config: Config,
}

impl VkUploader {
    pub fn new(descriptor: DestinationDescriptor, config: Config) -> Self {
        Self { descriptor, config }
    }

    fn tag(&self) -> &str {
        &self.descriptor.display_name
    }

    fn group_url(&self) -> String {
        let group = self.descriptor.param_or("group", "club0");
        format!("https://vk.com/{}", group)
    }

    /// Metadata on VK is optional; the upload dialog pre-fills the title
    /// from the file name. Failure here degrades to a warning.
    async fn fill_metadata(&self, driver: &PageDriver, request: &UploadRequest) {
        let title_field = self.descriptor.param_or("title_field", DEFAULT_TITLE_FIELD);
        if driver.find(title_field).await.is_none() {
            warn!("[{}] title field not found, keeping defaults", self.tag());
            return;
        }
        if let Err(e) = driver.clear_and_type(title_field, &request.title).await {
            warn!("[{}] could not set title: {}", self.tag(), e);
            return;
        }
        info!("[{}] title set", self.tag());

        if let Some(description_field) = self.descriptor.param_str("description_field") {
            if let Err(e) = driver
                .clear_and_type(description_field, &request.hashtag_description())
                .await
            {
                warn!("[{}] could not set description: {}", self.tag(), e);
            }
        }
    }
}

#[async_trait]
impl super::DestinationHandler for VkUploader {
    async fn upload(
        &self,
        request: &UploadRequest,
        sessions: &SessionManager,
    ) -> anyhow::Result<UploadOutcome> {
        let page = sessions
            .start(
                self.descriptor.profile_name(),
                self.config.headless,
                &[],
                self.config.session_start_timeout,
            )
            .await?;
        let driver = PageDriver::new(page);
        let policy = WaitPolicy::new(self.config.step_timeout, self.config.poll_interval);

        let group_url = self.group_url();
        info!("[{}] opening group: {}", self.tag(), group_url);
        driver
            .page()
            .goto(group_url.as_str())
            .await
            .map_err(AppError::from)?;

        let mut triggers: Vec<&str> = Vec::new();
        if let Some(custom) = self.descriptor.param_str("login_trigger") {
            triggers.push(custom);
        }
        triggers.extend_from_slice(DEFAULT_LOGIN_TRIGGERS);
        let auth_policy = WaitPolicy::new(self.config.auth_timeout, self.config.poll_interval);
        handle_login(&driver, &triggers, auth_policy).await?;

        // Open the upload dialog.
        let add_control = self.descriptor.param_or("add_control", DEFAULT_ADD_CONTROL);
        let add_el = wait_for_element(&driver, "add-control", add_control, policy).await?;
        driver
            .scroll_click(&add_el)
            .await
            .map_err(|e| anyhow::anyhow!("could not open upload dialog: {}", e))?;
        info!("[{}] upload dialog opened", self.tag());

        let file_input = self.descriptor.param_or("file_input", DEFAULT_FILE_INPUT);
        let input_el = wait_for_element_fallback(
            &driver,
            "file-input",
            file_input,
            &["input[type='file']"],
            policy,
        )
        .await?;
        driver.set_file_input(&input_el, &request.file_path).await?;
        info!("[{}] file sent: {}", self.tag(), request.file_path.display());

        // No processing indicator to watch on this dialog.
        let settle_secs = self
            .descriptor
            .parameters
            .get("settle_secs")
            .and_then(|v| v.as_integer())
            .unwrap_or(DEFAULT_SETTLE_SECS);
        steps::settle("video processing", Duration::from_secs(settle_secs.max(0) as u64)).await;

        self.fill_metadata(&driver, request).await;

        let link_selector = self.descriptor.param_or("video_link", DEFAULT_VIDEO_LINK);
        let video_url = match wait_for_element(&driver, "video-link", link_selector, policy).await {
            Ok(el) => el.attribute("href").await.ok().flatten(),
            Err(e) => {
                warn!("[{}] could not resolve video link: {}", self.tag(), e);
                None
            }
        };

        let publish_button = self
            .descriptor
            .param_or("publish_button", DEFAULT_PUBLISH_BUTTON);
        let publish_policy = WaitPolicy::new(self.config.publish_timeout, self.config.poll_interval);
        let ready_marker = self.descriptor.param_str("ready_marker");
        match publish_and_wait(&driver, publish_button, ready_marker, publish_policy).await {
            Ok(signal) => info!("[{}] published ({:?})", self.tag(), signal),
            Err(e) => error!("[{}] publish not confirmed: {}", self.tag(), e),
        }

        info!("[{}] done, link: {:?}", self.tag(), video_url);
        Ok(UploadOutcome::ok(&self.descriptor.key, video_url))
    }
}
