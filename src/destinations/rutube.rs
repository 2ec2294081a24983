//! Rutube studio uploader
//!
//! Drives the studio upload form: inject the file, wait for processing to
//! expose the metadata fields, classify the post (Shorts editor vs the
//! standard one), fill metadata, optionally attach a cover image, resolve
//! the video link and publish. Locator strings come from the descriptor
//! parameters with defaults matching the current page layout.

use crate::browser::SessionManager;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::PageDriver;
use crate::models::{DestinationDescriptor, UploadOutcome, UploadRequest};
use crate::workflow::steps::{
    self, detect_variant, handle_login, publish_and_wait, wait_for_element,
    wait_for_element_fallback, PostVariant,
};
use crate::workflow::wait::WaitPolicy;
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_ENTRY_URL: &str = "https://studio.rutube.ru/uploader/";
const DEFAULT_FILE_INPUT: &str = "input[type='file']";
const DEFAULT_TITLE_FIELD: &str = "input[name='title']";
const DEFAULT_DESCRIPTION_FIELD: &str = "textarea[name='description']";
const DEFAULT_SHORTS_MARKER: &str = "[class*='shorts-editor']";
const DEFAULT_COVER_CONTROL: &str = "div[class*='cover-uploader']";
const DEFAULT_COVER_INPUT: &str = "input[type='file'][accept*='image']";
const DEFAULT_COVER_PREVIEW: &str = "img[class*='cover-preview']";
const DEFAULT_VIDEO_LINK: &str = "a[href*='rutube.ru/video']";
const DEFAULT_PUBLISH_BUTTON: &str = "button[type='submit']";

/// Turn whatever href the studio anchor carries (often a relative path)
/// into the canonical watch URL.
fn canonical_video_url(href: &str) -> Option<String> {
    let re = Regex::new(r"video(?:/person)?/([0-9a-f]{32})").ok()?;
    let id = re.captures(href)?.get(1)?.as_str();
    Some(format!("https://rutube.ru/video/{}/", id))
}

pub struct RutubeUploader {
    descriptor: DestinationDescriptor,
    config: Config,
}

impl RutubeUploader {
    pub fn new(descriptor: DestinationDescriptor, config: Config) -> Self {
        Self { descriptor, config }
    }

    fn step_policy(&self) -> WaitPolicy {
        WaitPolicy::new(self.config.step_timeout, self.config.poll_interval)
    }

    fn tag(&self) -> &str {
        &self.descriptor.display_name
    }

    async fn fill_metadata(
        &self,
        driver: &PageDriver,
        request: &UploadRequest,
        variant: PostVariant,
    ) -> anyhow::Result<()> {
        let title_field = self.descriptor.param_or("title_field", DEFAULT_TITLE_FIELD);
        driver.clear_and_type(title_field, &request.title).await?;
        info!("[{}] title set", self.tag());

        // The Shorts editor has no description control.
        if variant == PostVariant::Standard {
            let description_field = self
                .descriptor
                .param_or("description_field", DEFAULT_DESCRIPTION_FIELD);
            driver
                .clear_and_type(description_field, &request.hashtag_description())
                .await?;
            info!("[{}] description set", self.tag());
        }
        Ok(())
    }

    /// Attach the cover image. Optional: any failure here degrades to a
    /// warning and the upload continues without a thumbnail.
    async fn attach_thumbnail(&self, driver: &PageDriver, request: &UploadRequest) {
        let Some(thumbnail) = request.existing_thumbnail() else {
            return;
        };

        let policy = self.step_policy();
        let control = self
            .descriptor
            .param_or("cover_control", DEFAULT_COVER_CONTROL);
        let cover_el = match wait_for_element(driver, "cover-control", control, policy).await {
            Ok(el) => el,
            Err(e) => {
                warn!("[{}] cover control not found, skipping thumbnail: {}", self.tag(), e);
                return;
            }
        };
        if let Err(e) = driver.scroll_click(&cover_el).await {
            warn!("[{}] could not open cover uploader: {}", self.tag(), e);
            return;
        }

        let cover_input = self.descriptor.param_or("cover_input", DEFAULT_COVER_INPUT);
        let input_el = match wait_for_element(driver, "cover-input", cover_input, policy).await {
            Ok(el) => el,
            Err(e) => {
                warn!("[{}] cover file input not found: {}", self.tag(), e);
                return;
            }
        };
        if let Err(e) = driver.set_file_input(&input_el, thumbnail).await {
            warn!("[{}] could not inject thumbnail: {}", self.tag(), e);
            return;
        }

        // Bounded wait for the "selected" acknowledgment; timing out here is
        // not fatal, the video just keeps its auto-generated cover.
        let preview = self
            .descriptor
            .param_or("cover_preview", DEFAULT_COVER_PREVIEW);
        match wait_for_element(driver, "cover-preview", preview, policy).await {
            Ok(_) => info!("[{}] thumbnail attached", self.tag()),
            Err(e) => warn!("[{}] thumbnail not acknowledged, continuing: {}", self.tag(), e),
        }
    }
}

#[async_trait]
impl super::DestinationHandler for RutubeUploader {
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
        let policy = self.step_policy();

        let entry_url = self.descriptor.param_or("entry_url", DEFAULT_ENTRY_URL);
        info!("[{}] opening {}", self.tag(), entry_url);
        driver
            .page()
            .goto(entry_url)
            .await
            .map_err(AppError::from)?;

        if let Some(login_trigger) = self.descriptor.param_str("login_trigger") {
            let auth_policy = WaitPolicy::new(self.config.auth_timeout, self.config.poll_interval);
            handle_login(&driver, &[login_trigger], auth_policy).await?;
        }

        // Inject the video file; the upload starts immediately.
        let file_input = self.descriptor.param_or("file_input", DEFAULT_FILE_INPUT);
        let input_el =
            wait_for_element_fallback(&driver, "file-input", file_input, &[DEFAULT_FILE_INPUT], policy)
                .await?;
        driver.set_file_input(&input_el, &request.file_path).await?;
        info!("[{}] file sent: {}", self.tag(), request.file_path.display());

        // Processing is done when the studio shows the metadata form.
        info!("[{}] waiting for processing...", self.tag());
        let title_field = self.descriptor.param_or("title_field", DEFAULT_TITLE_FIELD);
        wait_for_element(&driver, "processing", title_field, policy).await?;
        info!("[{}] metadata form ready", self.tag());

        let shorts_marker = self
            .descriptor
            .param_or("shorts_marker", DEFAULT_SHORTS_MARKER);
        let variant = detect_variant(
            &driver,
            shorts_marker,
            policy.slice(Duration::from_secs(3)),
        )
        .await;

        self.fill_metadata(&driver, request, variant).await?;
        self.attach_thumbnail(&driver, request).await;

        // Hold the permanent link before publishing; for a publish timeout
        // this is still what we report back.
        let link_selector = self.descriptor.param_or("video_link", DEFAULT_VIDEO_LINK);
        let link_el = wait_for_element(&driver, "video-link", link_selector, policy).await?;
        let video_url = link_el
            .attribute("href")
            .await
            .ok()
            .flatten()
            .map(|href| canonical_video_url(&href).unwrap_or(href));
        info!("[{}] video link: {:?}", self.tag(), video_url);

        let publish_button = self
            .descriptor
            .param_or("publish_button", DEFAULT_PUBLISH_BUTTON);
        let publish_policy = WaitPolicy::new(self.config.publish_timeout, self.config.poll_interval);
        let ready_marker = self.descriptor.param_str("ready_marker");
        match publish_and_wait(&driver, publish_button, ready_marker, publish_policy).await {
            Ok(signal) => info!("[{}] published ({:?})", self.tag(), signal),
            // The link was already resolved; report it even when the page
            // never confirmed.
            Err(e) => error!("[{}] publish not confirmed: {}", self.tag(), e),
        }

        steps::settle("post-publish", Duration::from_secs(1)).await;

        Ok(UploadOutcome::ok(&self.descriptor.key, video_url))
    }
}

#[cfg(test)]
mod tests {
    use super::canonical_video_url;

    #[test]
    fn test_relative_href_becomes_watch_url() {
        let href = "/video/0123456789abcdef0123456789abcdef/";
        assert_eq!(
            canonical_video_url(href).as_deref(),
            Some("https://rutube.ru/video/0123456789abcdef0123456789abcdef/")
        );
    }

    #[test]
    fn test_absolute_href_is_normalized() {
        let href = "https://rutube.ru/video/person/0123456789abcdef0123456789abcdef/?ref=studio";
        assert_eq!(
            canonical_video_url(href).as_deref(),
            Some("https://rutube.ru/video/0123456789abcdef0123456789abcdef/")
        );
    }

    #[test]
    fn test_unrecognized_href_is_left_alone() {
        assert_eq!(canonical_video_url("/profile/settings"), None);
    }
}
