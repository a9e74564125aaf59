use std::time::Duration;

use tracing::{debug, info};

use crate::config::ExperimentConfig;
use crate::page::Page;

/// Completion message plus the delayed hand-back to the survey panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitScreen {
    pub completion_code: String,
    pub redirect_url: String,
    pub delay: Duration,
    pub debug: bool,
}

impl ExitScreen {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            completion_code: config.redirect.completion_code.clone(),
            redirect_url: config.redirect.redirect_url(),
            delay: config.redirect.delay(),
            debug: config.debug,
        }
    }

    pub fn message(&self) -> String {
        let debugging_text = if self.debug {
            format!("<br /><br />redirect link : {}", self.redirect_url)
        } else {
            "<br />".to_string()
        };
        format!(
            r#"<p class="text-center align-middle">
Please wait. You will be redirected back to Prolific in a few moments.
<br /><br />
If not, please use the following completion code to ensure compensation for this study: {}
{}
</p>"#,
            self.completion_code, debugging_text
        )
    }

    /// Shows the message inside the content area, leaving the page in place.
    pub fn show_in_place<P: Page + ?Sized>(&self, page: &P) {
        if let Err(e) = page.set_content(&self.message()) {
            debug!(error = %e, "exit message skipped");
        }
    }

    /// Replaces the page and navigates away after the delay. Debug mode keeps
    /// the participant here instead.
    pub async fn exit<P: Page + ?Sized>(&self, page: &P) {
        if self.debug {
            info!(url = %self.redirect_url, "debug mode: redirect suppressed");
            self.show_in_place(page);
            return;
        }
        page.replace_document(&self.message());
        tokio::time::sleep(self.delay).await;
        info!(url = %self.redirect_url, "redirecting to survey panel");
        page.navigate(&self.redirect_url);
    }
}
