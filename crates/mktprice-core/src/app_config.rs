use std::path::PathBuf;

/// Which seller campaign a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CampaignChoice {
    #[default]
    Main,
    /// The alternate storefront configured via `YANDEX_CAMPAIGN_ID_EXPRES`.
    Express,
}

impl std::fmt::Display for CampaignChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignChoice::Main => write!(f, "main"),
            CampaignChoice::Express => write!(f, "express"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub campaign_id: u64,
    /// Owning business; resolved from the campaign when absent.
    pub business_id: Option<u64>,
    pub express_campaign_id: Option<u64>,
    pub default_batch_size: usize,
    pub default_delay_secs: u64,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub page_delay_ms: u64,
    pub page_size: u32,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Returns the campaign id for `choice`.
    ///
    /// Falls back to the main campaign (with a warning) when the express
    /// campaign is requested but not configured.
    #[must_use]
    pub fn campaign_for(&self, choice: CampaignChoice) -> u64 {
        match (choice, self.express_campaign_id) {
            (CampaignChoice::Express, Some(id)) => id,
            (CampaignChoice::Express, None) => {
                tracing::warn!(
                    campaign_id = self.campaign_id,
                    "express campaign is not configured; using the main campaign"
                );
                self.campaign_id
            }
            (CampaignChoice::Main, _) => self.campaign_id,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[redacted]")
            .field("campaign_id", &self.campaign_id)
            .field("business_id", &self.business_id)
            .field("express_campaign_id", &self.express_campaign_id)
            .field("default_batch_size", &self.default_batch_size)
            .field("default_delay_secs", &self.default_delay_secs)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("page_size", &self.page_size)
            .field("log_dir", &self.log_dir)
            .field("log_level", &self.log_level)
            .finish()
    }
}
