//! HTTP client for the marketplace Partner API.

mod offers;
mod stocks;

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::MarketError;
use crate::retry::retry_with_backoff;
use crate::types::{Campaign, CampaignResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.partner.market.yandex.ru";

const API_KEY_HEADER: &str = "Api-Key";

/// Longest slice of an error body kept in [`MarketError::Api`].
const MAX_ERROR_BODY: usize = 500;

/// Request tuning shared by every call.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Linear back-off unit between attempts.
    pub retry_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl From<&mktprice_core::AppConfig> for ClientSettings {
    fn from(config: &mktprice_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            max_attempts: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        }
    }
}

/// Client for the marketplace Partner API.
///
/// Every request carries the static `Api-Key` header. 429 responses and
/// connect/timeout failures are retried with linear back-off; any other
/// non-2xx status surfaces as [`MarketError::Api`] at once.
pub struct MarketClient {
    client: Client,
    api_key: String,
    base_url: Url,
    settings: ClientSettings,
}

impl MarketClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, settings: ClientSettings) -> Result<Self, MarketError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MarketError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        settings: ClientSettings,
        base_url: &str,
    ) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("mktprice/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MarketError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            settings,
        })
    }

    /// Fetches campaign metadata, including the owning business.
    ///
    /// # Errors
    ///
    /// Propagates request and decoding failures from the API.
    pub async fn get_campaign(&self, campaign_id: u64) -> Result<Campaign, MarketError> {
        let response: CampaignResponse = self
            .request_json::<(), _>(
                Method::GET,
                &format!("campaigns/{campaign_id}"),
                &[],
                None,
            )
            .await?;
        Ok(response.campaign)
    }

    /// Resolves the business id owning `campaign_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::MissingBusinessId`] when the campaign carries
    /// none, or any error from [`Self::get_campaign`].
    pub async fn resolve_business_id(&self, campaign_id: u64) -> Result<u64, MarketError> {
        let campaign = self.get_campaign(campaign_id).await?;
        let business_id = campaign
            .business
            .map(|b| b.id)
            .ok_or(MarketError::MissingBusinessId { campaign_id })?;
        tracing::info!(
            campaign_id,
            business_id,
            domain = campaign.domain.as_deref().unwrap_or("n/a"),
            "resolved business id from campaign"
        );
        Ok(business_id)
    }

    /// Builds an absolute URL for `path` (relative, no leading slash).
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, MarketError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| MarketError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends one request with retry and decodes a 2xx JSON body into `T`.
    ///
    /// # Errors
    ///
    /// - [`MarketError::RateLimited`] when 429 persists past the retry budget.
    /// - [`MarketError::Api`] for any other non-2xx status.
    /// - [`MarketError::Http`] on network failure.
    /// - [`MarketError::Deserialize`] if the body does not match `T`.
    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, MarketError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, query)?;
        let context = format!("{method} {path}");
        let context = context.as_str();

        retry_with_backoff(
            self.settings.max_attempts,
            self.settings.retry_delay_ms,
            || {
                let url = url.clone();
                let method = method.clone();
                async move {
                    tracing::debug!(%method, %url, "marketplace request");
                    let mut request = self
                        .client
                        .request(method, url.clone())
                        .header(API_KEY_HEADER, &self.api_key);
                    if let Some(body) = body {
                        request = request.json(body);
                    }
                    let response = request.send().await?;
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        return Err(MarketError::RateLimited {
                            url: url.to_string(),
                        });
                    }

                    let text = response.text().await?;
                    if !status.is_success() {
                        let message: String = text.chars().take(MAX_ERROR_BODY).collect();
                        tracing::error!(status = status.as_u16(), %url, %message, "marketplace API error");
                        return Err(MarketError::Api {
                            status: status.as_u16(),
                            message,
                            url: url.to_string(),
                        });
                    }

                    // An empty 200 body decodes as `{}`. Types with only optional fields
                    // accept it; mutation answers need `status` and fail as Deserialize.
                    let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
                    serde_json::from_str(text).map_err(|e| MarketError::Deserialize {
                        context: context.to_owned(),
                        source: e,
                    })
                }
            },
        )
        .await
    }
}
