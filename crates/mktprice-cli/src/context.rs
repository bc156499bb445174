//! Per-run state shared by the command handlers.

use std::time::Duration;

use anyhow::Context as _;
use mktprice_core::{AppConfig, BatchResult, CampaignChoice};
use mktprice_market::{ClientSettings, MarketClient, SnapshotOptions};
use tokio_util::sync::CancellationToken;

/// Exit status reported when the run was interrupted.
pub(crate) const EXIT_CANCELLED: u8 = 130;

pub(crate) struct RunContext {
    pub config: AppConfig,
    pub campaign_id: u64,
    pub client: MarketClient,
    pub cancel: CancellationToken,
}

impl RunContext {
    pub(crate) fn new(
        config: AppConfig,
        campaign: CampaignChoice,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let campaign_id = config.campaign_for(campaign);
        let client = MarketClient::with_base_url(
            &config.api_key,
            ClientSettings::from(&config),
            &config.base_url,
        )
        .context("failed to build marketplace client")?;
        tracing::info!(%campaign, campaign_id, "using campaign");
        Ok(Self {
            config,
            campaign_id,
            client,
            cancel,
        })
    }

    /// Configured business id, or the one owning the campaign.
    pub(crate) async fn business_id(&self) -> anyhow::Result<u64> {
        if let Some(id) = self.config.business_id {
            return Ok(id);
        }
        self.client
            .resolve_business_id(self.campaign_id)
            .await
            .context("could not determine business id; set YANDEX_BUSINESS_ID")
    }

    pub(crate) fn snapshot_options(&self, limit: Option<usize>) -> SnapshotOptions {
        SnapshotOptions {
            page_size: self.config.page_size,
            page_delay: Duration::from_millis(self.config.page_delay_ms),
            limit,
        }
    }
}

/// What a command hands back to `main`.
#[derive(Debug, Default)]
pub(crate) struct RunOutcome {
    pub result: BatchResult,
    /// Set when the snapshot stage was cut short.
    pub cancelled: bool,
}

impl RunOutcome {
    pub(crate) fn new(result: BatchResult, snapshot_cancelled: bool) -> Self {
        Self {
            result,
            cancelled: snapshot_cancelled,
        }
    }

    /// 130 when interrupted, 1 when any batch failed, else 0.
    pub(crate) fn exit_code(&self) -> u8 {
        if self.cancelled || self.result.was_cancelled() {
            EXIT_CANCELLED
        } else if self.result.errors > 0 {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_prefers_cancellation() {
        let mut outcome = RunOutcome::default();
        assert_eq!(outcome.exit_code(), 0);

        outcome.result.errors = 3;
        assert_eq!(outcome.exit_code(), 1);

        outcome.cancelled = true;
        assert_eq!(outcome.exit_code(), EXIT_CANCELLED);
    }

    #[test]
    fn cancelled_batches_exit_130() {
        let result = BatchResult {
            success: 50,
            cancelled: 70,
            ..BatchResult::default()
        };
        assert_eq!(RunOutcome::new(result, false).exit_code(), EXIT_CANCELLED);
    }
}
