use gifvault_core::{
    formats, Clock, GifItem, RehostError, RehostGateway, RetryPolicy, TokioClock,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

type Result<T> = std::result::Result<T, RehostError>;

/// Upstream media type of the re-hosted rendition.
const THUMBNAIL_MEDIA_TYPE: &str = "gif";

pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Moves an item's thumbnail onto the durable CDN.
///
/// Only the thumbnail rendition is uploaded. The full-size rendition keeps
/// its origin URL as a fallback reference and is never re-hosted.
///
/// Outcomes of [`process`](Rehoster::process):
/// - upload and verification succeed: canonical and thumbnail URLs point at
///   the CDN;
/// - upload fails or times out, the CDN answers with a URL outside
///   `cdn_prefix`, or verification is exhausted: both URLs are cleared and
///   the item is unusable;
/// - the item cannot be processed at all: it is returned unmodified.
pub struct Rehoster<G, C = TokioClock> {
    gateway: Arc<G>,
    clock: Arc<C>,
    cdn_prefix: String,
    upload_timeout: Duration,
}

impl<G, C> Clone for Rehoster<G, C> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            clock: Arc::clone(&self.clock),
            cdn_prefix: self.cdn_prefix.clone(),
            upload_timeout: self.upload_timeout,
        }
    }
}

impl<G: RehostGateway> Rehoster<G, TokioClock> {
    pub fn new(gateway: Arc<G>, cdn_prefix: impl Into<String>) -> Self {
        Self::with_clock(gateway, Arc::new(TokioClock), cdn_prefix)
    }
}

impl<G: RehostGateway, C: Clock> Rehoster<G, C> {
    pub fn with_clock(gateway: Arc<G>, clock: Arc<C>, cdn_prefix: impl Into<String>) -> Self {
        Self {
            gateway,
            clock,
            cdn_prefix: cdn_prefix.into(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Uploads `source_url` once, bounded by the upload timeout.
    pub async fn upload(&self, source_url: &str) -> Result<String> {
        tokio::time::timeout(
            self.upload_timeout,
            self.gateway.upload(source_url, THUMBNAIL_MEDIA_TYPE),
        )
        .await
        .map_err(|_| RehostError::UploadTimeout)?
    }

    /// Polls the CDN until `cdn_url` exists or `policy` is exhausted.
    pub async fn verify(&self, cdn_url: &str, policy: &RetryPolicy) -> bool {
        let attempts = policy.attempts();

        for attempt in 1..=attempts {
            match tokio::time::timeout(policy.per_attempt_timeout, self.gateway.exists(cdn_url))
                .await
            {
                Ok(Ok(true)) => {
                    trace!(cdn_url, attempt, "CDN copy verified");
                    return true;
                }
                Ok(Ok(false)) => debug!(cdn_url, attempt, "CDN copy not visible yet"),
                Ok(Err(e)) => debug!(cdn_url, attempt, error = %e, "CDN existence check failed"),
                Err(_) => debug!(cdn_url, attempt, "CDN existence check timed out"),
            }

            if attempt < attempts {
                self.clock.sleep(policy.inter_attempt_delay).await;
            }
        }

        warn!(cdn_url, attempts, "CDN copy never became visible");
        false
    }

    /// Re-hosts `item`'s thumbnail, returning the updated item.
    ///
    /// Never fails: an item that cannot be processed comes back unmodified
    /// and is left for the acceptance stage to reject.
    pub async fn process(&self, item: GifItem, policy: &RetryPolicy) -> GifItem {
        match self.try_process(&item, policy).await {
            Ok(processed) => processed,
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "could not re-host item, keeping original");
                item
            }
        }
    }

    async fn try_process(&self, item: &GifItem, policy: &RetryPolicy) -> Result<GifItem> {
        let source_url = item
            .media
            .get(formats::THUMBNAIL)
            .map(|rendition| rendition.url.as_str())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| RehostError::MissingRendition(formats::THUMBNAIL.to_string()))?;
        validate_source_url(source_url)?;

        let mut processed = item.clone();

        let candidate = match self.upload(source_url).await {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "CDN upload failed");
                processed.mark_unusable();
                return Ok(processed);
            }
        };

        if !candidate.starts_with(&self.cdn_prefix) {
            warn!(item_id = %item.id, cdn_url = %candidate, "CDN returned a foreign URL");
            processed.mark_unusable();
            return Ok(processed);
        }

        if !self.verify(&candidate, policy).await {
            processed.mark_unusable();
            return Ok(processed);
        }

        if let Some(rendition) = processed.media.get_mut(formats::THUMBNAIL) {
            rendition.url = candidate.clone();
        }
        processed.url = candidate;
        debug!(item_id = %item.id, url = %processed.url, "item re-hosted");
        Ok(processed)
    }
}

fn validate_source_url(source_url: &str) -> Result<()> {
    let parsed = url::Url::parse(source_url)
        .map_err(|e| RehostError::InvalidSourceUrl(format!("{source_url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(RehostError::InvalidSourceUrl(format!(
            "unsupported scheme '{scheme}' in {source_url}"
        ))),
    }
}
