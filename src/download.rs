use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::DownloadConfig;
use crate::error::{PipelineError, Result};

/// BMF endpoint serving the tilde-delimited Scheinfirmen extract.
pub const BMF_URL: &str = "https://service.bmf.gv.at/service/allg/lsu/__Gen_Csv.asp";

const USER_AGENT: &str = "scheinfirmen-at/0.1 (https://github.com/arjoma/scheinfirmen-at)";

/// Download the raw extract bytes (ISO-8859-1 as served by the BMF).
///
/// Non-success statuses and transport errors are retried with exponential
/// backoff (`delay * 2^(attempt-1)` before the nth retry). After the last
/// attempt the most recent failure is reported.
pub async fn download_extract(url: &str, settings: &DownloadConfig) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?;

    let mut last_error = String::from("no attempts made");
    for attempt in 1..=settings.retries {
        if attempt > 1 {
            let wait = settings.delay_seconds * 2u64.pow(attempt - 2);
            debug!(attempt, wait_seconds = wait, "waiting before retry");
            tokio::time::sleep(Duration::from_secs(wait)).await;
        }

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                Ok(bytes) => {
                    let digest = hex::encode(Sha256::digest(&bytes));
                    debug!(bytes = bytes.len(), sha256 = %digest, "downloaded extract");
                    return Ok(bytes.to_vec());
                }
                Err(e) => last_error = format!("body read failed: {}", e),
            },
            Ok(resp) => last_error = format!("HTTP status {}", resp.status()),
            Err(e) => last_error = format!("request failed: {}", e),
        }
        warn!(attempt, error = %last_error, "download attempt failed");
    }

    Err(PipelineError::Download {
        attempts: settings.retries,
        message: last_error,
    })
}
