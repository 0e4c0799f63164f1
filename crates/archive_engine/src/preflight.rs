use std::future::Future;

use archive_core::TargetError;
use thiserror::Error;

use crate::{FetchError, Fetcher};

/// Why a job was refused before any worker or output directory existed.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error(transparent)]
    MalformedTarget(#[from] TargetError),
    #[error("{url} not found")]
    NotFound { url: String },
    #[error("unexpected response from {url}: {source}")]
    Unexpected {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("could not start the job: {0}")]
    Runtime(String),
}

impl PreflightError {
    /// Not-found and malformed input are the user's to fix; everything
    /// else is unexpected.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PreflightError::MalformedTarget(_) | PreflightError::NotFound { .. }
        )
    }
}

/// Single existence probe for the job target.
pub async fn probe(fetcher: &dyn Fetcher, url: &str) -> Result<(), PreflightError> {
    match fetcher.fetch(url).await {
        Ok(_) => Ok(()),
        Err(err) if err.status() == Some(404) => Err(PreflightError::NotFound {
            url: url.to_string(),
        }),
        Err(source) => Err(PreflightError::Unexpected {
            url: url.to_string(),
            source,
        }),
    }
}

/// Runs `future` to completion on a fresh current-thread runtime. Must not
/// be called from inside another runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| err.to_string())?;
    Ok(runtime.block_on(future))
}
