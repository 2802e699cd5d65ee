//! HTTP downloads.
use std::{
    io::Write,
    path::Path,
    time::Duration,
};

use crate::error::{AddContext, InstallerError, InstallerErrorKind};

/// Retrieves the body of a URL.
pub trait Fetcher {
    /// Writes the body of `url` into `output` and returns the number of bytes.
    ///
    /// A transport failure or non-success status is an error of kind
    /// [`InstallerErrorKind::Network`]; a stalled connection is
    /// [`InstallerErrorKind::Timeout`].
    fn fetch(&self, url: &str, output: &mut dyn Write) -> Result<u64, InstallerError>;
}

/// [`Fetcher`] using a blocking HTTP agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Creates a fetcher with connect and per-read timeouts.
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .user_agent(concat!("deskcrate/", env!("CARGO_PKG_VERSION")))
            .build();

        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, output: &mut dyn Write) -> Result<u64, InstallerError> {
        tracing::debug!(url, "GET");

        let response = self.agent.get(url).call().map_err(|error| map_ureq_error(url, error))?;

        tracing::debug!(url, status = response.status(), "response");

        let mut reader = response.into_reader();
        let len = std::io::copy(&mut reader, output).map_err(|error| {
            let kind = if is_timeout(&error) {
                InstallerErrorKind::Timeout
            } else {
                InstallerErrorKind::Network
            };
            InstallerError::new(kind)
                .with_source(error)
                .with_context(format!("reading {url}"))
        })?;

        Ok(len)
    }
}

fn map_ureq_error(url: &str, error: ureq::Error) -> InstallerError {
    match error {
        ureq::Error::Status(status, _) => {
            tracing::error!(url, status, "unexpected HTTP status");

            InstallerError::new(InstallerErrorKind::Network)
                .with_context(format!("GET {url} returned HTTP {status}"))
        }
        ureq::Error::Transport(transport) => {
            let timed_out = std::error::Error::source(&transport)
                .and_then(|source| source.downcast_ref::<std::io::Error>())
                .is_some_and(is_timeout);
            let kind = if timed_out {
                InstallerErrorKind::Timeout
            } else {
                InstallerErrorKind::Network
            };

            tracing::error!(url, %transport, "transport error");

            InstallerError::new(kind)
                .with_source(transport)
                .with_context(format!("GET {url}"))
        }
    }
}

fn is_timeout(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

/// Downloads `url` to `destination` through a temporary file in the same
/// directory, so a failed download never leaves a partial file behind.
pub fn download_to_path(
    fetcher: &dyn Fetcher,
    url: &str,
    destination: &Path,
) -> Result<u64, InstallerError> {
    let parent = destination
        .parent()
        .ok_or_else(|| InstallerError::new(InstallerErrorKind::InvalidInput))?;

    tracing::info!(url, ?destination, "downloading");

    let mut temp_file = tempfile::Builder::new()
        .prefix(".download-")
        .tempfile_in(parent)
        .with_contextc(|_| format!("could not create temporary file in {parent:?}"))?;

    let len = fetcher.fetch(url, &mut temp_file)?;
    temp_file.as_file().sync_all()?;
    temp_file
        .persist(destination)
        .map_err(|error| error.error)
        .with_contextc(|_| format!("could not move download to {destination:?}"))?;

    tracing::info!(?destination, len, "downloaded");

    Ok(len)
}
