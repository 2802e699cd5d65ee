//! The remote version manifest.
//!
//! The manifest is a JSON document listing the installable releases:
//!
//! ```json
//! {
//!     "versions": [
//!         {"name": "2.4.1", "url": "https://example.com/lumen-2.4.1"},
//!         {"name": "2.4.0", "url": "https://example.com/lumen-2.4.0"}
//!     ]
//! }
//! ```
//!
//! Entries keep document order. Every entry must have a non-empty name and
//! URL, otherwise the whole manifest is rejected.
use std::io::{Read, Seek, Write};

use serde::Deserialize;

use crate::{
    error::{AddInstallerContext, InstallerError, InstallerErrorKind},
    net::Fetcher,
};

/// One selectable release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Display name.
    pub name: String,
    /// Download URL of the application binary.
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    versions: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: Option<String>,
    url: Option<String>,
}

/// Parsed version manifest.
#[derive(Debug, Clone, Default)]
pub struct VersionManifest {
    entries: Vec<VersionEntry>,
}

impl VersionManifest {
    /// Creates a manifest from already validated entries.
    pub fn new(entries: Vec<VersionEntry>) -> Self {
        Self { entries }
    }

    /// Deserialize from the given reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InstallerError> {
        let raw = serde_json::from_reader::<R, RawManifest>(reader).map_err(|error| {
            InstallerError::new(InstallerErrorKind::MalformedManifest).with_source(error)
        })?;

        Self::from_raw(raw)
    }

    /// Deserialize from the given string.
    pub fn from_json(text: &str) -> Result<Self, InstallerError> {
        Self::from_reader(text.as_bytes())
    }

    fn from_raw(raw: RawManifest) -> Result<Self, InstallerError> {
        let mut entries = Vec::with_capacity(raw.versions.len());

        for (index, entry) in raw.versions.into_iter().enumerate() {
            match (entry.name, entry.url) {
                (Some(name), Some(url)) if !name.is_empty() && !url.is_empty() => {
                    entries.push(VersionEntry { name, url });
                }
                (name, url) => {
                    tracing::error!(index, ?name, ?url, "unusable manifest entry");

                    return Err(InstallerError::new(InstallerErrorKind::MalformedManifest)
                        .with_context(format!("entry {index} needs a non-empty name and url")));
                }
            }
        }

        Ok(Self { entries })
    }

    /// Returns the entries in document order.
    pub fn entries(&self) -> &[VersionEntry] {
        &self.entries
    }

    /// Returns whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the display names in document order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }
}

/// Downloads the manifest into a temporary file and parses it.
pub fn fetch_manifest(fetcher: &dyn Fetcher, url: &str) -> Result<VersionManifest, InstallerError> {
    tracing::info!(url, "fetching version manifest");

    let mut temp_file = tempfile::NamedTempFile::new()?;
    let len = fetcher
        .fetch(url, &mut temp_file)
        .inst_context("failed to download version manifest")?;
    temp_file.flush()?;
    temp_file.rewind()?;

    tracing::debug!(len, path = ?temp_file.path(), "downloaded manifest");

    let manifest = VersionManifest::from_reader(std::io::BufReader::new(temp_file.as_file()))
        .inst_context("failed to parse version manifest")?;

    tracing::info!(count = manifest.entries().len(), "parsed version manifest");

    Ok(manifest)
}
