//! File-backed seen-domain storage.
//!
//! Each country gets `<root>/<country_slug>/seen_domains.json`:
//!
//! ```json
//! {"version": 1, "country": "Ireland", "domains": ["a.ie", "b.com"]}
//! ```
//!
//! Domains are written sorted, through a temp file renamed into place, so a
//! crash mid-write leaves the previous state intact. Unknown versions and
//! malformed documents are storage errors rather than an empty set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{HarvestError, Result};
use crate::traits::store::{SeenDomainSet, SeenDomainStore};
use crate::types::country::slug;

const FORMAT_VERSION: u32 = 1;
const FILE_NAME: &str = "seen_domains.json";

#[derive(Debug, Serialize, Deserialize)]
struct SeenDomainsFile {
    version: u32,
    country: String,
    domains: Vec<String>,
}

/// Seen-domain store rooted at a state directory.
#[derive(Debug, Clone)]
pub struct FileSeenStore {
    root: PathBuf,
}

impl FileSeenStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of a country's state file.
    pub fn path_for(&self, country: &str) -> PathBuf {
        self.root.join(slug(country)).join(FILE_NAME)
    }
}

#[async_trait]
impl SeenDomainStore for FileSeenStore {
    async fn load(&self, country: &str) -> Result<Option<SeenDomainSet>> {
        let path = self.path_for(country);

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No seen-domain state yet");
                return Ok(None);
            }
            Err(e) => return Err(HarvestError::storage(path, e)),
        };

        let doc: SeenDomainsFile =
            serde_json::from_str(&raw).map_err(|e| HarvestError::storage(&path, e))?;

        if doc.version != FORMAT_VERSION {
            return Err(HarvestError::storage(
                &path,
                format!(
                    "unsupported seen-domain format version {} (expected {})",
                    doc.version, FORMAT_VERSION
                ),
            ));
        }
        if slug(&doc.country) != slug(country) {
            return Err(HarvestError::storage(
                &path,
                format!(
                    "state file belongs to '{}', not '{}'",
                    doc.country, country
                ),
            ));
        }

        debug!(path = %path.display(), count = doc.domains.len(), "Loaded seen domains");
        Ok(Some(doc.domains.into_iter().collect()))
    }

    async fn save(&self, country: &str, domains: &SeenDomainSet) -> Result<()> {
        let path = self.path_for(country);

        let mut sorted: Vec<String> = domains.iter().cloned().collect();
        sorted.sort();
        let doc = SeenDomainsFile {
            version: FORMAT_VERSION,
            country: country.to_string(),
            domains: sorted,
        };
        let body = serde_json::to_vec_pretty(&doc).map_err(|e| HarvestError::storage(&path, e))?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&target, &body))
            .await
            .map_err(|e| HarvestError::storage(&path, e))?
            .map_err(|e| HarvestError::storage(&path, e))?;

        debug!(path = %path.display(), count = domains.len(), "Saved seen domains");
        Ok(())
    }
}

fn write_atomic(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
