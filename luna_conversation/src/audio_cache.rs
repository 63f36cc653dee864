//! Scratch directory for synthesized replies.
//!
//! Files are named `luna_response_<unix-millis>_<random>.<ext>`. Eviction
//! only considers files with that prefix and removes those whose modification
//! time is older than the configured age.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::{debug, info, warn};

const FILE_PREFIX: &str = "luna_response_";

#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
    max_age: Duration,
}

impl AudioCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    fn file_name(extension: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let nonce: u32 = rand::thread_rng().r#gen();
        format!("{FILE_PREFIX}{millis}_{nonce:08x}.{extension}")
    }

    /// Write `bytes` to a fresh file and return its path.
    pub async fn store(&self, bytes: &[u8], extension: &str) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(extension));
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored {} bytes of audio at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Remove cached files older than `max_age`.
    pub fn evict_expired(&self) -> io::Result<usize> {
        self.evict_expired_at(SystemTime::now())
    }

    /// Remove cached files older than `max_age` as seen from `now`.
    pub fn evict_expired_at(&self, now: SystemTime) -> io::Result<usize> {
        let cutoff = now.checked_sub(self.max_age).unwrap_or(UNIX_EPOCH);

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_ours = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX));
            if !is_ours {
                continue;
            }

            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Evicted {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Could not remove {}: {e}", path.display()),
            }
        }

        if removed > 0 {
            info!("Evicted {removed} cached audio file(s) from {}", self.dir.display());
        }
        Ok(removed)
    }
}
