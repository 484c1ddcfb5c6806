//! On-disk cache of rendered reports, keyed by symbol and config fingerprint.
//!
//! Layout: `{dir}/{symbol}.txt` holds the report body and
//! `{dir}/{symbol}.meta.json` records how it was produced. Symbols are
//! lowercased in file names.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Config fingerprint and history digest checked on load, so a config
//!   change or a fresh download invalidates old reports
//! - Status listing and bulk cleanup

use super::error::DataError;
use crate::domain::PriceSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

const REPORT_EXT: &str = "txt";
const META_SUFFIX: &str = ".meta.json";
const TMP_EXT: &str = "tmp";

/// Metadata sidecar for a cached report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub symbol: String,
    pub fingerprint: String,
    pub bar_count: usize,
    /// `PriceSeries::history_digest` of the analyzed bars.
    pub history_digest: String,
    pub created_at: DateTime<Utc>,
}

pub struct ReportCache {
    dir: PathBuf,
}

impl ReportCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn stem(symbol: &str) -> String {
        symbol.to_lowercase()
    }

    /// Path to the report body: `{dir}/{symbol}.txt`
    pub fn report_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.{REPORT_EXT}", Self::stem(symbol)))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}{META_SUFFIX}", Self::stem(symbol)))
    }

    /// Write the report for `series` and its sidecar. Both writes are atomic.
    pub fn store(
        &self,
        series: &PriceSeries,
        report: &str,
        fingerprint: &str,
    ) -> Result<ReportMeta, DataError> {
        fs::create_dir_all(&self.dir).map_err(|e| DataError::io(&self.dir, e))?;

        let symbol = series.symbol();
        let meta = ReportMeta {
            symbol: symbol.to_string(),
            fingerprint: fingerprint.to_string(),
            bar_count: series.len(),
            history_digest: series.history_digest(),
            created_at: Utc::now(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)?;

        write_atomic(&self.report_path(symbol), report.as_bytes())?;
        write_atomic(&self.meta_path(symbol), meta_json.as_bytes())?;

        debug!(symbol, path = %self.report_path(symbol).display(), "cached report");
        Ok(meta)
    }

    /// Sidecar for a symbol, if present and readable.
    fn get_meta(&self, symbol: &str) -> Option<ReportMeta> {
        read_meta(&self.meta_path(symbol))
    }

    /// Cached report body for `series`, only if it was produced from the
    /// same bars under `fingerprint`.
    ///
    /// A missing or unreadable sidecar is a miss, not an error.
    pub fn load(
        &self,
        series: &PriceSeries,
        fingerprint: &str,
    ) -> Result<Option<String>, DataError> {
        let symbol = series.symbol();
        let Some(meta) = self.get_meta(symbol) else {
            return Ok(None);
        };
        if meta.bar_count != series.len() || meta.history_digest != series.history_digest() {
            debug!(symbol, "price history changed since report was cached");
            return Ok(None);
        }
        if meta.fingerprint != fingerprint {
            warn!(
                symbol,
                cached = %meta.fingerprint,
                current = %fingerprint,
                "cached report built with different config, ignoring"
            );
            return Ok(None);
        }

        let path = self.report_path(symbol);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DataError::io(path, e)),
        }
    }

    /// Every cached report's metadata, sorted by symbol.
    pub fn status(&self) -> Result<Vec<ReportMeta>, DataError> {
        let mut metas: Vec<ReportMeta> = self
            .entries()?
            .into_iter()
            .filter(|p| is_meta(p))
            .filter_map(|p| read_meta(&p))
            .collect();
        metas.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(metas)
    }

    /// Remove every cached report, sidecar and leftover temp file.
    ///
    /// Returns the number of reports removed. Other files in the directory
    /// are left alone.
    pub fn clean(&self) -> Result<usize, DataError> {
        let mut removed = 0;
        for path in self.entries()? {
            let ext = path.extension().and_then(|e| e.to_str());
            let ours = is_meta(&path) || ext == Some(TMP_EXT) || ext == Some(REPORT_EXT);
            if !ours {
                continue;
            }
            fs::remove_file(&path).map_err(|e| DataError::io(&path, e))?;
            if ext == Some(REPORT_EXT) {
                removed += 1;
            }
        }
        debug!(dir = %self.dir.display(), removed, "cleaned report cache");
        Ok(removed)
    }

    fn entries(&self) -> Result<Vec<PathBuf>, DataError> {
        let iter = match fs::read_dir(&self.dir) {
            Ok(iter) => iter,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DataError::io(&self.dir, e)),
        };
        let mut paths = Vec::new();
        for entry in iter {
            let entry = entry.map_err(|e| DataError::io(&self.dir, e))?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

fn is_meta(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(META_SUFFIX))
}

fn read_meta(path: &Path) -> Option<ReportMeta> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable report sidecar");
            None
        }
    }
}

/// Write to `{path}.{pid}-{n}.tmp` then rename into place.
///
/// The temp name is unique per call, so concurrent writers of the same
/// report never share a temp file; the last rename wins.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DataError> {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}-{n}.{TMP_EXT}", std::process::id()));
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(|e| DataError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        DataError::io(path, e)
    })
}
