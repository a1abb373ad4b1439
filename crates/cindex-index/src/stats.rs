//! Per-run outcome (spec §4.5 "Failure semantics"): per-file failures are
//! captured rather than aborting the run.

use cindex_detect::DetectorStats;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub stage: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexRunStats {
    pub files_discovered: usize,
    pub files_indexed: usize,
    pub files_skipped_unchanged: usize,
    pub chunks_written: usize,
    pub symbols_written: usize,
    pub workspaces_detected: usize,
    pub services_detected: usize,
    pub endpoints_detected: usize,
    pub failures: Vec<FileFailure>,
    pub detector_stats: DetectorStats,
}
