//! Aggregate detector statistics surfaced alongside indexing stats.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorStats {
    pub secret_files_skipped: usize,
    pub secret_pattern_hits: Vec<(String, usize)>,
    pub large_files_structure_only: usize,
    pub large_files_section_chunked: usize,
    pub large_files_skipped: usize,
    pub workspaces_detected: usize,
    pub services_detected: usize,
    pub endpoints_detected: usize,
}
