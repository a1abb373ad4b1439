//! Secret-file and large-file gates, and workspace/service/API-contract
//! detectors (spec §4.4, §4.5 stages 7-8).

pub mod api_contract;
pub mod error;
pub mod large_file;
pub mod secret;
pub mod service;
pub mod stats;
pub mod workspace;

pub use api_contract::DetectedEndpoint;
pub use error::{DetectError, DetectResult};
pub use large_file::{LargeFileDetector, LargeFileStrategy};
pub use secret::SecretFilter;
pub use service::ServiceCandidate;
pub use stats::DetectorStats;
pub use workspace::{WorkspaceManifest, WorkspaceManifestKind};
