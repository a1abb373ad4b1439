//! Nine-stage retrieval pipeline (spec §4.6-§4.14): scope filter, query
//! processing, file and chunk retrieval, symbol resolution, import-chain
//! expansion, API enrichment, dedup/prioritization, and context assembly.

pub mod api;
pub mod context;
pub mod dedup;
pub mod error;
pub mod imports;
pub mod pipeline;
pub mod query;
pub mod retrieval;
pub mod scope;
pub mod symbols;

pub use error::{RetrievalError, RetrievalResult};
pub use pipeline::{RetrievalPipeline, RetrievalRequest};
pub use query::{ProcessedQuery, QueryProcessor, QueryType};
pub use scope::{BoundaryConfig, ResolvedScope, ScopeConfig, ScopeMode};
