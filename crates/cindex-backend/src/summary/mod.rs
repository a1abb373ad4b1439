//! File-summary generation: either an external LLM call or a deterministic
//! rule-based fallback (spec §4.2, §6 `CINDEX_SUMMARY_METHOD`).

pub mod http;
pub mod rule_based;
pub mod traits;

pub use http::HttpSummaryProvider;
pub use rule_based::RuleBasedSummaryProvider;
pub use traits::SummaryProvider;
