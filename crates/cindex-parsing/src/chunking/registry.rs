//! Registry of available token counters, keyed by model name (spec §4.3
//! ambient detail: chunk sizing is model-aware so the embedding backend
//! never receives an over-budget chunk).

use std::collections::HashMap;
use std::sync::Arc;

use super::tiktoken_counter::TiktokenCounter;
use super::traits::TokenCounter;

pub struct TokenCounterRegistry {
    counters: HashMap<String, Arc<dyn TokenCounter>>,
    default_model: String,
}

impl TokenCounterRegistry {
    /// # Panics
    /// Panics if the built-in `gpt-4` preset fails to construct, which would
    /// indicate a broken `tiktoken-rs` encoder table.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut counters: HashMap<String, Arc<dyn TokenCounter>> = HashMap::new();
        let gpt4: Arc<dyn TokenCounter> =
            Arc::new(TiktokenCounter::gpt4().expect("built-in gpt-4 tokenizer must load"));
        counters.insert("gpt-4".to_string(), gpt4.clone());
        counters.insert(
            "gpt-3.5-turbo".to_string(),
            Arc::new(TiktokenCounter::gpt35_turbo().expect("built-in gpt-3.5-turbo tokenizer must load")),
        );
        Self {
            counters,
            default_model: "gpt-4".to_string(),
        }
    }

    pub fn register(&mut self, model: impl Into<String>, counter: Arc<dyn TokenCounter>) {
        self.counters.insert(model.into(), counter);
    }

    #[must_use]
    pub fn get(&self, model: &str) -> Option<Arc<dyn TokenCounter>> {
        self.counters.get(model).cloned()
    }

    #[must_use]
    pub fn default_counter(&self) -> Arc<dyn TokenCounter> {
        self.counters
            .get(&self.default_model)
            .cloned()
            .expect("default model is always registered")
    }
}

impl Default for TokenCounterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
