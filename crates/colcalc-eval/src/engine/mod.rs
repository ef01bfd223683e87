//! Calling conventions: configuration, evaluation context, group partitions
//! and the dispatcher that runs a catalog function over columns.

pub mod dispatch;
pub mod groups;

pub use dispatch::{Dispatcher, EvaluatedColumn};
pub use groups::GroupPartition;

use crate::rng::RngSource;
use crate::traits::FunctionContext;
use rand::rngs::SmallRng;

/// Configuration for column evaluation
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// `None` draws random streams from process entropy; `Some` makes every
    /// volatile function replay exactly.
    pub rng_seed: Option<u64>,
    /// Treat empty text as missing when writing results.
    pub empty_text_is_missing: bool,
    /// strftime pattern for DATE/DATEVALUE calls without a format.
    pub default_date_format: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            empty_text_is_missing: true,
            default_date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl EvalConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_date_format(mut self, fmt: impl Into<String>) -> Self {
        self.default_date_format = fmt.into();
        self
    }
}

/// The `FunctionContext` handed to builtins by the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    config: EvalConfig,
    rng: RngSource,
}

impl EvalContext {
    pub fn new(config: EvalConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }
}

impl FunctionContext for EvalContext {
    fn rng_for(&self, salt: u64) -> SmallRng {
        self.rng.stream(salt)
    }

    fn date_format(&self) -> &str {
        &self.config.default_date_format
    }

    fn empty_text_is_missing(&self) -> bool {
        self.config.empty_text_is_missing
    }
}
