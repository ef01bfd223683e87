//! crates/colcalc-eval/src/test_table.rs
//! --------------------------------------------
//! Lightweight in-memory data table for unit/prop tests.
use rustc_hash::FxHashMap;

use crate::args::Call;
use crate::engine::{Dispatcher, EvalConfig, EvalContext, EvaluatedColumn, GroupPartition};
use crate::traits::ArgColumn;
use colcalc_common::{ArgMeta, EvalError, Value};

/// Named columns plus an optional grouping, evaluated through a seeded
/// [`Dispatcher`].
pub struct TestTable {
    columns: FxHashMap<String, Vec<Value>>,
    groups: Option<GroupPartition>,
    config: EvalConfig,
}

impl Default for TestTable {
    fn default() -> Self {
        Self {
            columns: FxHashMap::default(),
            groups: None,
            config: EvalConfig::default().with_seed(0),
        }
    }
}

impl TestTable {
    /* ─────────────── constructors ─────────────── */
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config = self.config.with_seed(seed);
        self
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /* ─────────────── data ─────────────── */
    pub fn with_column<S: Into<String>>(mut self, name: S, values: Vec<Value>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn with_decimals<S: Into<String>>(self, name: S, values: &[f64]) -> Self {
        self.with_column(name, values.iter().map(|&v| Value::Decimal(v)).collect())
    }

    pub fn with_ints<S: Into<String>>(self, name: S, values: &[i32]) -> Self {
        self.with_column(name, values.iter().map(|&v| Value::Int(v)).collect())
    }

    pub fn with_groups(mut self, ids: Vec<u32>) -> Self {
        self.groups = Some(GroupPartition::new(ids));
        self
    }

    /// Row count, taken from the longest column.
    pub fn rows(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }

    /// A stored column as a call argument.
    pub fn col(&self, name: &str) -> ArgColumn {
        let values = self
            .columns
            .get(name)
            .unwrap_or_else(|| panic!("no test column named {name}"));
        ArgColumn::Values(values.clone())
    }

    /* ─────────────── evaluation ─────────────── */
    pub fn context(&self) -> EvalContext {
        EvalContext::new(self.config.clone())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.config.clone())
    }

    /// Evaluate `name` over the whole table with default argument metadata.
    pub fn eval(&self, name: &str, call: Call<ArgColumn>) -> Result<EvaluatedColumn, EvalError> {
        self.eval_with(&self.dispatcher(), name, call, &[])
    }

    /// Evaluate through an existing dispatcher, so successive calls share
    /// its call sequence.
    pub fn eval_with(
        &self,
        dispatcher: &Dispatcher,
        name: &str,
        call: Call<ArgColumn>,
        meta: &[ArgMeta],
    ) -> Result<EvaluatedColumn, EvalError> {
        dispatcher.evaluate(name, call, meta, self.rows(), self.groups.as_ref())
    }
}
