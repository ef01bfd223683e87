use crate::function::{Function, FunctionDescriptor};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::{Arc, Once};

/// Keyed by upper-case name; aliases map to the same instance.
static REG: Lazy<DashMap<String, Arc<dyn Function>>> = Lazy::new(DashMap::new);

static BUILTINS: Once = Once::new();

fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Register `f` under its name and every alias. A later registration under
/// the same name replaces the earlier one.
pub fn register(f: Arc<dyn Function>) {
    for alias in f.aliases() {
        REG.insert(key(alias), Arc::clone(&f));
    }
    REG.insert(key(f.name()), f);
}

/// Case-insensitive lookup.
pub fn get(name: &str) -> Option<Arc<dyn Function>> {
    REG.get(&key(name)).map(|v| Arc::clone(v.value()))
}

pub fn descriptor(name: &str) -> Option<FunctionDescriptor> {
    get(name).map(|f| f.descriptor())
}

/// Every registered name and alias, sorted.
pub fn names() -> Vec<String> {
    let mut out: Vec<String> = REG.iter().map(|e| e.key().clone()).collect();
    out.sort();
    out
}

/// Register the built-in catalog. Safe to call any number of times.
pub fn load_builtins() {
    BUILTINS.call_once(crate::builtins::load_builtins);
}
