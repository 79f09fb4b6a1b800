#![doc(test(attr(deny(warnings))))]

//! Report Core buckets numeric observations by key and calendar month, keeps
//! settled totals apart from pending entries, and folds them on demand.

pub mod config;
pub mod core;
pub mod errors;
pub mod operator;
pub mod report;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Report Core tracing initialized.");
    });
}
