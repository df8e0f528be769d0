//! Subcommand handlers
//!
//! Each submodule implements one subcommand: it wires the store and
//! importer from the effective configuration, runs the operation, and
//! renders a payload through the [`crate::output::OutputWriter`].

pub mod assess;
pub mod config;
pub mod datasets;
pub mod ingest;
pub mod records;
pub mod remove;

use std::sync::Arc;

use vulntriage_core::config::VulntriageConfig;
use vulntriage_store::DatasetStore;

use crate::error::CliError;

/// Open the dataset store described by the configuration.
///
/// Persistent mode loads/creates the snapshot file under `data_dir`;
/// otherwise an in-memory store is used (useful for dry runs).
pub(crate) async fn open_store(config: &VulntriageConfig) -> Result<Arc<DatasetStore>, CliError> {
    let store = if config.store.persistent {
        let path = config.store.snapshot_path(&config.general.data_dir);
        DatasetStore::open(path).await?
    } else {
        DatasetStore::in_memory()
    };
    Ok(Arc::new(store))
}
