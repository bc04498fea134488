pub mod approval;
pub mod client;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod http;
pub mod model;
pub mod normalize;
pub mod routes;
pub mod session;
pub mod sheets;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::sheets::{HttpSheetBackend, MemorySheets, SheetBackend, SheetClient};

/// Picks the sheet transport: the configured proxy scripts, or an empty
/// in-process store for local work without a spreadsheet.
pub fn build_sheet_client(config: &Config, in_memory: bool) -> Result<SheetClient> {
    let backend: Arc<dyn SheetBackend> = if in_memory {
        tracing::warn!("Using in-memory sheets; nothing will be persisted");
        Arc::new(MemorySheets::new())
    } else {
        Arc::new(HttpSheetBackend::new(config.upstream.clone())?)
    };
    Ok(SheetClient::new(backend))
}
