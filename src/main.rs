//! # Course Studio demo
//!
//! Loads a course, expands its first path, drags the last path to the top
//! and reports what the backend made of it. Runs against the in-memory demo
//! course unless `STUDIO_API_BASE_URL` (or `api_base_url` in the file named
//! by `STUDIO_CONFIG`) points at a real API.

use course_studio::config::StudioConfig;
use course_studio::lifecycle::{setup_tracing, StudioSystem};
use course_studio::studio::{SelectTarget, SyncStatus};
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = StudioConfig::load().map_err(|e| e.to_string())?;
    let context = StudioSystem::context_for(&config)
        .await
        .map_err(|e| e.to_string())?;
    let system = StudioSystem::start(&config, context)
        .await
        .map_err(|e| e.to_string())?;
    let client = system.client.clone();

    let tree = client.snapshot().await.map_err(|e| e.to_string())?;
    let paths_key = tree.paths_key();
    let paths = tree.ordered_ids(&paths_key).unwrap_or_default();
    info!(course = %tree.course().name, paths = paths.len(), "Course ready");

    // Expand the first path
    if let Some(first) = paths.first().cloned() {
        let span = tracing::info_span!("expansion", path_id = %first);
        async {
            let outcome = client.expand(first.clone()).await.map_err(|e| e.to_string())?;
            let status = outcome.settled().await;
            info!(?status, "Expansion finished");
            client
                .select(SelectTarget::Node(first))
                .await
                .map_err(|e| e.to_string())
        }
        .instrument(span)
        .await?;
    }

    // Drag the last path onto the first
    if let (Some(first), Some(last)) = (paths.first(), paths.last()) {
        let span = tracing::info_span!("reorder");
        let status = async {
            let outcome = client
                .reorder_paths(tree.course().id.clone(), last.clone(), first.clone())
                .await
                .map_err(|e| e.to_string())?;
            Ok::<_, String>(outcome.settled().await)
        }
        .instrument(span)
        .await?;

        match status {
            Some(SyncStatus::Committed) => info!("Path order saved"),
            Some(other) => warn!(?other, "Path order not saved"),
            None => info!("Nothing to reorder"),
        }
    }

    let tree = client.snapshot().await.map_err(|e| e.to_string())?;
    for node in tree.children(&paths_key).unwrap_or_default() {
        info!(id = %node.id(), title = node.title(), index = node.order_index(), "Path");
    }

    for entry in client.errors().await.map_err(|e| e.to_string())? {
        error!(message = %entry.message, "Studio error");
    }

    drop(client);
    system.shutdown().await
}
