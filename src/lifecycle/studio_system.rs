use crate::backend::{HttpBackend, MemoryBackend, StudioContext};
use crate::config::StudioConfig;
use crate::model::NodeId;
use crate::studio::{StudioActor, StudioClient, StudioError};
use crate::tree::CourseTree;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

/// Owns a running studio: the client used to talk to it and the task
/// running its actor.
///
/// # Example
///
/// ```ignore
/// let config = StudioConfig::load()?;
/// let context = StudioSystem::context_for(&config).await?;
/// let system = StudioSystem::start(&config, context).await?;
///
/// let tree = system.client.snapshot().await?;
///
/// system.shutdown().await?;
/// ```
pub struct StudioSystem {
    /// Client for interacting with the studio actor
    pub client: StudioClient,

    /// Task handle of the running actor (used for graceful shutdown)
    handle: JoinHandle<()>,
}

impl StudioSystem {
    /// Picks the backend named by `config`: the REST API when a base URL is
    /// set, otherwise the in-memory demo course.
    pub async fn context_for(config: &StudioConfig) -> Result<StudioContext, StudioError> {
        match &config.api_base_url {
            Some(base_url) => {
                info!(%base_url, "Using HTTP backend");
                let backend = HttpBackend::new(base_url.clone(), config.request_timeout())
                    .map_err(StudioError::Backend)?;
                Ok(StudioContext::from_backend(Arc::new(backend)))
            }
            None => {
                info!(course_id = %config.course_id, "Using in-memory demo backend");
                let backend = MemoryBackend::demo(config.course_id.as_str()).await;
                Ok(StudioContext::from_backend(Arc::new(backend)))
            }
        }
    }

    /// Loads the configured course and starts a studio for it.
    ///
    /// Fails with [`StudioError::Load`] when the course cannot be fetched;
    /// no actor is spawned in that case.
    #[instrument(skip_all, fields(course_id = %config.course_id))]
    pub async fn start(config: &StudioConfig, context: StudioContext) -> Result<Self, StudioError> {
        let course_id = NodeId::new(config.course_id.clone());
        let outline = context.catalog.load_course(&course_id).await?;
        info!(paths = outline.paths.len(), "Course loaded");
        let tree = CourseTree::from_outline(outline);
        Ok(Self::with_tree(tree, context, config.channel_capacity))
    }

    /// Starts a studio for an already-built tree.
    pub fn with_tree(tree: CourseTree, context: StudioContext, capacity: usize) -> Self {
        let (actor, client) = StudioActor::new(capacity, tree);
        let handle = tokio::spawn(actor.run(context));
        Self { client, handle }
    }

    /// Gracefully shuts the studio down.
    ///
    /// Drops the client, which closes the request channel once every other
    /// clone is gone, then waits for the actor task to finish. Reorders
    /// still in flight settle as abandoned.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down studio...");
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!("Studio task failed: {:?}", e);
            return Err(format!("Studio task failed: {:?}", e));
        }

        info!("Studio shutdown complete.");
        Ok(())
    }
}
