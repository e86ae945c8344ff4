use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::shutdown::tasks::ObservabilityShutdownTask;
use crate::app::span::WrappedPipelineTask;
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use anyhow::{Error, anyhow};
use tracing::info_span;

/// Builds the shutdown pipeline, which takes the resulting `StartupContext`
/// which is responsible for attaching anything which may need shutdown
pub fn build_shutdown_pipeline() -> Result<Pipeline<StartupContext, Error>, Error> {
    let shutdown_pipeline = PipelineBuilder::new()
        .with_blocking(Box::new(ObservabilityShutdownTask))
        .build()
        .ok_or_else(|| anyhow!("Shutdown pipeline should have tasks!"))?;

    let observed_pipeline =
        WrappedPipelineTask::new(shutdown_pipeline, |_: &StartupContext| {
            info_span!("shutdown_pipeline")
        });

    PipelineBuilder::new()
        .with_async(Box::new(observed_pipeline))
        .build()
        .ok_or_else(|| anyhow!("Shutdown pipeline should have tasks!"))
}
