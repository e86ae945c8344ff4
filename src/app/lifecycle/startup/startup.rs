use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::startup::tasks::{
    AuctioneerBuildTask, ConfigLoadTask, ConfigureObservabilityTask, RegistryLoadTask,
};
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use anyhow::{Error, anyhow};
use std::path::PathBuf;

/// Builds the startup pipeline, which loads the config, configures
/// logging and then assembles everything needed to run auctions
pub fn build_start_pipeline(cfg_path: PathBuf) -> Result<Pipeline<StartupContext, Error>, Error> {
    PipelineBuilder::new()
        .with_blocking(Box::new(ConfigLoadTask::new(cfg_path)))
        .with_blocking(Box::new(ConfigureObservabilityTask))
        .with_blocking(Box::new(RegistryLoadTask))
        .with_blocking(Box::new(AuctioneerBuildTask))
        .build()
        .ok_or_else(|| anyhow!("Startup pipeline should have tasks!"))
}
