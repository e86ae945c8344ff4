use crate::app::config::PrexConfig;
use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::BlockingTask;
use anyhow::{Context, Error, anyhow};
use std::path::PathBuf;

pub struct ConfigLoadTask {
    path: PathBuf,
}

impl ConfigLoadTask {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BlockingTask<StartupContext, Error> for ConfigLoadTask {
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let config = PrexConfig::load(&self.path)
            .with_context(|| format!("Failed to load config from {}", self.path.display()))?;

        config.logging.validate()?;

        // Subscriber is not installed yet
        println!("Config loaded from {}", self.path.display());

        context
            .config
            .set(config)
            .map_err(|_| anyhow!("Config already loaded"))
    }
}
