use crate::app::lifecycle::context::StartupContext;
use crate::core::observability;
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};
use tracing::info;

pub struct ConfigureObservabilityTask;

impl BlockingTask<StartupContext, Error> for ConfigureObservabilityTask {
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let config = context
            .config
            .get()
            .ok_or_else(|| anyhow!("Config not loaded before observability initialization"))?;

        let guard = observability::init(&config.logging)?;
        let writers = guard.writers();

        let mut slot = context.observability.lock();
        if slot.is_some() {
            return Err(anyhow!("Observability context already initialized"));
        }
        *slot = Some(guard);

        info!("Hello world! Observability configured with {} sinks", writers);

        Ok(())
    }
}
