use async_trait::async_trait;

/// A synchronous unit of work executed against a shared pipeline context
pub trait BlockingTask<C, E>: Send + Sync {
    fn run(&self, context: &C) -> Result<(), E>;
}

/// An async unit of work executed against a shared pipeline context
#[async_trait]
pub trait AsyncTask<C: Send + Sync, E>: Send + Sync {
    async fn run(&self, context: &C) -> Result<(), E>;
}

enum Stage<C: Send + Sync, E> {
    Blocking(Box<dyn BlockingTask<C, E>>),
    Async(Box<dyn AsyncTask<C, E>>),
}

/// An ordered list of tasks run one after another over the same context.
///
/// # Behavior
/// The first task to return an error aborts the remainder of the
/// pipeline and that error is handed back to the caller untouched
pub struct Pipeline<C: Send + Sync, E> {
    stages: Vec<Stage<C, E>>,
}

impl<C: Send + Sync, E: Send> Pipeline<C, E> {
    pub async fn run(&self, context: &C) -> Result<(), E> {
        for stage in &self.stages {
            match stage {
                Stage::Blocking(task) => task.run(context)?,
                Stage::Async(task) => task.run(context).await?,
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

pub struct PipelineBuilder<C: Send + Sync, E> {
    stages: Vec<Stage<C, E>>,
}

impl<C: Send + Sync, E: Send> PipelineBuilder<C, E> {
    pub fn new() -> Self {
        PipelineBuilder { stages: Vec::new() }
    }

    pub fn with_blocking(mut self, task: Box<dyn BlockingTask<C, E>>) -> Self {
        self.add_blocking(task);
        self
    }

    pub fn with_async(mut self, task: Box<dyn AsyncTask<C, E>>) -> Self {
        self.add_async(task);
        self
    }

    pub fn add_blocking(&mut self, task: Box<dyn BlockingTask<C, E>>) {
        self.stages.push(Stage::Blocking(task));
    }

    pub fn add_async(&mut self, task: Box<dyn AsyncTask<C, E>>) {
        self.stages.push(Stage::Async(task));
    }

    /// Returns `None` if no tasks were added
    pub fn build(self) -> Option<Pipeline<C, E>> {
        if self.stages.is_empty() {
            return None;
        }

        Some(Pipeline {
            stages: self.stages,
        })
    }
}

impl<C: Send + Sync, E: Send> Default for PipelineBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Error, bail};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct TraceContext {
        visited: Mutex<Vec<&'static str>>,
    }

    struct Record(&'static str);

    impl BlockingTask<TraceContext, Error> for Record {
        fn run(&self, context: &TraceContext) -> Result<(), Error> {
            context.visited.lock().push(self.0);
            Ok(())
        }
    }

    struct AsyncRecord(&'static str);

    #[async_trait]
    impl AsyncTask<TraceContext, Error> for AsyncRecord {
        async fn run(&self, context: &TraceContext) -> Result<(), Error> {
            context.visited.lock().push(self.0);
            Ok(())
        }
    }

    struct Fail;

    impl BlockingTask<TraceContext, Error> for Fail {
        fn run(&self, _context: &TraceContext) -> Result<(), Error> {
            bail!("stop here")
        }
    }

    #[test]
    fn test_empty_builder_builds_nothing() {
        assert!(PipelineBuilder::<TraceContext, Error>::new().build().is_none());
    }

    #[tokio::test]
    async fn test_tasks_run_in_order() {
        let pipeline = PipelineBuilder::new()
            .with_blocking(Box::new(Record("one")))
            .with_async(Box::new(AsyncRecord("two")))
            .with_blocking(Box::new(Record("three")))
            .build()
            .unwrap();

        let context = TraceContext::default();
        pipeline.run(&context).await.unwrap();

        assert_eq!(pipeline.len(), 3);
        assert_eq!(*context.visited.lock(), vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_error_aborts_remaining_tasks() {
        let pipeline = PipelineBuilder::new()
            .with_blocking(Box::new(Record("one")))
            .with_blocking(Box::new(Fail))
            .with_async(Box::new(AsyncRecord("never")))
            .build()
            .unwrap();

        let context = TraceContext::default();
        let err = pipeline.run(&context).await.unwrap_err();

        assert_eq!(err.to_string(), "stop here");
        assert_eq!(*context.visited.lock(), vec!["one"]);
    }
}
