mod observability;

pub use observability::ObservabilityShutdownTask;
