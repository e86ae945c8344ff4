mod auctioneer_build;
mod config_load;
mod observability;
mod registry_load;

pub use auctioneer_build::AuctioneerBuildTask;
pub use config_load::ConfigLoadTask;
pub use observability::ConfigureObservabilityTask;
pub use registry_load::RegistryLoadTask;
