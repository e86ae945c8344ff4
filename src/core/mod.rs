pub mod adapters;
pub mod adserver;
pub mod error;
pub mod managers;
pub mod models;
pub mod observability;
pub mod pipeline;
