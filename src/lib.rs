pub mod cache;
pub mod error;
pub mod exec;
pub mod model;
pub mod remote;
pub mod rewrite;
pub mod stats;
pub mod store;
pub mod workspace;
