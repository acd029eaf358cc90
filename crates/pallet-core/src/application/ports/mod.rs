//! Application ports (traits) for external dependencies.
//!
//! Ports define what the lifecycle needs from the outside world. Adapters
//! in `pallet-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `CacheLayout`: Where export and package roots live
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (The CLI drives `LifecycleController` directly)

pub mod output;

pub use output::{CacheLayout, Filesystem};

#[cfg(test)]
pub use output::{MockCacheLayout, MockFilesystem};
