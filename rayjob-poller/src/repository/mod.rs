//! Repository layer
//!
//! Repositories are stateless adapters over the remote APIs the poller
//! consumes. They expose small, focused interfaces without business logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod jobs;

// Re-export traits
pub use jobs::JobSource;

// Re-export implementations
pub use jobs::KubeRayJobSource;
