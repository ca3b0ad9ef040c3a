//! Data Transfer Objects for the KubeRay API
//!
//! Lightweight representations of the custom resources served by the
//! Kubernetes API server. Every field is optional because the operator fills
//! the status in gradually as a job moves through its lifecycle.

pub mod rayjob;
