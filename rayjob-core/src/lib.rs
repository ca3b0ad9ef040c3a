//! RayJob Core
//!
//! Core types shared by the RayJob tracker services.
//!
//! This crate contains:
//! - Domain types: the persisted job record and status classification
//! - DTOs: the KubeRay wire format consumed by the poller
//! - Sanitizer: turns raw Ray dashboard log payloads into displayable text

pub mod domain;
pub mod dto;
pub mod sanitize;
