//! aeroapi - A strict JSON:API request layer
//!
//! Requests flow through a fixed pipeline ([`controller::ApiController`])
//! that validates and parses them, builds a typed query, runs it against
//! the resource type's [`adapter::Adapter`] and renders a JSON:API
//! document. [`http`] binds the pipeline to axum.

pub mod adapter;
pub mod cli;
pub mod config;
pub mod controller;
pub mod http;
pub mod registry;
pub mod steps;
pub mod types;

pub use controller::{query_transform, ApiController, ApiOptions, QueryTransform};
pub use registry::{ResourceTypeRegistry, TypeDescription};
