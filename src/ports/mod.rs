//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the domain layer and infrastructure.
//! Following hexagonal architecture, these traits are owned by the domain and
//! implemented by adapters in the infrastructure layer.

pub mod agent;
pub mod observer;
pub mod renderer;
pub mod repository;

pub use agent::Agent;
pub use observer::Observer;
pub use renderer::Renderer;
pub use repository::AgentRepository;
