//! Application layer with dependency injection container.
//!
//! The container owns infrastructure dependencies and provides factory
//! methods for domain objects, following hexagonal architecture principles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │   App (DI container) + GameConfig    │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                      │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - MsgPackRepository                 │   │
//! │  │  - InMemoryRepository (testing)      │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - AgentRepository trait             │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                   │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic                        │   │
//! │  │  - TdAgent / TrackingOpponent        │   │
//! │  │  - SinglePaddleEnv / DualPaddleEnv   │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use pong_rl::app::{App, GameConfig};
//! use pong_rl::environment::Side;
//!
//! let app = App::for_testing().with_default_seed(42).build();
//! let config = GameConfig::default();
//! let env = app.single_environment(&config)?;
//! let agent = app.build_controller(&config.left, Side::Left, &config.physics, None)?;
//! # Ok::<(), pong_rl::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::{AgentSpec, ControllerSpec, GameConfig, Mode, OutputConfig};
pub use container::{App, AppBuilder, Controller};
