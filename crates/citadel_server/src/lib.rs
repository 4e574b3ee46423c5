//! # CITADEL Server
//!
//! Authoritative level lifecycle and configstring replication engine.
//!
//! ```text
//!                        ┌─────────────────────────┐
//!                        │   Server (spawn.rs)     │
//!                        │  level lifecycle state  │
//!                        │        machine          │
//!                        └───┬───────┬─────────┬───┘
//!             configstrings  │       │ clients │        collaborators
//!        ┌───────────────────▼──┐ ┌──▼──────────────┐ ┌─────────────────┐
//!        │ ConfigStringStore    │ │ ClientSlot[]    │ │ GameLogic       │
//!        │ set / get / flush    │ │ FREE..ACTIVE    │ │ WorldAccess     │
//!        └──────────┬───────────┘ │ dirty bits      │ │ AssetStore      │
//!                   │ chunking    │ reliable queue  │ │ DemoRecorder    │
//!        ┌──────────▼───────────┐ └─────────────────┘ │ SpawnObserver   │
//!        │ transmit: cs / bcs*  │                     │ VarStore        │
//!        └──────────────────────┘                     └─────────────────┘
//! ```
//!
//! The server is the single source of truth. Shared, slowly-changing state
//! lives in an index-addressed configstring table replicated to every
//! client over an ordered reliable channel; per-client dirty bits guarantee
//! each change is delivered exactly once, no matter how far behind a client
//! is in its connection handshake. Map changes run through one spawn
//! sequence that carries connected clients across without a disconnect.
//!
//! Everything the engine does not own (game rules, the entity world, pak
//! storage, demo recording, configuration variables) sits behind the traits
//! in [`integration`].

pub mod baseline;
pub mod client;
pub mod configstring;
pub mod context;
pub mod error;
pub mod info;
pub mod integration;
pub mod settings;
pub mod spawn;
pub mod transmit;

pub use client::{ClientSlot, ClientState, RemoteKind};
pub use configstring::ConfigStringStore;
pub use context::{LevelContext, LevelState, ServerContext, SpawnPhase};
pub use error::{ServerError, ServerResult};
pub use settings::ServerSettings;
pub use spawn::{Server, SpawnFlags};
