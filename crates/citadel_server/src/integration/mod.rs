//! # Integration Seams
//!
//! The lifecycle controller never talks to game logic, asset storage, demo
//! recording, or the variable store directly. It calls the traits defined
//! here; collaborators implement them.
//!
//! ```text
//! controller calls:        collaborator implements:
//! ┌────────────────┐       ┌────────────────┐
//! │ trait GameLogic│  ←──  │ game module    │
//! │ trait AssetStore│ ←──  │ pak filesystem │
//! │ trait VarStore │  ←──  │ console cvars  │
//! └────────────────┘       └────────────────┘
//! ```
//!
//! [`stubs`] provides in-memory implementations for the standalone binary,
//! the tests, and the bench.

mod traits;

pub mod stubs;

pub use traits::{
    AssetStore, DemoRecorder, DemoState, GameLogic, RestartMode, SpawnObserver, VarClass,
    VarStore, WorldAccess,
};
