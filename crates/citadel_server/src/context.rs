//! # Level & Server-Static Contexts
//!
//! The two explicit context objects every component operation receives: the
//! per-map [`LevelContext`], torn down and rebuilt by each spawn, and the
//! persistent [`ServerContext`], which survives map changes. No ambient
//! globals exist; the non-reentrancy guard is a field, not an assumption.

use citadel_shared::constants::{MAX_ENTITIES, SNAPSHOT_BACKUP};

use crate::baseline::EntityBaseline;
use crate::client::ClientSlot;
use crate::configstring::ConfigStringStore;
use crate::integration::DemoState;

/// Coarse state of the current level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LevelState {
    /// No map loaded.
    #[default]
    Dead,
    /// Spawning; configstring writes do not propagate yet.
    Loading,
    /// Serving; every configstring change replicates reliably.
    Game,
}

/// Phase of the spawn-sequence guard.
///
/// An explicit three-state machine rather than a boolean so the async
/// storage-restart gap composes: the guard is held across the gap and a
/// nested spawn request is a defined no-op in either non-idle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpawnPhase {
    /// No spawn in progress.
    #[default]
    Idle,
    /// The synchronous spawn sequence is running.
    Spawning,
    /// Parked between the storage shutdown and startup continuations.
    AwaitingAsyncResume,
}

/// Per-map state. One exists per level; a spawn replaces it wholesale.
#[derive(Debug)]
pub struct LevelContext {
    /// The configstring table.
    pub configstrings: ConfigStringStore,
    /// Per-entity reference snapshots for delta compression; rebuilt
    /// wholesale at spawn, never partially invalidated.
    pub baselines: Vec<EntityBaseline>,
    /// Monotonic level clock in milliseconds. Zero means "no level".
    pub time: i64,
    /// Identifier of this level instance; differs on every spawn.
    pub server_id: i64,
    /// Server id at the most recent in-place restart.
    pub restarted_server_id: i64,
    /// Seed handed to the asset layer for checksum challenges.
    pub checksum_feed: u32,
    /// Coarse state tag.
    pub state: LevelState,
    /// True while an in-place map restart is replaying; configstring
    /// propagation stays enabled even though `state` left GAME.
    pub restarting: bool,
    /// Level time at which a pending restart was requested, zero if none.
    pub restart_time: i64,
    /// Mirror of the demo subsystem state, checked on every configstring
    /// write.
    pub demo_state: DemoState,
}

impl LevelContext {
    /// Creates an empty level: every configstring an owned empty string,
    /// every baseline unused.
    #[must_use]
    pub fn new() -> Self {
        Self {
            configstrings: ConfigStringStore::new(),
            baselines: vec![EntityBaseline::default(); MAX_ENTITIES],
            time: 0,
            server_id: 0,
            restarted_server_id: 0,
            checksum_feed: 0,
            state: LevelState::Dead,
            restarting: false,
            restart_time: 0,
            demo_state: DemoState::None,
        }
    }
}

impl Default for LevelContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-static state, persistent across map loads.
#[derive(Debug, Default)]
pub struct ServerContext {
    /// True once low-level startup has run.
    pub initialized: bool,
    /// The client slot table; length is the live capacity.
    pub clients: Vec<ClientSlot>,
    /// Process-wide server clock in milliseconds; never resets.
    pub time: i64,
    /// Entity-state slots reserved in the snapshot storage pool.
    pub snapshot_pool_size: usize,
    /// Toggled on every spawn so clients can detect a discontinuity.
    pub snap_flag_server_bit: u32,
    /// The spawn-in-progress guard.
    pub spawn_phase: SpawnPhase,
}

impl ServerContext {
    /// Creates uninitialized server-static state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the snapshot storage pool for the current capacity.
    pub fn set_snapshot_params(&mut self) {
        self.snapshot_pool_size = SNAPSHOT_BACKUP * MAX_ENTITIES;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_shared::constants::MAX_CONFIGSTRINGS;

    #[test]
    fn test_new_level_is_empty() {
        let level = LevelContext::new();
        assert_eq!(level.state, LevelState::Dead);
        assert_eq!(level.time, 0);
        assert_eq!(level.baselines.len(), MAX_ENTITIES);
        assert!(level.baselines.iter().all(|b| !b.used));
        for index in 0..MAX_CONFIGSTRINGS {
            assert_eq!(level.configstrings.get(index).unwrap(), "");
        }
    }

    #[test]
    fn test_spawn_phase_defaults_idle() {
        let server = ServerContext::new();
        assert_eq!(server.spawn_phase, SpawnPhase::Idle);
        assert!(!server.initialized);
    }
}
