//! # Collaborator Traits
//!
//! Narrow interfaces to everything the lifecycle controller consumes but
//! does not own: game logic, the entity world, the pak/asset layer, demo
//! recording, spawn-time capabilities, and the configuration-variable store.

use citadel_shared::entity::EntityState;

/// Game-logic collaborator: spawning entities, advancing frames, and
/// accepting or denying client connections.
pub trait GameLogic {
    /// Loads and spawns all entities for a freshly loaded map.
    fn init(&mut self, level_time: i64);

    /// Shuts the running game down; safe to call when nothing is running.
    fn shutdown(&mut self);

    /// Advances game logic one tick to `level_time`.
    fn run_frame(&mut self, level_time: i64);

    /// Asks game logic to accept the client in `slot`.
    ///
    /// `first_time` is false when the controller replays the call during a
    /// map spawn (a reconnect). `Err` carries the denial reason; the
    /// controller drops exactly that client and continues.
    fn client_connect(&mut self, slot: usize, first_time: bool, is_bot: bool)
        -> Result<(), String>;

    /// Notifies game logic that the client in `slot` has entered the world.
    fn client_begin(&mut self, slot: usize);

    /// Notifies game logic that the client in `slot` is going away.
    fn client_disconnect(&mut self, slot: usize);
}

/// Entity-world collaborator: the linked-entity table the baseline builder
/// snapshots, plus collision/world teardown.
pub trait WorldAccess {
    /// Clears collision and physics interaction links for a new map.
    fn clear(&mut self);

    /// Number of entity slots currently in use by the level.
    fn entity_count(&self) -> usize;

    /// Whether the entity in `number` is linked into the world.
    fn is_linked(&self, number: usize) -> bool;

    /// Copy of the entity's public state. Out-of-range numbers return the
    /// default state.
    fn state(&self, number: usize) -> EntityState;

    /// Writes the canonical entity number into the live entity.
    fn set_number(&mut self, number: usize);
}

/// Outcome of an asset-layer restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartMode {
    /// Restart finished synchronously; the spawn sequence continues inline.
    Completed,
    /// Persistent storage must shut down and start back up asynchronously.
    /// The spawn sequence parks until the completion callback fires.
    Deferred,
}

/// Pak/asset-layer collaborator: checksummed asset references, pure-mode
/// lists, and map loading.
pub trait AssetStore {
    /// Restarts the asset layer with a fresh checksum seed.
    fn restart(&mut self, checksum_feed: u32) -> RestartMode;

    /// Completes a [`RestartMode::Deferred`] restart. Called by the
    /// controller when the external completion callback fires.
    fn finish_restart(&mut self);

    /// Forgets which paks have been referenced so far.
    fn clear_references(&mut self);

    /// Marks an asset referenced even if nothing has opened it.
    fn touch(&mut self, path: &str);

    /// Whether an exclusion filter is masking parts of the reference list.
    fn exclude_filter_active(&self) -> bool;

    /// Space-separated names of referenced paks.
    fn referenced_names(&self) -> String;

    /// Space-separated checksums of referenced paks.
    fn referenced_checksums(&self) -> String;

    /// Space-separated checksums of every loaded pak, plus an overflow flag
    /// when the list did not fit the asset layer's own buffer.
    fn loaded_checksums(&self) -> (String, bool);

    /// Loads the named map and returns its checksum.
    fn load_map(&mut self, name: &str) -> Result<u32, String>;
}

/// State of the server-side demo subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DemoState {
    /// No demo activity.
    #[default]
    None,
    /// Recording; configstring and userinfo changes are written through.
    Recording,
    /// Playing a demo back.
    Playback,
}

/// Demo-recording collaborator. Serialization is out of scope; the
/// controller only reports events and start/stop points.
pub trait DemoRecorder {
    /// Current demo state.
    fn state(&self) -> DemoState;

    /// Records a configstring change.
    fn record_configstring(&mut self, index: usize, value: &str);

    /// Records a userinfo change for a client slot.
    fn record_userinfo(&mut self, slot: usize, value: &str);

    /// Stops any per-client recording for `slot`.
    fn stop_client(&mut self, slot: usize);

    /// Stops every recording and playback.
    fn stop_all(&mut self);

    /// Starts the automatic post-spawn recording.
    fn auto_record(&mut self);
}

/// Spawn-time capability set.
///
/// Optional feature variants (multiview recording, payment gating, LAN
/// multicast announcement) hook the spawn sequence here, so the controller
/// calls one uniform interface regardless of which variants are present.
pub trait SpawnObserver {
    /// Called after the spawn guard is taken, before teardown.
    fn on_spawn_begin(&mut self, map: &str) {
        let _ = map;
    }

    /// Called after the level reaches GAME state.
    fn on_spawn_end(&mut self, map: &str) {
        let _ = map;
    }

    /// Liveness notification for master-server style trackers.
    fn heartbeat(&mut self) {}

    /// Human-readable process status line.
    fn set_status(&mut self, status: &str) {
        let _ = status;
    }
}

/// Publication class of a variable, controlling which info string carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarClass {
    /// Published in the serverinfo configstring (index `CS_SERVERINFO`).
    ServerInfo,
    /// Published in the systeminfo configstring (index `CS_SYSTEMINFO`).
    SystemInfo,
}

/// Configuration-variable collaborator, consumed only through get/set/
/// describe and the info-string projections.
pub trait VarStore {
    /// Registers a variable with a default value and publication class.
    /// Re-registering keeps any existing value.
    fn register(&mut self, key: &str, default: &str, class: Option<VarClass>);

    /// Current value, or empty for unset keys.
    fn get(&self, key: &str) -> String;

    /// Sets a value, registering the key if needed.
    fn set(&mut self, key: &str, value: &str);

    /// Attaches a human-readable description to a variable.
    fn describe(&mut self, key: &str, description: &str);

    /// Builds the info string of every variable in `class`, bounded by
    /// `max_len` bytes. The flag reports truncation.
    fn info_string(&self, class: VarClass, max_len: usize) -> (String, bool);
}
