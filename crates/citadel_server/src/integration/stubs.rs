//! # In-Memory Collaborators
//!
//! Simple implementations of the integration traits, used by the standalone
//! binary, the integration tests, and the bench. Fields are public so tests
//! can assert on recorded calls directly.

use std::collections::BTreeMap;

use citadel_shared::entity::EntityState;

use crate::info;
use crate::integration::{
    AssetStore, DemoRecorder, DemoState, GameLogic, RestartMode, SpawnObserver, VarClass, VarStore,
    WorldAccess,
};

/// Game logic that records every call and denies configured slots.
#[derive(Debug, Default)]
pub struct StubGame {
    /// Whether the game is currently initialized.
    pub running: bool,
    /// Recorded `client_connect` calls as `(slot, first_time, is_bot)`.
    pub connects: Vec<(usize, bool, bool)>,
    /// Recorded `client_begin` calls.
    pub begins: Vec<usize>,
    /// Recorded `client_disconnect` calls.
    pub disconnects: Vec<usize>,
    /// Number of frames run.
    pub frames: u32,
    /// Level time of the most recent frame.
    pub last_frame_time: i64,
    /// Slots whose connection attempts are denied.
    pub deny_slots: Vec<usize>,
    /// Denial reason returned for denied slots.
    pub deny_reason: String,
}

impl StubGame {
    /// Creates a stub that accepts every connection.
    #[must_use]
    pub fn new() -> Self {
        Self { deny_reason: "denied".to_owned(), ..Default::default() }
    }
}

impl GameLogic for StubGame {
    fn init(&mut self, _level_time: i64) {
        self.running = true;
    }

    fn shutdown(&mut self) {
        self.running = false;
    }

    fn run_frame(&mut self, level_time: i64) {
        self.frames += 1;
        self.last_frame_time = level_time;
    }

    fn client_connect(
        &mut self,
        slot: usize,
        first_time: bool,
        is_bot: bool,
    ) -> Result<(), String> {
        self.connects.push((slot, first_time, is_bot));
        if self.deny_slots.contains(&slot) {
            return Err(self.deny_reason.clone());
        }
        Ok(())
    }

    fn client_begin(&mut self, slot: usize) {
        self.begins.push(slot);
    }

    fn client_disconnect(&mut self, slot: usize) {
        self.disconnects.push(slot);
    }
}

/// Fixed-slab entity world.
#[derive(Debug)]
pub struct StubWorld {
    /// Entity slots as `(linked, state)`.
    pub entities: Vec<(bool, EntityState)>,
    /// Number of `clear` calls.
    pub clears: u32,
}

impl StubWorld {
    /// Creates a world with `count` unlinked entity slots.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { entities: vec![(false, EntityState::default()); count], clears: 0 }
    }

    /// Links the entity in `number` with the given state.
    pub fn link(&mut self, number: usize, state: EntityState) {
        self.entities[number] = (true, state);
    }
}

impl WorldAccess for StubWorld {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn is_linked(&self, number: usize) -> bool {
        self.entities.get(number).is_some_and(|(linked, _)| *linked)
    }

    fn state(&self, number: usize) -> EntityState {
        self.entities.get(number).map_or_else(EntityState::default, |(_, state)| *state)
    }

    fn set_number(&mut self, number: usize) {
        if let Some((_, state)) = self.entities.get_mut(number) {
            state.number = number as u32;
        }
    }
}

/// Asset layer with canned pak lists and optional deferred restart.
#[derive(Debug, Default)]
pub struct StubAssets {
    /// Known maps and their checksums; absent maps fail to load.
    pub maps: BTreeMap<String, u32>,
    /// Space-separated referenced pak names.
    pub referenced_names: String,
    /// Space-separated referenced pak checksums.
    pub referenced_checksums: String,
    /// Space-separated loaded pak checksums.
    pub loaded: String,
    /// Reports the loaded-checksum list as overflowed.
    pub loaded_overflowed: bool,
    /// Whether `restart` defers to an asynchronous completion.
    pub defer_restart: bool,
    /// Exclusion filter toggle.
    pub exclude_filter: bool,
    /// Checksum feed received by the latest restart.
    pub last_feed: u32,
    /// Paths passed to `touch`, in order.
    pub touched: Vec<String>,
    /// Number of `clear_references` calls.
    pub reference_clears: u32,
    /// True while a deferred restart awaits `finish_restart`.
    pub restart_pending: bool,
}

impl StubAssets {
    /// Creates an asset layer knowing one map.
    #[must_use]
    pub fn with_map(name: &str, checksum: u32) -> Self {
        let mut assets = Self::default();
        assets.maps.insert(name.to_owned(), checksum);
        assets
    }
}

impl AssetStore for StubAssets {
    fn restart(&mut self, checksum_feed: u32) -> RestartMode {
        self.last_feed = checksum_feed;
        if self.defer_restart {
            self.restart_pending = true;
            RestartMode::Deferred
        } else {
            RestartMode::Completed
        }
    }

    fn finish_restart(&mut self) {
        self.restart_pending = false;
    }

    fn clear_references(&mut self) {
        self.reference_clears += 1;
    }

    fn touch(&mut self, path: &str) {
        self.touched.push(path.to_owned());
    }

    fn exclude_filter_active(&self) -> bool {
        self.exclude_filter
    }

    fn referenced_names(&self) -> String {
        self.referenced_names.clone()
    }

    fn referenced_checksums(&self) -> String {
        self.referenced_checksums.clone()
    }

    fn loaded_checksums(&self) -> (String, bool) {
        (self.loaded.clone(), self.loaded_overflowed)
    }

    fn load_map(&mut self, name: &str) -> Result<u32, String> {
        self.maps.get(name).copied().ok_or_else(|| format!("map not found: {name}"))
    }
}

/// Demo recorder that stores every write-through.
#[derive(Debug, Default)]
pub struct StubDemo {
    /// Current demo state.
    pub demo_state: DemoState,
    /// Recorded configstring writes.
    pub configstring_writes: Vec<(usize, String)>,
    /// Recorded userinfo writes.
    pub userinfo_writes: Vec<(usize, String)>,
    /// Slots whose recording was stopped.
    pub stopped_clients: Vec<usize>,
    /// Number of `stop_all` calls.
    pub stop_alls: u32,
    /// Number of auto-record starts.
    pub auto_records: u32,
}

impl DemoRecorder for StubDemo {
    fn state(&self) -> DemoState {
        self.demo_state
    }

    fn record_configstring(&mut self, index: usize, value: &str) {
        self.configstring_writes.push((index, value.to_owned()));
    }

    fn record_userinfo(&mut self, slot: usize, value: &str) {
        self.userinfo_writes.push((slot, value.to_owned()));
    }

    fn stop_client(&mut self, slot: usize) {
        self.stopped_clients.push(slot);
    }

    fn stop_all(&mut self) {
        self.stop_alls += 1;
        self.demo_state = DemoState::None;
    }

    fn auto_record(&mut self) {
        self.auto_records += 1;
        self.demo_state = DemoState::Recording;
    }
}

/// Observer that counts every capability callback.
#[derive(Debug, Default)]
pub struct CountingObserver {
    /// Maps passed to `on_spawn_begin`.
    pub spawn_begins: Vec<String>,
    /// Maps passed to `on_spawn_end`.
    pub spawn_ends: Vec<String>,
    /// Number of heartbeats.
    pub heartbeats: u32,
    /// Status lines, in order.
    pub statuses: Vec<String>,
}

impl SpawnObserver for CountingObserver {
    fn on_spawn_begin(&mut self, map: &str) {
        self.spawn_begins.push(map.to_owned());
    }

    fn on_spawn_end(&mut self, map: &str) {
        self.spawn_ends.push(map.to_owned());
    }

    fn heartbeat(&mut self) {
        self.heartbeats += 1;
    }

    fn set_status(&mut self, status: &str) {
        self.statuses.push(status.to_owned());
    }
}

#[derive(Debug, Default)]
struct VarEntry {
    value: String,
    class: Option<VarClass>,
    description: String,
}

/// In-memory variable store with class-filtered info-string projection.
#[derive(Debug, Default)]
pub struct MemoryVarStore {
    vars: BTreeMap<String, VarEntry>,
}

impl MemoryVarStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the description attached to a variable, if any.
    #[must_use]
    pub fn description(&self, key: &str) -> String {
        self.vars.get(key).map(|entry| entry.description.clone()).unwrap_or_default()
    }
}

impl VarStore for MemoryVarStore {
    fn register(&mut self, key: &str, default: &str, class: Option<VarClass>) {
        let entry = self.vars.entry(key.to_owned()).or_default();
        if entry.value.is_empty() {
            entry.value = default.to_owned();
        }
        entry.class = class;
    }

    fn get(&self, key: &str) -> String {
        self.vars.get(key).map(|entry| entry.value.clone()).unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.entry(key.to_owned()).or_default().value = value.to_owned();
    }

    fn describe(&mut self, key: &str, description: &str) {
        self.vars.entry(key.to_owned()).or_default().description = description.to_owned();
    }

    fn info_string(&self, class: VarClass, max_len: usize) -> (String, bool) {
        let pairs = self
            .vars
            .iter()
            .filter(|(_, entry)| entry.class == Some(class))
            .map(|(key, entry)| (key.as_str(), entry.value.as_str()));
        info::build_info_string(pairs, max_len)
    }
}
