//! # Level Lifecycle Controller
//!
//! The spawn sequence that takes a server from "nothing loaded" (or "old
//! map running") to "new map serving clients", without disconnecting anyone
//! who survived the change.
//!
//! ```text
//! spawn(map)
//!    │ guard: one spawn at a time
//!    ├── teardown game + world
//!    ├── (re)size client slots, preserving >= CONNECTED
//!    ├── fresh level container, clock policy applied
//!    ├── checksum feed + asset restart ──── deferred? ──┐
//!    ├── load map, settle frames                        │ storage
//!    ├── baselines                                      │ restart
//!    ├── reconnect pass (per-client failure isolation)  │ callback
//!    ├── publish systeminfo/serverinfo                  │
//!    └── GAME state, heartbeat, auto-demo  ◀── resume ──┘
//! ```
//!
//! ## Design
//!
//! The controller is generic over its collaborators and owns them as plain
//! fields, so tests reach through and assert on stub state directly. All
//! mutation happens on one logical thread; the [`SpawnPhase`] guard is what
//! makes the asynchronous storage-restart gap safe, not a lock. The
//! continuation across that gap is an explicit queued task plus a saved
//! `PendingSpawn`, never a suspended stack frame.

use crossbeam_channel::{bounded, Receiver, Sender};
use rand::Rng;
use tracing::{debug, info, warn};

use citadel_shared::constants::{
    BIG_INFO_STRING, COMMAND_OVERHEAD, CS_SERVERINFO, CS_SYSTEMINFO, FRAME_STEP_MS,
    MAX_GAMESTATE_CHARS, MAX_INFO_STRING, REQUIRED_ASSETS, SETTLE_FRAMES, SNAPSHOT_BACKDATE_MS,
    SNAPSHOT_FLAG_SERVER_COUNT,
};
use citadel_shared::entity::EntityState;
use citadel_shared::protocol::ServerCommand;

use crate::baseline;
use crate::client::{ClientSlot, ClientState, RemoteKind};
use crate::configstring;
use crate::context::{LevelContext, LevelState, ServerContext, SpawnPhase};
use crate::error::{ServerError, ServerResult};
use crate::info;
use crate::integration::{
    AssetStore, DemoRecorder, DemoState, GameLogic, RestartMode, SpawnObserver, VarClass, VarStore,
    WorldAccess,
};
use crate::settings::ServerSettings;
use crate::transmit;

/// Caller options for one spawn.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpawnFlags {
    /// Drop automated participants instead of reconnecting them.
    pub kill_bots: bool,
}

/// Work queued for execution at the top of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameTask {
    /// Continue a spawn parked on a deferred storage restart.
    ResumeSpawn,
}

/// Map name and flags saved across the deferred-restart gap.
#[derive(Clone, Debug)]
struct PendingSpawn {
    map: String,
    flags: SpawnFlags,
}

/// The server engine: both contexts, the startup settings, and every
/// collaborator, driven by [`Server::spawn`] and [`Server::run_frame`].
pub struct Server<G, W, A, D, O, V>
where
    G: GameLogic,
    W: WorldAccess,
    A: AssetStore,
    D: DemoRecorder,
    O: SpawnObserver,
    V: VarStore,
{
    /// Startup settings; never mutated after construction.
    pub settings: ServerSettings,
    /// Game logic collaborator.
    pub game: G,
    /// Entity world collaborator.
    pub world: W,
    /// Pak/asset layer collaborator.
    pub assets: A,
    /// Demo subsystem collaborator.
    pub demo: D,
    /// Spawn-time capability set.
    pub observer: O,
    /// Configuration-variable store.
    pub vars: V,
    /// Per-map state.
    pub level: LevelContext,
    /// Server-static state.
    pub ctx: ServerContext,
    /// Live client capacity after bounding; the slot table length.
    max_clients: usize,
    /// Pure-mode enforcement for the current level; starts from settings
    /// and degrades on budget overflow.
    pure_active: bool,
    tasks_tx: Sender<FrameTask>,
    tasks_rx: Receiver<FrameTask>,
    pending: Option<PendingSpawn>,
}

impl<G, W, A, D, O, V> Server<G, W, A, D, O, V>
where
    G: GameLogic,
    W: WorldAccess,
    A: AssetStore,
    D: DemoRecorder,
    O: SpawnObserver,
    V: VarStore,
{
    /// Creates an engine around the given collaborators and registers the
    /// externally visible variables.
    pub fn new(
        settings: ServerSettings,
        game: G,
        world: W,
        assets: A,
        demo: D,
        observer: O,
        mut vars: V,
    ) -> Self {
        vars.register("hostname", &settings.hostname, Some(VarClass::ServerInfo));
        vars.register("mapname", "nomap", Some(VarClass::ServerInfo));
        vars.register("max_clients", &settings.max_clients.to_string(), Some(VarClass::ServerInfo));
        vars.register("pure", if settings.pure { "1" } else { "0" }, Some(VarClass::SystemInfo));
        vars.register("server_id", "0", Some(VarClass::SystemInfo));
        vars.register("pak_checksums", "", Some(VarClass::SystemInfo));
        vars.register("referenced_paks", "", Some(VarClass::SystemInfo));
        vars.register("referenced_pak_names", "", Some(VarClass::SystemInfo));
        vars.register("map_checksum", "", None);
        vars.register("server_running", "0", None);
        vars.describe("hostname", "server name shown in browsers");
        vars.describe("pure", "clients must load exactly the server's paks");
        vars.describe("max_clients", "connection slot capacity");

        let (tasks_tx, tasks_rx) = bounded(16);
        let pure_active = settings.pure;
        Self {
            settings,
            game,
            world,
            assets,
            demo,
            observer,
            vars,
            level: LevelContext::new(),
            ctx: ServerContext::new(),
            max_clients: 0,
            pure_active,
            tasks_tx,
            tasks_rx,
            pending: None,
        }
    }

    /// Live client capacity; zero before the first spawn.
    #[inline]
    #[must_use]
    pub fn max_clients(&self) -> usize {
        self.max_clients
    }

    /// Whether pure-mode enforcement is active for the current level.
    #[inline]
    #[must_use]
    pub fn pure_active(&self) -> bool {
        self.pure_active
    }

    /// One-time initialization of server-static state.
    ///
    /// Fatal if called while already initialized.
    pub fn startup(&mut self) -> ServerResult<()> {
        if self.ctx.initialized {
            return Err(ServerError::AlreadyInitialized);
        }
        self.max_clients = self.bound_max_clients(1);
        self.ctx.clients = vec![ClientSlot::new_free(); self.max_clients];
        self.ctx.set_snapshot_params();
        self.ctx.initialized = true;
        self.vars.set("server_running", "1");
        info!(max_clients = self.max_clients, "server static state initialized");
        Ok(())
    }

    /// Spawns the named map, carrying every client whose state is at least
    /// CONNECTED across the change.
    ///
    /// A spawn requested while one is in progress is a logged no-op. When
    /// the asset layer defers its restart, the sequence parks and resumes
    /// from the frame-task queue after [`Server::storage_restart_complete`].
    pub fn spawn(&mut self, map: &str, flags: SpawnFlags) -> ServerResult<()> {
        if self.ctx.spawn_phase != SpawnPhase::Idle {
            warn!(map, phase = ?self.ctx.spawn_phase, "spawn already in progress, ignoring");
            return Ok(());
        }
        self.ctx.spawn_phase = SpawnPhase::Spawning;
        info!(map, kill_bots = flags.kill_bots, "spawning level");
        self.observer.on_spawn_begin(map);

        self.game.shutdown();
        self.world.clear();

        if self.ctx.initialized {
            self.change_max_clients();
        } else {
            self.startup()?;
        }

        // under the reset policy each surviving client records the clock it
        // left off at, so it can offset its own timers after the change; the
        // value must be taken before the per-level wipe
        for client in &mut self.ctx.clients {
            client.old_server_time = if self.settings.level_time_reset && client.is_connected() {
                self.level.time
            } else {
                0
            };
        }

        self.clear_level();

        // references accumulate from here, so the published pak lists cover
        // exactly what this level loads
        self.assets.clear_references();

        self.level.checksum_feed = rand::thread_rng().gen();
        self.ctx.snap_flag_server_bit ^= SNAPSHOT_FLAG_SERVER_COUNT;

        match self.assets.restart(self.level.checksum_feed) {
            RestartMode::Completed => self.finish_spawn(map.to_owned(), flags),
            RestartMode::Deferred => {
                self.ctx.spawn_phase = SpawnPhase::AwaitingAsyncResume;
                self.pending = Some(PendingSpawn { map: map.to_owned(), flags });
                debug!(map, "spawn parked, waiting for storage restart");
                Ok(())
            }
        }
    }

    /// Replays the current map in place, keeping the loaded level data.
    ///
    /// Cheaper than a full spawn: game logic restarts and clients replay
    /// their connect, but assets, baselines, and the slot table survive.
    /// Configstring propagation stays enabled across the LOADING window so
    /// changes made by the restarting game still reach ACTIVE clients.
    pub fn restart_level(&mut self) -> ServerResult<()> {
        if self.level.state != LevelState::Game {
            warn!(state = ?self.level.state, "restart requested with no level serving, ignoring");
            return Ok(());
        }
        if self.ctx.spawn_phase != SpawnPhase::Idle {
            warn!("restart requested during a spawn, ignoring");
            return Ok(());
        }
        info!(server_id = self.level.server_id, "restarting level in place");
        self.level.restart_time = self.level.time;
        self.level.restarted_server_id = self.level.server_id;
        self.level.server_id = self.ctx.time;
        self.vars.set("server_id", &self.level.server_id.to_string());

        // clients mid-handshake need the restart clock so they don't trip
        // the backwards-time check when they finish loading
        for client in &mut self.ctx.clients {
            if client.state == ClientState::Primed {
                client.old_server_time = self.level.restart_time;
            }
        }

        self.level.state = LevelState::Loading;
        self.level.restarting = true;
        self.game.shutdown();
        self.game.init(self.level.time);
        for _ in 0..SETTLE_FRAMES {
            self.level.time += FRAME_STEP_MS;
            self.game.run_frame(self.level.time);
        }
        self.level.state = LevelState::Game;
        self.level.restarting = false;

        for slot in 0..self.max_clients {
            if !self.ctx.clients[slot].is_connected() {
                continue;
            }
            let is_bot = self.ctx.clients[slot].remote == RemoteKind::Bot;
            match self.game.client_connect(slot, false, is_bot) {
                Err(denied) => {
                    warn!(slot, reason = %denied, "reconnect denied during restart");
                    self.drop_client(slot, &denied)?;
                }
                Ok(()) => {
                    // clients that were already in the world re-enter it;
                    // anyone mid-handshake finishes on their own schedule
                    if self.ctx.clients[slot].state == ClientState::Active {
                        self.game.client_begin(slot);
                    }
                }
            }
        }
        Ok(())
    }

    /// Completion callback for a deferred storage restart; queues the spawn
    /// continuation for the next frame.
    pub fn storage_restart_complete(&mut self) {
        self.assets.finish_restart();
        if self.tasks_tx.try_send(FrameTask::ResumeSpawn).is_err() {
            warn!("frame task queue full, dropping spawn resume");
        }
    }

    /// Second half of the spawn sequence, from map load to GAME state.
    fn finish_spawn(&mut self, map: String, flags: SpawnFlags) -> ServerResult<()> {
        let checksum = match self.assets.load_map(&map) {
            Ok(checksum) => checksum,
            Err(reason) => {
                self.ctx.spawn_phase = SpawnPhase::Idle;
                return Err(ServerError::MapLoad { map, reason });
            }
        };
        self.vars.set("mapname", &map);
        self.vars.set("map_checksum", &checksum.to_string());

        // server_id must differ between levels so clients can tell a stale
        // gamestate from a current one
        self.level.server_id = self.ctx.time;
        self.level.restarted_server_id = self.level.server_id;
        self.vars.set("server_id", &self.level.server_id.to_string());
        self.level.state = LevelState::Loading;

        self.game.init(self.level.time);

        // let game logic settle before anyone is told the map is ready
        for _ in 0..SETTLE_FRAMES {
            self.level.time += FRAME_STEP_MS;
            self.game.run_frame(self.level.time);
        }

        baseline::build_baselines(&mut self.world, &mut self.level);

        for slot in 0..self.max_clients {
            if !self.ctx.clients[slot].is_connected() {
                continue;
            }
            let is_bot = self.ctx.clients[slot].remote == RemoteKind::Bot;
            if is_bot && flags.kill_bots {
                self.drop_client(slot, "was kicked")?;
                continue;
            }
            match self.game.client_connect(slot, false, is_bot) {
                Err(denied) => {
                    warn!(slot, reason = %denied, "reconnect denied");
                    self.drop_client(slot, &denied)?;
                }
                Ok(()) if is_bot => {
                    let client = &mut self.ctx.clients[slot];
                    client.state = ClientState::Active;
                    client.entity = slot;
                    // back-date so a snapshot goes out on the very next tick
                    client.last_snapshot_time = self.ctx.time - SNAPSHOT_BACKDATE_MS;
                    self.world.set_number(slot);
                    self.game.client_begin(slot);
                }
                Ok(()) => {
                    // the next packet from this client triggers a fresh
                    // gamestate send
                    self.ctx.clients[slot].state = ClientState::Connected;
                }
            }
        }

        // one more tick so all players are visible to one another in the
        // first outgoing snapshot
        self.level.time += FRAME_STEP_MS;
        self.game.run_frame(self.level.time);

        // clients need these marked referenced even when nothing opened
        // them, or the pure check rejects the download list
        for asset in REQUIRED_ASSETS {
            self.assets.touch(asset);
        }
        let mut referenced_names = self.assets.referenced_names();
        if self.assets.exclude_filter_active() {
            // the exclusion filter may mask the assets just touched; touch
            // them again and rebuild the list
            for asset in REQUIRED_ASSETS {
                self.assets.touch(asset);
            }
            referenced_names = self.assets.referenced_names();
        }
        self.vars.set("referenced_pak_names", &referenced_names);
        self.vars.set("referenced_paks", &self.assets.referenced_checksums());

        self.publish_info()?;

        self.level.state = LevelState::Game;
        self.observer.heartbeat();
        if self.settings.auto_demo {
            self.demo.auto_record();
        }
        self.level.demo_state = self.demo.state();
        self.observer.set_status(&format!("serving {map}"));
        self.observer.on_spawn_end(&map);
        self.ctx.spawn_phase = SpawnPhase::Idle;
        info!(map, server_id = self.level.server_id, "level spawned");
        Ok(())
    }

    /// Builds the pure-pak lists and publishes the systeminfo and
    /// serverinfo configstrings.
    ///
    /// Pure enforcement degrades rather than failing the spawn: an empty
    /// loaded-pak list or a list that overflows the systeminfo budget turns
    /// pure off for this level with a warning.
    fn publish_info(&mut self) -> ServerResult<()> {
        self.pure_active = self.settings.pure;
        let (loaded, overflowed) = self.assets.loaded_checksums();
        if self.pure_active && loaded.is_empty() {
            warn!("pure enforcement requested but no paks are loaded, disabling");
            self.pure_active = false;
        }
        self.vars.set("pak_checksums", if self.pure_active { loaded.as_str() } else { "" });
        self.vars.set("pure", if self.pure_active { "1" } else { "0" });

        let (mut systeminfo, truncated) = self.vars.info_string(VarClass::SystemInfo, BIG_INFO_STRING);
        if self.pure_active && (overflowed || truncated) {
            warn!("pure pak list overflows the systeminfo budget, disabling pure enforcement");
            self.pure_active = false;
            self.vars.set("pak_checksums", "");
            self.vars.set("pure", "0");
            systeminfo = self.vars.info_string(VarClass::SystemInfo, BIG_INFO_STRING).0;
        }
        self.set_configstring(CS_SYSTEMINFO, Some(&systeminfo))?;

        let (serverinfo, _) = self.vars.info_string(VarClass::ServerInfo, MAX_INFO_STRING);
        self.set_configstring(CS_SERVERINFO, Some(&serverinfo))?;
        Ok(())
    }

    /// Settings capacity clamped to the hard limit and a lower floor.
    fn bound_max_clients(&self, floor: usize) -> usize {
        self.settings
            .max_clients
            .clamp(floor, citadel_shared::constants::MAX_CLIENTS_LIMIT)
    }

    /// Applies a capacity change at spawn time.
    ///
    /// The new capacity never drops below the highest slot still in use;
    /// surviving slots are carried through a temporary buffer sized to that
    /// slot, everything else starts fresh.
    fn change_max_clients(&mut self) {
        let highest_in_use = self
            .ctx
            .clients
            .iter()
            .rposition(ClientSlot::is_connected)
            .map_or(0, |slot| slot + 1);

        let old_capacity = self.max_clients;
        self.max_clients = self.bound_max_clients(highest_in_use.max(1));
        if self.max_clients == old_capacity {
            return;
        }
        info!(old_capacity, new_capacity = self.max_clients, "client capacity changed");

        let mut survivors: Vec<Option<ClientSlot>> = Vec::with_capacity(highest_in_use);
        for client in self.ctx.clients.iter().take(highest_in_use) {
            survivors.push(client.is_connected().then(|| client.clone()));
        }

        self.ctx.clients = vec![ClientSlot::new_free(); self.max_clients];
        for (slot, survivor) in survivors.into_iter().enumerate() {
            if let Some(survivor) = survivor {
                self.ctx.clients[slot] = survivor;
            }
        }
        self.ctx.set_snapshot_params();
        self.vars.set("max_clients", &self.max_clients.to_string());
    }

    /// Replaces the level container, applying the clock policy.
    fn clear_level(&mut self) {
        let saved_time = self.level.time;
        let restart_marked = self.level.restart_time != 0;
        self.level = LevelContext::new();
        if !self.settings.level_time_reset {
            self.level.time = saved_time;
            // an empty server starts from a fresh clock, unless an in-place
            // restart marked the old one as still owed to clients
            if !restart_marked
                && self.ctx.clients.iter().all(|client| client.state == ClientState::Free)
            {
                self.level.time = 0;
            }
        }
        // clients treat zero as "no level yet"
        if self.level.time == 0 {
            self.level.time = FRAME_STEP_MS;
        }
    }

    /// Admits a fresh connection into `slot`.
    ///
    /// Returns `Ok(false)` when game logic denies the connection; the slot
    /// stays free.
    pub fn connect_client(
        &mut self,
        slot: usize,
        remote: RemoteKind,
        userinfo: &str,
    ) -> ServerResult<bool> {
        if slot >= self.ctx.clients.len() {
            return Err(ServerError::InvalidClient { index: slot });
        }
        let is_bot = remote == RemoteKind::Bot;
        match self.game.client_connect(slot, true, is_bot) {
            Err(denied) => {
                info!(slot, reason = %denied, "connection denied");
                Ok(false)
            }
            Ok(()) => {
                self.ctx.clients[slot].connect(slot, remote, userinfo);
                debug!(slot, name = %self.ctx.clients[slot].name, "client connected");
                Ok(true)
            }
        }
    }

    /// Drops one client: game notice, demo stop, disconnect command, then
    /// the ZOMBIE grace period.
    pub fn drop_client(&mut self, slot: usize, reason: &str) -> ServerResult<()> {
        let deadline = self.ctx.time + self.settings.zombie_time_ms;
        let client = self
            .ctx
            .clients
            .get_mut(slot)
            .ok_or(ServerError::InvalidClient { index: slot })?;
        if client.state == ClientState::Free {
            return Ok(());
        }
        info!(slot, name = %client.name, reason, "dropping client");

        if client.demo_recording {
            self.demo.stop_client(slot);
            client.demo_recording = false;
        }
        if client.remote != RemoteKind::Local {
            client.enqueue(ServerCommand::Disconnect { reason: reason.to_owned() });
        }
        self.game.client_disconnect(slot);
        client.begin_zombie(deadline);
        Ok(())
    }

    /// Sends the initial full-state dump to a CONNECTED client, moving it
    /// to PRIMED.
    ///
    /// A dump that exceeds the gamestate budget drops the client instead of
    /// sending a truncated state.
    pub fn send_gamestate(&mut self, slot: usize) -> ServerResult<()> {
        let size = self.gamestate_size();
        if slot >= self.ctx.clients.len() {
            return Err(ServerError::InvalidClient { index: slot });
        }
        if !self.ctx.clients[slot].is_connected() {
            warn!(slot, "gamestate requested for a slot that is not connected");
            return Ok(());
        }
        if size > MAX_GAMESTATE_CHARS {
            warn!(slot, size, "gamestate exceeds budget, dropping client");
            return self.drop_client(slot, "gamestate overflow");
        }

        let client = &mut self.ctx.clients[slot];
        client.state = ClientState::Primed;
        client.dirty.clear_all();
        for (index, value) in self.level.configstrings.iter() {
            if !value.is_empty() {
                transmit::send_configstring(client, index, value);
            }
        }
        debug!(slot, size, server_id = self.level.server_id, "gamestate sent");
        Ok(())
    }

    /// Size in bytes of the current gamestate dump: every non-empty
    /// configstring with command overhead, plus every used baseline.
    #[must_use]
    pub fn gamestate_size(&self) -> usize {
        let strings: usize = self
            .level
            .configstrings
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(_, value)| value.len() + COMMAND_OVERHEAD)
            .sum();
        let baselines =
            self.level.baselines.iter().filter(|baseline| baseline.used).count() * EntityState::SIZE;
        strings + baselines
    }

    /// Moves a PRIMED client into the world: ACTIVE state, pending
    /// configstrings flushed exactly once, game notified.
    pub fn client_begin(&mut self, slot: usize) -> ServerResult<()> {
        let client = self
            .ctx
            .clients
            .get_mut(slot)
            .ok_or(ServerError::InvalidClient { index: slot })?;
        if client.state != ClientState::Primed {
            warn!(slot, state = ?client.state, "begin from a non-primed slot, ignoring");
            return Ok(());
        }
        client.state = ClientState::Active;
        client.old_server_time = 0;
        configstring::flush_pending(&self.level, client, &self.world)?;
        self.game.client_begin(slot);
        Ok(())
    }

    /// Replaces a client's userinfo, reparsing the name and writing through
    /// to an active demo recording.
    pub fn set_userinfo(&mut self, slot: usize, userinfo: &str) -> ServerResult<()> {
        let client = self
            .ctx
            .clients
            .get_mut(slot)
            .ok_or(ServerError::InvalidClient { index: slot })?;
        client.userinfo = userinfo.to_owned();
        client.name = info::value_for_key(userinfo, "name");
        if self.demo.state() == DemoState::Recording {
            self.demo.record_userinfo(slot, userinfo);
        }
        Ok(())
    }

    /// Returns a client's userinfo string.
    pub fn get_userinfo(&self, slot: usize) -> ServerResult<&str> {
        self.ctx
            .clients
            .get(slot)
            .map(|client| client.userinfo.as_str())
            .ok_or(ServerError::InvalidClient { index: slot })
    }

    /// Sets configstring `index` and propagates per the replication rules.
    pub fn set_configstring(&mut self, index: usize, value: Option<&str>) -> ServerResult<()> {
        configstring::set_configstring(
            &mut self.level,
            &mut self.ctx.clients,
            &self.world,
            &mut self.demo,
            index,
            value,
        )
    }

    /// Returns configstring `index`.
    pub fn get_configstring(&self, index: usize) -> ServerResult<&str> {
        configstring::get_configstring(&self.level, index)
    }

    /// Advances the server one frame: clocks, queued tasks, zombie expiry,
    /// and game logic when a level is serving.
    pub fn run_frame(&mut self, dt: i64) -> ServerResult<()> {
        self.ctx.time += dt;
        self.pump_frame_tasks()?;
        self.free_expired_zombies();
        if self.level.state == LevelState::Game {
            self.level.time += dt;
            self.game.run_frame(self.level.time);
        }
        Ok(())
    }

    /// Runs every queued frame task.
    pub fn pump_frame_tasks(&mut self) -> ServerResult<()> {
        while let Ok(task) = self.tasks_rx.try_recv() {
            match task {
                FrameTask::ResumeSpawn => {
                    if let Some(PendingSpawn { map, flags }) = self.pending.take() {
                        debug!(map, "resuming parked spawn");
                        self.finish_spawn(map, flags)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns expired ZOMBIE slots to FREE.
    fn free_expired_zombies(&mut self) {
        for (slot, client) in self.ctx.clients.iter_mut().enumerate() {
            if client.state == ClientState::Zombie && self.ctx.time >= client.zombie_deadline {
                debug!(slot, "zombie slot expired");
                client.free();
            }
        }
    }

    /// Tells every surviving client the server is going away.
    ///
    /// Sent twice because the reliable channel is about to disappear with
    /// the server; local clients are skipped.
    pub fn final_message(&mut self, text: &str) {
        for _ in 0..2 {
            for client in &mut self.ctx.clients {
                if !client.is_connected() || client.remote == RemoteKind::Local {
                    continue;
                }
                client.enqueue(ServerCommand::Print { text: text.to_owned() });
                client.enqueue(ServerCommand::Disconnect { reason: text.to_owned() });
                // force a final snapshot out
                client.last_snapshot_time = 0;
            }
        }
    }

    /// Shuts the whole server down: demos stopped, clients notified and
    /// zombified, game and level torn down, static state released.
    pub fn shutdown(&mut self, reason: &str) {
        if !self.ctx.initialized {
            return;
        }
        info!(reason, "server shutting down");
        self.demo.stop_all();
        if self.ctx.clients.iter().any(ClientSlot::is_connected) {
            self.final_message(reason);
            let deadline = self.ctx.time + self.settings.zombie_time_ms;
            for client in &mut self.ctx.clients {
                if client.is_connected() {
                    client.begin_zombie(deadline);
                }
            }
        }
        self.game.shutdown();
        self.level = LevelContext::new();
        self.ctx = ServerContext::new();
        self.max_clients = 0;
        self.pending = None;
        self.vars.set("server_running", "0");
        self.vars.set("mapname", "nomap");
        self.observer.heartbeat();
        self.observer.set_status("down");
    }
}
