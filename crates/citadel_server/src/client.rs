//! # Client Slot Lifecycle
//!
//! One slot per connection capacity unit, reused across reconnects without
//! reallocation.
//!
//! ## State ladder
//!
//! ```text
//! FREE ──connect──▶ CONNECTED ──gamestate──▶ PRIMED ──first input──▶ ACTIVE
//!   ▲                                                                  │
//!   └──── grace period ──── ZOMBIE ◀──────────── drop ─────────────────┘
//! ```
//!
//! The ordering of the variants is part of the contract: "survives a map
//! spawn" means `state >= Connected`, and ZOMBIE deliberately sorts below
//! CONNECTED so a dropped slot does not.

use citadel_shared::constants::MAX_CONFIGSTRINGS;
use citadel_shared::protocol::ServerCommand;

/// Lifecycle state of one connection slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ClientState {
    /// Slot unused.
    #[default]
    Free = 0,
    /// Disconnecting; occupies the slot briefly to absorb late packets.
    Zombie = 1,
    /// Handshake done, level data not yet loaded.
    Connected = 2,
    /// Has the gamestate, awaiting its first real update.
    Primed = 3,
    /// Fully synced, receiving snapshots.
    Active = 4,
}

/// What is on the other end of a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemoteKind {
    /// A human player over the network.
    #[default]
    Human,
    /// An automated participant; advanced straight to ACTIVE at spawn.
    Bot,
    /// A client inside this process; never sent disconnect notices.
    Local,
}

/// Per-client, per-configstring "needs update" bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirtyBits {
    words: [u64; MAX_CONFIGSTRINGS / 64],
}

impl DirtyBits {
    /// Marks `index` dirty.
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.words[index / 64] |= 1 << (index % 64);
    }

    /// Clears `index`.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        self.words[index / 64] &= !(1 << (index % 64));
    }

    /// Whether `index` is dirty.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Clears every bit.
    pub fn clear_all(&mut self) {
        self.words = [0; MAX_CONFIGSTRINGS / 64];
    }

    /// Number of dirty indices.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// One connection slot.
///
/// Slot memory is reused across reconnects; only a capacity change
/// reallocates the table.
#[derive(Clone, Debug, Default)]
pub struct ClientSlot {
    /// Lifecycle state.
    pub state: ClientState,
    /// Kind of remote endpoint.
    pub remote: RemoteKind,
    /// Free-form key/value info string supplied by the client.
    pub userinfo: String,
    /// Player name parsed out of the userinfo.
    pub name: String,
    /// Configstring indices changed while this client was PRIMED.
    pub dirty: DirtyBits,
    /// Outgoing reliable command queue, drained by the network layer in
    /// order.
    pub commands: Vec<ServerCommand>,
    /// Whether a per-client demo is being recorded.
    pub demo_recording: bool,
    /// Server time of the last snapshot sent to this client.
    pub last_snapshot_time: i64,
    /// Level time at the moment of the last map change, so the client can
    /// offset its clock; zero when the clock reset.
    pub old_server_time: i64,
    /// Server time at which a ZOMBIE slot returns to FREE.
    pub zombie_deadline: i64,
    /// Entity number owned by this client.
    pub entity: usize,
}

impl ClientSlot {
    /// Creates a free slot.
    #[must_use]
    pub fn new_free() -> Self {
        Self::default()
    }

    /// Returns true if this slot survives a map spawn.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state >= ClientState::Connected
    }

    /// Initializes the slot for a fresh connection.
    pub fn connect(&mut self, slot_number: usize, remote: RemoteKind, userinfo: &str) {
        self.state = ClientState::Connected;
        self.remote = remote;
        self.userinfo = userinfo.to_owned();
        self.name = crate::info::value_for_key(userinfo, "name");
        self.dirty.clear_all();
        self.commands.clear();
        self.demo_recording = false;
        self.last_snapshot_time = 0;
        self.old_server_time = 0;
        self.zombie_deadline = 0;
        self.entity = slot_number;
    }

    /// Queues a reliable command for this client.
    pub fn enqueue(&mut self, command: ServerCommand) {
        self.commands.push(command);
    }

    /// Moves the slot to ZOMBIE until `deadline`.
    ///
    /// The command queue is kept so a disconnect notice already queued can
    /// still drain; late incoming packets are absorbed until the deadline.
    pub fn begin_zombie(&mut self, deadline: i64) {
        self.state = ClientState::Zombie;
        self.zombie_deadline = deadline;
        self.dirty.clear_all();
    }

    /// Returns the slot to FREE, keeping allocations for reuse.
    pub fn free(&mut self) {
        self.state = ClientState::Free;
        self.remote = RemoteKind::Human;
        self.userinfo.clear();
        self.name.clear();
        self.dirty.clear_all();
        self.commands.clear();
        self.demo_recording = false;
        self.last_snapshot_time = 0;
        self.old_server_time = 0;
        self.zombie_deadline = 0;
        self.entity = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering_matches_ladder() {
        assert!(ClientState::Free < ClientState::Zombie);
        assert!(ClientState::Zombie < ClientState::Connected);
        assert!(ClientState::Connected < ClientState::Primed);
        assert!(ClientState::Primed < ClientState::Active);
    }

    #[test]
    fn test_zombie_does_not_survive_spawn() {
        let mut slot = ClientSlot::new_free();
        slot.connect(0, RemoteKind::Human, "\\name\\grunt");
        assert!(slot.is_connected());
        slot.begin_zombie(5000);
        assert!(!slot.is_connected());
        assert_eq!(slot.zombie_deadline, 5000);
    }

    #[test]
    fn test_connect_parses_name() {
        let mut slot = ClientSlot::new_free();
        slot.connect(3, RemoteKind::Human, "\\name\\grunt\\rate\\25000");
        assert_eq!(slot.name, "grunt");
        assert_eq!(slot.entity, 3);
        assert_eq!(slot.state, ClientState::Connected);
    }

    #[test]
    fn test_free_clears_slot() {
        let mut slot = ClientSlot::new_free();
        slot.connect(1, RemoteKind::Bot, "\\name\\bot1");
        slot.dirty.set(5);
        slot.enqueue(ServerCommand::Reconnect);
        slot.free();
        assert_eq!(slot.state, ClientState::Free);
        assert_eq!(slot.dirty.count(), 0);
        assert!(slot.commands.is_empty());
        assert!(slot.userinfo.is_empty());
    }

    #[test]
    fn test_dirty_bits() {
        let mut bits = DirtyBits::default();
        bits.set(0);
        bits.set(63);
        bits.set(64);
        bits.set(MAX_CONFIGSTRINGS - 1);
        assert_eq!(bits.count(), 4);
        assert!(bits.get(63));
        assert!(bits.get(64));
        bits.clear(63);
        assert!(!bits.get(63));
        assert_eq!(bits.count(), 3);
        bits.clear_all();
        assert_eq!(bits.count(), 0);
    }
}
