//! # Protocol Limits
//!
//! Hard limits shared by the server and every deployed client.
//!
//! **CRITICAL:** These values are baked into the client binary.
//! Changes require a protocol version bump and a client rebuild.

// =============================================================================
// CONFIGSTRING TABLE
// =============================================================================

/// Number of configstring slots per level.
pub const MAX_CONFIGSTRINGS: usize = 1024;

/// Reserved index: the serverinfo key/value string.
///
/// Entities flagged [`crate::entity::SVFLAG_NO_SERVER_INFO`] never receive
/// updates for this index.
pub const CS_SERVERINFO: usize = 0;

/// Reserved index: the systeminfo key/value string.
pub const CS_SYSTEMINFO: usize = 1;

// =============================================================================
// WIRE SIZES
// =============================================================================

/// Maximum length of a single reliable command string.
pub const MAX_STRING_CHARS: usize = 1024;

/// Framing overhead of a reliable command: command name, index digits,
/// quotes, separators, and trailing NUL on legacy clients.
pub const COMMAND_OVERHEAD: usize = 24;

/// Chunk bound B: a configstring value shorter than this fits in a single
/// `cs` command; anything longer is split into `bcs0`/`bcs1`/`bcs2` chunks
/// carrying at most `B - 1` bytes each.
pub const MAX_CHUNK_BOUND: usize = MAX_STRING_CHARS - COMMAND_OVERHEAD;

/// Maximum size of the initial full-state dump sent to a newly primed
/// client. The pure-pak list degrades itself rather than overflow this.
pub const MAX_GAMESTATE_CHARS: usize = 16_000;

/// Maximum length of a small key/value info string (userinfo, serverinfo).
pub const MAX_INFO_STRING: usize = 1024;

/// Maximum length of a large key/value info string (systeminfo).
pub const BIG_INFO_STRING: usize = 8192;

// =============================================================================
// CAPACITY
// =============================================================================

/// Hard upper bound on connection slots.
pub const MAX_CLIENTS_LIMIT: usize = 64;

/// Maximum entity slots per level; baselines are sized to this.
pub const MAX_ENTITIES: usize = 1024;

/// Snapshot frames retained per entity slot in the snapshot storage pool.
pub const SNAPSHOT_BACKUP: usize = 32;

// =============================================================================
// SPAWN SEQUENCE TIMING
// =============================================================================

/// Logic-advance ticks run before clients are told the map is ready.
pub const SETTLE_FRAMES: u32 = 3;

/// Milliseconds advanced per settle tick.
pub const FRAME_STEP_MS: i64 = 100;

/// Back-date applied to a bot's last-snapshot time so a snapshot is
/// generated on the very next tick.
pub const SNAPSHOT_BACKDATE_MS: i64 = 9999;

/// Bit toggled in the snapshot flags on every spawn so clients can detect
/// a server discontinuity.
pub const SNAPSHOT_FLAG_SERVER_COUNT: u32 = 0x04;

/// Assets touched during finalize so they are always present in the
/// referenced list, even under exclusion filters. Clients cannot pass the
/// pure check without them.
pub const REQUIRED_ASSETS: [&str; 2] = ["logic/cgame.bin", "logic/ui.bin"];
