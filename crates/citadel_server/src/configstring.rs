//! # Configstring Store & Replication
//!
//! The fixed table of shared strings for the current level, and the rules
//! that keep every connected client's copy consistent: exactly one delivery
//! per change, in write order, regardless of how far behind each client is.
//!
//! ## Delivery rules
//!
//! | client state | on change                       |
//! |--------------|---------------------------------|
//! | `< Primed`   | nothing                         |
//! | `Primed`     | dirty bit set, flushed on ACTIVE |
//! | `>= Active`  | reliable command immediately    |
//!
//! Propagation only happens in GAME state or while a restart replays;
//! during LOADING the gamestate dump will carry the table wholesale.

use citadel_shared::constants::{CS_SERVERINFO, MAX_CONFIGSTRINGS};

use crate::client::{ClientSlot, ClientState};
use crate::context::{LevelContext, LevelState};
use crate::error::{ServerError, ServerResult};
use crate::integration::{DemoRecorder, DemoState, WorldAccess};
use crate::transmit;

/// The per-level table of shared strings, each an owned value replaced
/// wholesale on write.
#[derive(Debug)]
pub struct ConfigStringStore {
    strings: Vec<String>,
}

impl ConfigStringStore {
    /// Creates a table of `MAX_CONFIGSTRINGS` empty strings.
    #[must_use]
    pub fn new() -> Self {
        Self { strings: vec![String::new(); MAX_CONFIGSTRINGS] }
    }

    /// Returns the value at `index`; empty string for an unset slot.
    pub fn get(&self, index: usize) -> ServerResult<&str> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(ServerError::InvalidConfigString { index })
    }

    /// Replaces the value at `index`. Returns false when the new value is
    /// byte-for-byte equal to the stored one (a no-op write).
    pub fn replace(&mut self, index: usize, value: &str) -> ServerResult<bool> {
        let slot = self
            .strings
            .get_mut(index)
            .ok_or(ServerError::InvalidConfigString { index })?;
        if slot == value {
            return Ok(false);
        }
        *slot = value.to_owned();
        Ok(true)
    }

    /// Iterates `(index, value)` over every slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.strings.iter().map(String::as_str).enumerate()
    }
}

impl Default for ConfigStringStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets configstring `index`, propagating the change to clients.
///
/// `None` is treated as the empty string. Equal writes are no-ops and
/// produce no propagation event. While recording, the change is written
/// through to the demo. Propagation follows the table in the module docs;
/// the serverinfo index is skipped for clients whose entity carries the
/// no-serverinfo flag.
pub fn set_configstring(
    level: &mut LevelContext,
    clients: &mut [ClientSlot],
    world: &dyn WorldAccess,
    demo: &mut dyn DemoRecorder,
    index: usize,
    value: Option<&str>,
) -> ServerResult<()> {
    let value = value.unwrap_or("");

    // don't bother broadcasting an update if no change
    if !level.configstrings.replace(index, value)? {
        return Ok(());
    }

    if demo.state() == DemoState::Recording {
        demo.record_configstring(index, value);
    }

    // send it to all the clients if we aren't spawning a new server
    if level.state == LevelState::Game || level.restarting {
        for client in clients.iter_mut() {
            if client.state < ClientState::Active {
                if client.state == ClientState::Primed {
                    client.dirty.set(index);
                }
                continue;
            }
            if index == CS_SERVERINFO && world.state(client.entity).no_server_info() {
                continue;
            }
            transmit::send_configstring(client, index, value);
        }
    }

    Ok(())
}

/// Returns the configstring at `index`, validating the range exactly like
/// [`set_configstring`].
pub fn get_configstring(level: &LevelContext, index: usize) -> ServerResult<&str> {
    level.configstrings.get(index)
}

/// Flushes every configstring that changed while `client` was PRIMED.
///
/// Called exactly once, on the PRIMED→ACTIVE transition. Each dirty index
/// is transmitted once and its bit cleared; the serverinfo visibility rule
/// applies the same way as in [`set_configstring`].
pub fn flush_pending(
    level: &LevelContext,
    client: &mut ClientSlot,
    world: &dyn WorldAccess,
) -> ServerResult<()> {
    for index in 0..MAX_CONFIGSTRINGS {
        if !client.dirty.get(index) {
            continue;
        }
        if index == CS_SERVERINFO && world.state(client.entity).no_server_info() {
            continue;
        }
        transmit::send_configstring(client, index, level.configstrings.get(index)?);
        client.dirty.clear(index);
    }
    Ok(())
}
