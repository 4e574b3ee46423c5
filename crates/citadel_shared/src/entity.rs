//! # Public Entity State
//!
//! The fixed-layout per-entity state that the server replicates to clients.
//! Baselines are plain copies of this struct; future updates are sent as
//! differences against the baseline, so both ends must agree on the layout
//! byte for byte.

use bytemuck::{Pod, Zeroable};

/// Entity visibility flag: never send the serverinfo configstring to this
/// entity's client.
pub const SVFLAG_NO_SERVER_INFO: u32 = 1 << 0;

/// Entity visibility flag: entity is broadcast to all clients regardless of
/// potential visibility.
pub const SVFLAG_BROADCAST: u32 = 1 << 1;

/// Public, replicated state of one entity.
///
/// Size: 40 bytes, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct EntityState {
    /// Canonical entity number; assigned by the baseline builder at spawn.
    pub number: u32,
    /// Server-side visibility flags (`SVFLAG_*`).
    pub svflags: u32,
    /// Model asset index into the configstring table.
    pub model_index: u16,
    /// Most recent entity event.
    pub event: u16,
    /// World position.
    pub origin: [f32; 3],
    /// Orientation in degrees.
    pub angles: [f32; 3],
    /// Ground entity number, or `u32::MAX` when airborne.
    pub ground_entity: u32,
}

impl EntityState {
    /// Size in bytes.
    pub const SIZE: usize = 40;

    /// Returns true if this entity must never receive serverinfo updates.
    #[inline]
    #[must_use]
    pub const fn no_server_info(&self) -> bool {
        self.svflags & SVFLAG_NO_SERVER_INFO != 0
    }
}
