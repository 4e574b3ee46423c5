//! # Entity Baselines
//!
//! Baselines compress non-delta messages to clients: only fields that
//! differ from the baseline go on the wire. The builder snapshots every
//! linked entity once per spawn, after the settle frames and before any
//! reconnect traffic, so first snapshots have something to delta against.

use crate::context::LevelContext;
use crate::integration::WorldAccess;

use citadel_shared::entity::EntityState;

/// Reference snapshot for one entity slot.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntityBaseline {
    /// Public state captured at spawn time.
    pub state: EntityState,
    /// Whether a baseline exists. Delta encoders treat an unused slot as
    /// "baseline = all-default".
    pub used: bool,
}

/// Captures the current state of every linked entity as its baseline.
///
/// Entities not linked into the world keep no baseline. Each linked entity
/// gets its canonical number written back before the copy, so the baseline
/// carries it.
pub fn build_baselines(world: &mut dyn WorldAccess, level: &mut LevelContext) {
    let count = world.entity_count().min(level.baselines.len());
    for number in 0..count {
        if !world.is_linked(number) {
            continue;
        }
        world.set_number(number);

        // take current state as baseline
        level.baselines[number] = EntityBaseline { state: world.state(number), used: true };
    }
}
