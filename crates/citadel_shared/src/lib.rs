//! # CITADEL Shared
//!
//! Wire commands, protocol limits, and fixed-layout entity state shared
//! between the CITADEL server and its clients.
//!
//! ## CRITICAL RULE
//!
//! Everything in this crate is part of the wire contract. Deployed clients
//! reassemble chunked configstrings, parse reliable commands, and delta
//! against entity baselines using these exact definitions. Changing a limit
//! or a command name here is a protocol version bump, not a refactor.

#![deny(unsafe_code)]

pub mod constants;
pub mod entity;
pub mod protocol;

pub use constants::{
    CS_SERVERINFO, CS_SYSTEMINFO, MAX_CHUNK_BOUND, MAX_CLIENTS_LIMIT, MAX_CONFIGSTRINGS,
    MAX_ENTITIES, MAX_GAMESTATE_CHARS, MAX_STRING_CHARS,
};
pub use entity::{EntityState, SVFLAG_NO_SERVER_INFO};
pub use protocol::{ChunkKind, ChunkReassembler, ProtocolError, ServerCommand};
