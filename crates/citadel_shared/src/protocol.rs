//! # Reliable Wire Commands
//!
//! Text commands sent over the ordered reliable channel, and the client-side
//! reassembler for chunked configstring updates.
//!
//! ## Chunked configstrings
//!
//! A configstring value that does not fit one command is split into chunks
//! tagged by position:
//!
//! ```text
//! server:  bcs0 5 "first chunk"    <- begin
//!          bcs1 5 "middle chunk"   <- zero or more
//!          bcs2 5 "last chunk"     <- end
//!
//! client:  concatenate in arrival order -> one logical `cs 5 "..."`
//! ```
//!
//! Chunk tagging alone signals boundaries; there is no length field. The
//! scheme therefore relies entirely on ordered, reliable delivery - the
//! reassembler rejects any out-of-sequence chunk instead of guessing.

use thiserror::Error;

/// Position tag of one chunk within a chunked configstring update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkKind {
    /// First chunk (`bcs0`). Resets any partial reassembly for the index.
    Begin,
    /// Interior chunk (`bcs1`).
    Middle,
    /// Final, shorter chunk (`bcs2`). Completes the update.
    End,
}

impl ChunkKind {
    /// Wire name of the command carrying this chunk.
    #[must_use]
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::Begin => "bcs0",
            Self::Middle => "bcs1",
            Self::End => "bcs2",
        }
    }
}

/// A reliable command as sent from server to client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerCommand {
    /// Whole configstring replace: `cs <index> "<value>"`.
    ConfigString {
        /// Configstring table index.
        index: usize,
        /// Full replacement value.
        value: String,
    },
    /// One chunk of an oversized configstring: `bcs0/1/2 <index> "<chunk>"`.
    ConfigStringChunk {
        /// Configstring table index.
        index: usize,
        /// Position of this chunk.
        kind: ChunkKind,
        /// Chunk payload, at most `MAX_CHUNK_BOUND - 1` bytes.
        chunk: String,
    },
    /// Instructs the client to restart its connection handshake.
    Reconnect,
    /// Terminal notice; the client should drop the connection.
    Disconnect {
        /// Human-readable reason shown to the player.
        reason: String,
    },
    /// Console text for the client.
    Print {
        /// Text to print.
        text: String,
    },
}

impl ServerCommand {
    /// Encodes the command into its wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::ConfigString { index, value } => format!("cs {index} \"{value}\""),
            Self::ConfigStringChunk { index, kind, chunk } => {
                format!("{} {index} \"{chunk}\"", kind.command_name())
            }
            Self::Reconnect => "reconnect".to_owned(),
            Self::Disconnect { reason } => format!("disconnect \"{reason}\""),
            Self::Print { text } => format!("print \"{text}\""),
        }
    }

    /// Parses a command from its wire form.
    ///
    /// Returns `None` for unknown command names or malformed framing.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches('\n');
        let (name, rest) = match line.split_once(' ') {
            Some((n, r)) => (n, r),
            None => (line, ""),
        };

        match name {
            "cs" | "bcs0" | "bcs1" | "bcs2" => {
                let (index_str, rest) = rest.split_once(' ')?;
                let index: usize = index_str.parse().ok()?;
                let value = quoted(rest)?;
                match name {
                    "cs" => Some(Self::ConfigString { index, value }),
                    "bcs0" => Some(Self::ConfigStringChunk { index, kind: ChunkKind::Begin, chunk: value }),
                    "bcs1" => Some(Self::ConfigStringChunk { index, kind: ChunkKind::Middle, chunk: value }),
                    _ => Some(Self::ConfigStringChunk { index, kind: ChunkKind::End, chunk: value }),
                }
            }
            "reconnect" => Some(Self::Reconnect),
            "disconnect" => Some(Self::Disconnect { reason: quoted(rest)? }),
            "print" => Some(Self::Print { text: quoted(rest)? }),
            _ => None,
        }
    }
}

/// Extracts the payload between the first and last double quote.
///
/// Configstring values are info strings and cannot themselves contain `"`.
fn quoted(arg: &str) -> Option<String> {
    let start = arg.find('"')?;
    let end = arg.rfind('"')?;
    if end <= start {
        return None;
    }
    Some(arg[start + 1..end].to_owned())
}

/// Errors raised by [`ChunkReassembler`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A `bcs1`/`bcs2` chunk arrived with no `bcs0` in flight.
    #[error("chunk for configstring {index} arrived with no begin chunk in flight")]
    ChunkWithoutBegin {
        /// Index carried by the stray chunk.
        index: usize,
    },
    /// A chunk arrived for a different index than the one being reassembled.
    #[error("chunk index mismatch: reassembling {expected}, received {received}")]
    ChunkIndexMismatch {
        /// Index of the update in flight.
        expected: usize,
        /// Index carried by the offending chunk.
        received: usize,
    },
}

/// Client-side reassembler for chunked configstring updates.
///
/// Chunks carry at most `MAX_CHUNK_BOUND - 1` bytes each and are emitted
/// back to back; reassembly is concatenation in arrival order. The sender's
/// cursor advances by exactly the chunk size, so no byte is duplicated or
/// dropped as long as delivery is ordered and reliable.
#[derive(Debug, Default)]
pub struct ChunkReassembler {
    in_flight: Option<(usize, String)>,
}

impl ChunkReassembler {
    /// Creates an idle reassembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a chunked update is partially assembled.
    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Feeds one command; returns the completed `(index, value)` update if
    /// this command finished one.
    ///
    /// Whole `cs` commands complete immediately. Non-configstring commands
    /// are ignored.
    pub fn feed(&mut self, cmd: &ServerCommand) -> Result<Option<(usize, String)>, ProtocolError> {
        match cmd {
            ServerCommand::ConfigString { index, value } => {
                // A whole replace supersedes any partial chunked update.
                self.in_flight = None;
                Ok(Some((*index, value.clone())))
            }
            ServerCommand::ConfigStringChunk { index, kind, chunk } => match kind {
                ChunkKind::Begin => {
                    self.in_flight = Some((*index, chunk.clone()));
                    Ok(None)
                }
                ChunkKind::Middle => {
                    let (expected, buf) = self
                        .in_flight
                        .as_mut()
                        .ok_or(ProtocolError::ChunkWithoutBegin { index: *index })?;
                    if *expected != *index {
                        let expected = *expected;
                        self.in_flight = None;
                        return Err(ProtocolError::ChunkIndexMismatch { expected, received: *index });
                    }
                    buf.push_str(chunk);
                    Ok(None)
                }
                ChunkKind::End => {
                    let (expected, mut buf) = self
                        .in_flight
                        .take()
                        .ok_or(ProtocolError::ChunkWithoutBegin { index: *index })?;
                    if expected != *index {
                        return Err(ProtocolError::ChunkIndexMismatch { expected, received: *index });
                    }
                    buf.push_str(chunk);
                    Ok(Some((*index, buf)))
                }
            },
            _ => Ok(None),
        }
    }
}
