//! # Configstring Transmission
//!
//! Turns one configstring update into the reliable commands that carry it.
//! A value that fits a single command goes out as one `cs`; anything larger
//! is split into `bcs0`/`bcs1`/`bcs2` chunks, each small enough that its
//! wire form stays under the reliable-command size cap with room for the
//! command name, index, and quoting.
//!
//! ## Cursor rule
//!
//! Each chunk carries at most `bound - 1` bytes, cut back to a `char`
//! boundary so a multi-byte character never straddles two chunks. The send
//! cursor advances by exactly the bytes carried, so consecutive chunks are
//! disjoint and the client reassembles by plain concatenation. The final
//! chunk is always tagged `bcs2`, even when a value splits into exactly two.

use citadel_shared::constants::MAX_CHUNK_BOUND;
use citadel_shared::protocol::{ChunkKind, ServerCommand};

use crate::client::ClientSlot;

/// Builds the command sequence for one configstring update with an explicit
/// chunk bound. The bound must be at least 5 so every chunk can end on a
/// `char` boundary.
#[must_use]
pub fn configstring_commands_bounded(
    index: usize,
    value: &str,
    bound: usize,
) -> Vec<ServerCommand> {
    let len = value.len();
    if len < bound {
        return vec![ServerCommand::ConfigString { index, value: value.to_owned() }];
    }

    let mut commands = Vec::new();
    let mut sent = 0;
    while sent < len {
        let remaining = len - sent;
        let kind = if sent == 0 {
            ChunkKind::Begin
        } else if remaining < bound {
            ChunkKind::End
        } else {
            ChunkKind::Middle
        };
        let mut end = (sent + bound - 1).min(len);
        // never split a multi-byte character across chunks
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        commands.push(ServerCommand::ConfigStringChunk {
            index,
            kind,
            chunk: value[sent..end].to_owned(),
        });
        sent = end;
    }
    commands
}

/// Builds the command sequence for one configstring update at the standard
/// chunk bound.
#[must_use]
pub fn configstring_commands(index: usize, value: &str) -> Vec<ServerCommand> {
    configstring_commands_bounded(index, value, MAX_CHUNK_BOUND)
}

/// Queues one configstring update on a client's reliable channel.
pub fn send_configstring(client: &mut ClientSlot, index: usize, value: &str) {
    for command in configstring_commands(index, value) {
        client.enqueue(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_shared::protocol::ChunkReassembler;

    fn reassemble(commands: &[ServerCommand]) -> (usize, String) {
        let mut r = ChunkReassembler::new();
        let mut done = None;
        for command in commands {
            if let Some(update) = r.feed(command).unwrap() {
                assert!(done.is_none(), "more than one completed update");
                done = Some(update);
            }
        }
        done.expect("no completed update")
    }

    #[test]
    fn test_short_value_is_one_command() {
        let commands = configstring_commands_bounded(4, "short", 100);
        assert_eq!(
            commands,
            vec![ServerCommand::ConfigString { index: 4, value: "short".to_owned() }]
        );
    }

    #[test]
    fn test_three_hundred_chars_at_bound_one_hundred() {
        let value: String = std::iter::repeat('a').take(300).collect();
        let commands = configstring_commands_bounded(8, &value, 100);

        let kinds: Vec<ChunkKind> = commands
            .iter()
            .map(|c| match c {
                ServerCommand::ConfigStringChunk { kind, .. } => *kind,
                other => panic!("unexpected command: {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![ChunkKind::Begin, ChunkKind::Middle, ChunkKind::Middle, ChunkKind::End]
        );

        let lens: Vec<usize> = commands
            .iter()
            .map(|c| match c {
                ServerCommand::ConfigStringChunk { chunk, .. } => chunk.len(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(lens, vec![99, 99, 99, 3]);

        assert_eq!(reassemble(&commands), (8, value));
    }

    #[test]
    fn test_value_at_exact_bound_is_chunked() {
        let value: String = std::iter::repeat('b').take(100).collect();
        let commands = configstring_commands_bounded(2, &value, 100);
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            commands[0],
            ServerCommand::ConfigStringChunk { kind: ChunkKind::Begin, .. }
        ));
        assert!(matches!(
            commands[1],
            ServerCommand::ConfigStringChunk { kind: ChunkKind::End, .. }
        ));
        assert_eq!(reassemble(&commands), (2, value));
    }

    #[test]
    fn test_chunks_are_disjoint_and_complete() {
        // Distinct bytes so any duplicated or dropped byte shows up.
        for len in [99, 100, 101, 199, 200, 250, 1000, 2500] {
            let value: String =
                (0..len).map(|i| char::from(b'!' + (i % 90) as u8)).collect();
            let commands = configstring_commands_bounded(6, &value, 100);
            let (index, reassembled) = reassemble(&commands);
            assert_eq!(index, 6);
            assert_eq!(reassembled, value, "len {len}");
            for command in &commands {
                if let ServerCommand::ConfigStringChunk { chunk, .. } = command {
                    assert!(chunk.len() <= 99, "len {len}");
                }
            }
        }
    }

    #[test]
    fn test_multibyte_chars_survive_chunk_boundaries() {
        // 150 two-byte chars put raw offsets 99 and 198 mid-character; the
        // mixed string exercises 1-, 2-, 3-, and 4-byte encodings.
        let two_byte: String = std::iter::repeat('é').take(150).collect();
        let mixed: String = "aé\u{20ac}\u{1f30d}".repeat(60);
        for value in [two_byte, mixed] {
            let commands = configstring_commands_bounded(9, &value, 100);
            for command in &commands {
                if let ServerCommand::ConfigStringChunk { chunk, .. } = command {
                    assert!(chunk.len() <= 99);
                    assert!(!chunk.contains('\u{fffd}'));
                }
            }
            let (index, reassembled) = reassemble(&commands);
            assert_eq!(index, 9);
            assert_eq!(reassembled, value);
        }
    }

    #[test]
    fn test_standard_bound_keeps_wire_form_under_cap() {
        use citadel_shared::constants::{COMMAND_OVERHEAD, MAX_STRING_CHARS};
        let value: String = std::iter::repeat('c').take(3000).collect();
        for command in configstring_commands(1023, &value) {
            assert!(command.encode().len() < MAX_STRING_CHARS);
            if let ServerCommand::ConfigStringChunk { chunk, .. } = command {
                assert!(chunk.len() <= MAX_STRING_CHARS - COMMAND_OVERHEAD - 1);
            }
        }
    }

    #[test]
    fn test_send_queues_in_order() {
        let mut client = ClientSlot::new_free();
        send_configstring(&mut client, 3, "plain");
        assert_eq!(
            client.commands,
            vec![ServerCommand::ConfigString { index: 3, value: "plain".to_owned() }]
        );
    }
}
