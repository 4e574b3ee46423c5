//! End-to-end spawn and replication scenarios through the public API.

use citadel_server::integration::stubs::{
    CountingObserver, MemoryVarStore, StubAssets, StubDemo, StubGame, StubWorld,
};
use citadel_server::integration::{DemoState, VarStore};
use citadel_server::{
    ClientState, LevelState, RemoteKind, Server, ServerSettings, SpawnFlags, SpawnPhase,
};
use citadel_shared::constants::{CS_SERVERINFO, FRAME_STEP_MS, MAX_CHUNK_BOUND};
use citadel_shared::protocol::{ChunkKind, ChunkReassembler, ServerCommand};

type TestServer =
    Server<StubGame, StubWorld, StubAssets, StubDemo, CountingObserver, MemoryVarStore>;

fn make_server(settings: ServerSettings) -> TestServer {
    let mut assets = StubAssets::with_map("arena1", 0xa11e_5afe);
    assets.loaded = "1287489123 948213755".to_owned();
    assets.referenced_checksums = "1287489123".to_owned();
    assets.referenced_names = "base".to_owned();
    Server::new(
        settings,
        StubGame::new(),
        StubWorld::new(64),
        assets,
        StubDemo::default(),
        CountingObserver::default(),
        MemoryVarStore::new(),
    )
}

/// Capacity 8, one CONNECTED client, spawn "arena1" without bot removal:
/// the client survives in CONNECTED, the level reaches GAME, and the
/// serverinfo change event fires exactly once.
#[test]
fn test_spawn_with_connected_client() {
    let mut server = make_server(ServerSettings { max_clients: 8, ..Default::default() });
    server.startup().unwrap();
    assert!(server.connect_client(0, RemoteKind::Human, "\\name\\survivor").unwrap());
    assert_eq!(server.ctx.clients[0].state, ClientState::Connected);

    // Record through the demo layer so serverinfo publication is observable.
    server.demo.demo_state = DemoState::Recording;

    server.spawn("arena1", SpawnFlags { kill_bots: false }).unwrap();

    assert_eq!(server.ctx.clients[0].state, ClientState::Connected);
    assert_ne!(server.ctx.clients[0].state, ClientState::Free);
    assert_eq!(server.level.state, LevelState::Game);
    assert_eq!(server.ctx.spawn_phase, SpawnPhase::Idle);

    let serverinfo_events = server
        .demo
        .configstring_writes
        .iter()
        .filter(|(index, _)| *index == CS_SERVERINFO)
        .count();
    assert_eq!(serverinfo_events, 1);
}

/// A 300-character configstring at chunk bound 100 goes out as
/// `bcs0 bcs1 bcs1 bcs2`, every payload at most 99 characters, and
/// reassembles to the original value.
#[test]
fn test_long_configstring_chunked_delivery() {
    let value: String = (0..300).map(|i| char::from(b'A' + (i % 26) as u8)).collect();
    let commands = citadel_server::transmit::configstring_commands_bounded(21, &value, 100);

    let mut kinds = Vec::new();
    for command in &commands {
        match command {
            ServerCommand::ConfigStringChunk { index, kind, chunk } => {
                assert_eq!(*index, 21);
                assert!(chunk.len() <= 99);
                kinds.push(*kind);
            }
            other => panic!("expected a chunk, got {other:?}"),
        }
    }
    assert_eq!(kinds[0], ChunkKind::Begin);
    assert_eq!(*kinds.last().unwrap(), ChunkKind::End);
    assert!(kinds[1..kinds.len() - 1].iter().all(|kind| *kind == ChunkKind::Middle));

    let mut reassembler = ChunkReassembler::new();
    let mut completed = None;
    for command in &commands {
        if let Some(update) = reassembler.feed(command).unwrap() {
            completed = Some(update);
        }
    }
    assert_eq!(completed, Some((21, value)));
}

/// The full client handshake against a live level: CONNECTED via the
/// reconnect-capable slot table, PRIMED via the gamestate dump, ACTIVE via
/// begin, with a long configstring delivered chunked along the way.
#[test]
fn test_full_handshake_with_chunked_configstring() {
    let mut server = make_server(ServerSettings::default());
    server.spawn("arena1", SpawnFlags::default()).unwrap();

    let long_value: String = "x".repeat(MAX_CHUNK_BOUND * 2 + 17);
    server.set_configstring(300, Some(&long_value)).unwrap();

    assert!(server.connect_client(2, RemoteKind::Human, "\\name\\walker").unwrap());
    server.send_gamestate(2).unwrap();
    server.client_begin(2).unwrap();
    assert_eq!(server.ctx.clients[2].state, ClientState::Active);

    // Replay the reliable queue through a client-side reassembler; the
    // long value must arrive intact.
    let mut reassembler = ChunkReassembler::new();
    let mut received = std::collections::BTreeMap::new();
    for command in &server.ctx.clients[2].commands {
        if let Some((index, value)) = reassembler.feed(command).unwrap() {
            received.insert(index, value);
        }
    }
    assert_eq!(received.get(&300), Some(&long_value));
    assert!(received.contains_key(&CS_SERVERINFO));
}

/// A spawn parked on a deferred storage restart completes through the frame
/// queue, and clients connected before the map change survive it.
#[test]
fn test_deferred_restart_spawn_end_to_end() {
    let mut server = make_server(ServerSettings::default());
    server.startup().unwrap();
    assert!(server.connect_client(0, RemoteKind::Human, "\\name\\patient").unwrap());

    server.assets.defer_restart = true;
    server.spawn("arena1", SpawnFlags::default()).unwrap();
    assert_eq!(server.ctx.spawn_phase, SpawnPhase::AwaitingAsyncResume);
    assert_eq!(server.level.state, LevelState::Dead);

    server.storage_restart_complete();
    server.run_frame(FRAME_STEP_MS).unwrap();

    assert_eq!(server.level.state, LevelState::Game);
    assert_eq!(server.ctx.clients[0].state, ClientState::Connected);
    assert_eq!(server.vars.get("mapname"), "arena1");
}

/// Two consecutive map changes: surviving clients are reconnected each
/// time and dropped back to CONNECTED for a fresh gamestate.
#[test]
fn test_back_to_back_map_changes() {
    let mut server = make_server(ServerSettings::default());
    server.assets.maps.insert("arena2".to_owned(), 0x0dd5_0dd5);

    server.spawn("arena1", SpawnFlags::default()).unwrap();
    assert!(server.connect_client(0, RemoteKind::Human, "\\name\\regular").unwrap());
    server.send_gamestate(0).unwrap();
    server.client_begin(0).unwrap();
    assert_eq!(server.ctx.clients[0].state, ClientState::Active);

    server.run_frame(FRAME_STEP_MS).unwrap();
    server.spawn("arena2", SpawnFlags::default()).unwrap();

    // Active clients drop back to CONNECTED and wait for a fresh gamestate.
    assert_eq!(server.ctx.clients[0].state, ClientState::Connected);
    assert_eq!(server.vars.get("mapname"), "arena2");
    // Reconnect call was replayed with first_time = false.
    assert!(server.game.connects.contains(&(0, false, false)));
}
