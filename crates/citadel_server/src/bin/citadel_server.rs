//! # CITADEL Standalone Server
//!
//! Runs the lifecycle engine against the in-memory stub collaborators:
//! spawns a map, simulates a couple of clients through their connection
//! handshake, and drives frames.
//!
//! ## Usage
//!
//! ```bash
//! citadel-server --map arena1 --frames 100 --settings server.toml
//! ```

use std::path::Path;

use citadel_server::integration::stubs::{
    CountingObserver, MemoryVarStore, StubAssets, StubDemo, StubGame, StubWorld,
};
use citadel_server::{RemoteKind, Server, ServerSettings, SpawnFlags};
use citadel_shared::constants::{FRAME_STEP_MS, MAX_ENTITIES};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         CITADEL SERVER                                           ║");
    println!("║         THE AUTHORITATIVE LEVEL                                  ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    // Parse command line arguments (simple parsing, no external deps)
    let args: Vec<String> = std::env::args().collect();
    let mut map = "arena1".to_owned();
    let mut frames = 50u32;
    let mut settings_path: Option<String> = None;
    let mut kill_bots = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--map" | "-m" => {
                if i + 1 < args.len() {
                    map = args[i + 1].clone();
                    i += 1;
                }
            }
            "--frames" | "-f" => {
                if i + 1 < args.len() {
                    frames = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--settings" | "-s" => {
                if i + 1 < args.len() {
                    settings_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--kill-bots" => {
                kill_bots = true;
            }
            "--help" | "-h" => {
                println!("Usage: citadel-server [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -m, --map <NAME>           Map to spawn (default: arena1)");
                println!("  -f, --frames <NUM>         Frames to run (default: 50)");
                println!("  -s, --settings <FILE>      TOML settings file");
                println!("      --kill-bots            Drop bots during the spawn");
                println!("  -h, --help                 Show this help");
                return;
            }
            _ => {}
        }
        i += 1;
    }

    let settings = match settings_path {
        Some(ref path) => match ServerSettings::load(Path::new(path)) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("failed to load settings from {path}: {err}");
                std::process::exit(1);
            }
        },
        None => ServerSettings::default(),
    };

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Map:                {map}");
    println!("│ Max Clients:        {}", settings.max_clients);
    println!("│ Pure:               {}", settings.pure);
    println!("│ Frames:             {frames}");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let mut assets = StubAssets::with_map(&map, 0x5ca1_ab1e);
    assets.loaded = "1287489123 948213755".to_owned();
    assets.referenced_checksums = "1287489123".to_owned();
    assets.referenced_names = "base".to_owned();

    let mut server = Server::new(
        settings,
        StubGame::new(),
        StubWorld::new(MAX_ENTITIES),
        assets,
        StubDemo::default(),
        CountingObserver::default(),
        MemoryVarStore::new(),
    );

    println!("Spawning {map}...");
    if let Err(err) = server.spawn(&map, SpawnFlags { kill_bots }) {
        eprintln!("spawn failed: {err}");
        std::process::exit(1);
    }

    // Walk two simulated clients through the connection handshake.
    for (slot, userinfo) in [(0, "\\name\\alpha\\rate\\25000"), (1, "\\name\\beta\\rate\\25000")] {
        match server.connect_client(slot, RemoteKind::Human, userinfo) {
            Ok(true) => {
                if let Err(err) =
                    server.send_gamestate(slot).and_then(|()| server.client_begin(slot))
                {
                    eprintln!("handshake for slot {slot} failed: {err}");
                }
            }
            Ok(false) => println!("slot {slot} denied by game logic"),
            Err(err) => {
                eprintln!("connect failed: {err}");
                std::process::exit(1);
            }
        }
    }

    for _ in 0..frames {
        if let Err(err) = server.run_frame(FRAME_STEP_MS) {
            eprintln!("frame failed: {err}");
            std::process::exit(1);
        }
    }

    println!();
    println!("┌─ RESULT ────────────────────────────────────────────────────────┐");
    println!("│ Level State:        {:?}", server.level.state);
    println!("│ Level Time:         {} ms", server.level.time);
    println!("│ Server Id:          {}", server.level.server_id);
    println!("│ Game Frames:        {}", server.game.frames);
    println!("│ Serverinfo:         {}", server.get_configstring(0).unwrap_or("<bad>"));
    println!("│ Pure Enforcement:   {}", server.pure_active());
    println!("└──────────────────────────────────────────────────────────────────┘");

    server.shutdown("server exiting");
}
