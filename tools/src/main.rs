//! sim-runner: headless runner for the edge/fog/cloud simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 500 --data-dir ./data
//!   sim-runner --ipc-mode

use anyhow::Result;
use edgefog_core::{
    command::PlayerCommand,
    config::SimConfig,
    engine::SimEngine,
    snapshot::WorldSnapshot,
    taxonomy::TaxonomyCatalog,
    types::Tick,
    world::{AppCounters, TierState},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick {
        count: u64,
    },
    Command {
        cmd: String,
        payload: serde_json::Value,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick: Tick,
    paused: bool,
    seed: u64,
    events_logged: usize,
    world: WorldSnapshot,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed: Option<u64> = args
        .windows(2)
        .find(|w| w[0] == "--seed")
        .and_then(|w| w[1].parse().ok());
    let ticks = parse_arg(&args, "--ticks", 500u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let mut config = SimConfig::load(data_dir)?;
    if seed.is_some() {
        config.scenario.seed = seed;
    }
    let taxonomy = Arc::new(TaxonomyCatalog::load(data_dir)?);

    if !ipc_mode {
        println!("edge/fog/cloud sim-runner");
        println!("  seed:      {}", seed.map_or("random".to_string(), |s| s.to_string()));
        println!("  ticks:     {ticks}");
        println!("  data_dir:  {data_dir}");
        println!("  terms:     {}", taxonomy.term_count());
        println!();
    }

    let run_id = format!("run-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
    let mut engine = SimEngine::build(run_id, &config, taxonomy)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        engine.run_ticks(ticks)?;
        print_summary(&engine, ticks)?;
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                engine.run_ticks(count)?;
                write_state(&mut stdout, engine)?;
            }
            IpcCommand::GetState => {
                write_state(&mut stdout, engine)?;
            }
            IpcCommand::Command { cmd, payload } => match handle_command(engine, &cmd, payload) {
                Ok(()) => write_state(&mut stdout, engine)?,
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
        }
    }
    Ok(())
}

fn handle_command(engine: &mut SimEngine, cmd: &str, payload: serde_json::Value) -> Result<()> {
    let package_id = payload["package_id"].as_str().unwrap_or_default().to_string();
    let command = match cmd {
        "take_control" => PlayerCommand::TakeControl { package_id },
        "release_control" => PlayerCommand::ReleaseControl { package_id },
        _ => {
            log::warn!("Unknown command: {}", cmd);
            return Ok(());
        }
    };
    engine.apply_command(&command)?;
    Ok(())
}

fn write_state(stdout: &mut io::Stdout, engine: &SimEngine) -> Result<()> {
    let state = UiState {
        tick: engine.clock.current_tick,
        paused: engine.clock.paused,
        seed: engine.seed(),
        events_logged: engine.event_log().len(),
        world: engine.snapshot()?,
    };
    writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
    stdout.flush()?;
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(engine: &SimEngine, ticks: u64) -> Result<()> {
    let snapshot = engine.snapshot()?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", engine.run_id);
    println!("  seed:           {}", engine.seed());
    println!("  ticks run:      {ticks}");
    println!("  final tick:     {}", engine.clock.current_tick);
    println!("  packages:       {}", snapshot.packages.len());
    println!("  events logged:  {}", engine.event_log().len());
    if let Some(stats) = engine.dispatch_stats() {
        println!("  controller steps: {} (manual skips: {})", stats.steps, stats.skipped_manual);
    }

    println!();
    println!("=== TIER TRAFFIC ===");
    for place in &snapshot.places {
        match &place.state {
            TierState::Fog(counters) | TierState::Cloud(counters) => {
                println!("  {:<12} {:<5} {}", place.name, place.kind(), traffic_line(counters));
            }
            TierState::Edge(cache) => {
                let interop = cache
                    .interop
                    .as_ref()
                    .map_or("(none)".to_string(), |p| p.to_string());
                println!("  {:<12} {:<5} interop: {interop}", place.name, place.kind());
            }
            TierState::House => {}
        }
    }
    Ok(())
}

fn traffic_line(counters: &AppCounters) -> String {
    format!(
        "App1 {} pkts / {} B | App2 {} pkts / {} B",
        counters.app1.packets, counters.app1.bytes, counters.app2.packets, counters.app2.bytes,
    )
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
