use reelboard::Board;
use reelboard::cli::{Args, RunLimit};
use reelboard::config::{self, BoardSettings, PathConfig, SETTINGS_FILE};
use reelboard::core::{ExpandedCommand, GlobalCommand, Intent, IntentEmitter, SystemClock, Transport};
use reelboard::entities::{FileFetcher, PlayerId, RenderSurface};
use reelboard::widgets::{Canvas, LogControls};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest sleep between pumps
const MAX_IDLE: Duration = Duration::from_millis(16);

/// How long to wait for initial sequence loads
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create config directory: {}", e);
    }

    init_logging(&args, &path_config)?;
    info!("Reelboard starting...");
    debug!("Command-line args: {:?}", args);

    let settings_path = args
        .config
        .clone()
        .unwrap_or_else(|| config::config_file(SETTINGS_FILE, &path_config));
    info!("Settings path: {}", settings_path.display());
    let settings = BoardSettings::load(&settings_path)?;

    if args.write_config {
        settings.save(&settings_path)?;
        println!("{}", settings_path.display());
        return Ok(());
    }

    let mut board = build_board(settings)?;
    if !board.wait_for_loads(LOAD_TIMEOUT) {
        warn!("Starting with {} panels still loading", board.pending_loads());
    }

    let emitter = board.emitter();
    emit_startup_intents(&args, &board, &emitter);
    let input_open = args.interactive.then(|| spawn_stdin_reader(emitter));

    run(&mut board, args.run_limit(), input_open.as_deref());

    report(&board);
    if let Some(dir) = &args.snapshot_dir {
        write_snapshots(&board, dir)?;
    }
    Ok(())
}

/// Console logging honors RUST_LOG; `--log` switches to a file
fn init_logging(args: &Args, path_config: &PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::config_file("reelboard.log", path_config));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// Board with a raster canvas and logging controls per panel
fn build_board(settings: BoardSettings) -> Result<Board> {
    let fetcher = Arc::new(FileFetcher::new(settings.resource_root.clone()));
    let [ew, eh] = settings.expanded_size;
    let mut board = Board::new(
        settings.clone(),
        SystemClock::new(),
        fetcher,
        Box::new(Canvas::new("expanded", ew, eh)),
        Box::new(LogControls::new("expanded")),
    )
    .context("Failed to start loader threads")?;

    let [pw, ph] = settings.panel_size;
    for panel in &settings.panels {
        board.add_player(
            panel.name.clone(),
            panel.source.clone(),
            panel.speed_ms,
            Box::new(Canvas::new(panel.name.clone(), pw, ph)),
            Box::new(LogControls::new(panel.name.clone())),
        );
    }
    info!("{} panels queued for loading", settings.panels.len());
    Ok(board)
}

fn emit_startup_intents(args: &Args, board: &Board, emitter: &IntentEmitter) {
    if args.play {
        for id in board.players().keys() {
            emitter.emit(Intent::Player(*id, Transport::Play));
        }
    }
    if let Some(speed) = args.global {
        emitter.emit(Intent::Global(GlobalCommand::Activate(speed)));
    }
    if let Some(n) = args.expand {
        emitter.emit(Intent::Expanded(ExpandedCommand::Open(PlayerId(n))));
    }
}

/// Feed stdin lines into the intent queue until EOF. The returned flag
/// drops to false once stdin is closed.
fn spawn_stdin_reader(emitter: IntentEmitter) -> Arc<AtomicBool> {
    let open = Arc::new(AtomicBool::new(true));
    let reader_open = Arc::clone(&open);
    let spawned = std::thread::Builder::new()
        .name("reelboard-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Intent>() {
                    Ok(intent) => emitter.emit(intent),
                    Err(e) => warn!("Ignoring '{}': {}", line.trim(), e),
                }
            }
            debug!("stdin closed");
            reader_open.store(false, Ordering::Release);
        });
    if let Err(e) = spawned {
        warn!("Interactive input unavailable: {}", e);
        open.store(false, Ordering::Release);
    }
    open
}

/// Pump until the run limit is reached. Without a reader, an
/// input-bound run stops right away.
fn run(board: &mut Board, limit: RunLimit, input_open: Option<&AtomicBool>) {
    let end = match limit {
        RunLimit::For(duration) => Some(Instant::now() + duration),
        RunLimit::UntilInputCloses => None,
    };
    loop {
        // Sampled before the pump so the last lines read are still applied
        let input_closed = !input_open.is_some_and(|open| open.load(Ordering::Acquire));
        board.pump();
        let left = match end {
            Some(end) => end.saturating_duration_since(Instant::now()),
            None if input_closed => Duration::ZERO,
            None => MAX_IDLE,
        };
        if left.is_zero() {
            break;
        }
        let idle = board.time_until_next().unwrap_or(MAX_IDLE).min(MAX_IDLE).min(left);
        std::thread::sleep(idle);
    }
}

fn report(board: &Board) {
    for player in board.players().values() {
        let position = match player.current_index() {
            Some(i) => format!("frame {}/{}", i + 1, player.frame_count()),
            None => "cover".to_string(),
        };
        println!(
            "{:<12} {:?} {:?} {} @ {}ms{}",
            player.name(),
            player.load_state(),
            player.playback_state(),
            position,
            player.speed_ms(),
            if player.is_globally_driven() { " (global)" } else { "" }
        );
    }
    let coordinator = board.coordinator();
    if coordinator.is_active() {
        println!(
            "global: frame {} after {} ticks @ {}ms",
            coordinator.current_index() + 1,
            coordinator.ticks(),
            coordinator.speed_ms()
        );
    }
    if let Some(id) = board.expanded().bound() {
        println!("expanded: {} ({} redraws)", board.expanded().title(), board.expanded().redraws());
        debug!("expanded view bound to {}", id);
    }
}

fn write_snapshots(board: &Board, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for (id, player) in board.players() {
        save_surface(player.surface(), dir.join(format!("panel_{}.png", id.0)))?;
    }
    if board.expanded().is_visible() {
        save_surface(board.expanded().surface(), dir.join("expanded.png"))?;
    }
    info!("Snapshots written to {}", dir.display());
    Ok(())
}

fn save_surface(surface: &dyn RenderSurface, path: PathBuf) -> Result<()> {
    if let Some(raster) = surface.raster() {
        raster
            .save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }
    Ok(())
}
