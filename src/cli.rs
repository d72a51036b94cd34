use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Run length when neither `-d` nor `-i` is given
const DEFAULT_DURATION_MS: u64 = 3000;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Decode: image 0.25 (png, jpeg, tiff, tga, exr, hdr)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Board of looping image-sequence players, run headless
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Settings file (default: reelboard.json in the config directory)
    #[arg(short = 'C', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// How long to run the board, in milliseconds (default: 3000, or until
    /// stdin closes with --interactive)
    #[arg(short = 'd', long = "duration-ms", value_name = "MS")]
    pub duration_ms: Option<u64>,

    /// Start global synchronized playback, optionally with a speed in ms per frame
    #[arg(short = 'g', long = "global", value_name = "MS")]
    pub global: Option<Option<u32>>,

    /// Play every panel on its own timer
    #[arg(short = 'a', long = "play")]
    pub play: bool,

    /// Show panel N (1-based) in the expanded view
    #[arg(short = 'x', long = "expand", value_name = "N")]
    pub expand: Option<u32>,

    /// Save final panel and expanded canvases as PNG into DIR
    #[arg(short = 's', long = "snapshot-dir", value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit
    #[arg(long = "write-config")]
    pub write_config: bool,

    /// Read intents from stdin, one per line (e.g. "play 1", "global play 200")
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Enable debug logging to file (default: reelboard.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

/// When the host loop stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLimit {
    For(Duration),
    UntilInputCloses,
}

impl Args {
    /// An explicit `-d` always wins; otherwise interactive sessions last as
    /// long as their input.
    pub fn run_limit(&self) -> RunLimit {
        match (self.duration_ms, self.interactive) {
            (Some(ms), _) => RunLimit::For(Duration::from_millis(ms)),
            (None, true) => RunLimit::UntilInputCloses,
            (None, false) => RunLimit::For(Duration::from_millis(DEFAULT_DURATION_MS)),
        }
    }
}
