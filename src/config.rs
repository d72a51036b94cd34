//! Board settings and configuration paths.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::entities::{PlaceholderStyle, SequenceSource};

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "reelboard.json";

/// One panel on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSettings {
    pub name: String,
    #[serde(flatten)]
    pub source: SequenceSource,
    /// Per-panel frame delay; board default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_ms: Option<u32>,
}

impl PanelSettings {
    pub fn new(name: impl Into<String>, source: SequenceSource) -> Self {
        Self {
            name: name.into(),
            source,
            speed_ms: None,
        }
    }
}

/// Board settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    // Playback
    pub frame_count: usize,     // Frames per player sequence
    pub speed_ms: u32,          // Default per-frame delay
    pub global_speed_ms: u32,   // Coordinator delay
    pub min_speed_ms: u32,
    pub max_speed_ms: u32,
    pub redraw_interval_ms: u64, // Expanded view redraw tick

    // Surfaces
    pub panel_size: [u32; 2],
    pub expanded_size: [u32; 2],
    pub placeholder: PlaceholderStyle,

    // Resources
    pub resource_root: PathBuf, // Frame references resolve against this
    pub workers_override: u32,  // 0 = auto

    pub panels: Vec<PanelSettings>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            frame_count: 24,
            speed_ms: 500,
            global_speed_ms: 500,
            min_speed_ms: 16,
            max_speed_ms: 5000,
            redraw_interval_ms: 16,
            panel_size: [400, 400],
            expanded_size: [960, 640],
            placeholder: PlaceholderStyle::default(),
            resource_root: PathBuf::from("."),
            workers_override: 0,
            panels: default_panels(),
        }
    }
}

/// Five panels whose sources are not shipped, so they come up as placeholders
fn default_panels() -> Vec<PanelSettings> {
    (1..=5)
        .map(|n| {
            PanelSettings::new(
                format!("Panel {}", n),
                SequenceSource::new(format!("frames/p{}/cover.png", n), format!("frames/p{}/frame.####.png", n)),
            )
        })
        .collect()
}

impl BoardSettings {
    /// Fix values the board cannot run with, logging each correction.
    pub fn sanitize(&mut self) {
        if self.min_speed_ms == 0 {
            warn!("min_speed_ms must be positive, using 1");
            self.min_speed_ms = 1;
        }
        if self.max_speed_ms < self.min_speed_ms {
            warn!(
                "max_speed_ms {} below min_speed_ms {}, raising",
                self.max_speed_ms, self.min_speed_ms
            );
            self.max_speed_ms = self.min_speed_ms;
        }
        if self.frame_count == 0 {
            warn!("frame_count must be positive, using 1");
            self.frame_count = 1;
        }
        if self.redraw_interval_ms == 0 {
            warn!("redraw_interval_ms must be positive, using 16");
            self.redraw_interval_ms = 16;
        }

        self.speed_ms = self.clamp_speed(self.speed_ms);
        self.global_speed_ms = self.clamp_speed(self.global_speed_ms);
        let (lo, hi) = self.speed_bounds();
        for panel in &mut self.panels {
            if let Some(ms) = panel.speed_ms {
                panel.speed_ms = Some(ms.clamp(lo, hi));
            }
        }
    }

    /// Clamp a frame delay into the configured bounds, warning when it moves.
    pub fn clamp_speed(&self, speed_ms: u32) -> u32 {
        let (lo, hi) = self.speed_bounds();
        let clamped = speed_ms.clamp(lo, hi);
        if clamped != speed_ms {
            warn!(
                "Speed {}ms out of range {}..={}, using {}ms",
                speed_ms, self.min_speed_ms, self.max_speed_ms, clamped
            );
        }
        clamped
    }

    fn speed_bounds(&self) -> (u32, u32) {
        (self.min_speed_ms, self.max_speed_ms.max(self.min_speed_ms))
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms)
    }

    /// Loader thread count
    pub fn worker_threads(&self) -> usize {
        match self.workers_override {
            0 => (num_cpus::get() * 3 / 4).max(1),
            n => n as usize,
        }
    }

    /// Read settings from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let mut settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        settings.sanitize();
        info!("Loaded settings from {} ({} panels)", path.display(), settings.panels.len());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write settings: {}", path.display()))?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }
}

/// Configuration for overriding default paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (REELBOARD_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var("REELBOARD_CONFIG_DIR").ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a file in the config directory
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. REELBOARD_CONFIG_DIR environment variable
/// 3. Current directory IF reelboard.json exists there
/// 4. Platform config directory from dirs-next
///
/// Platform paths:
/// - Linux: ~/.config/reelboard/{name}
/// - macOS: ~/Library/Application Support/reelboard/{name}
/// - Windows: %APPDATA%\reelboard\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Create the config directory if needed
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let dir = get_config_dir(config);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    }
    Ok(())
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir()
        && current_dir.join(SETTINGS_FILE).exists()
    {
        return current_dir;
    }

    if let Some(dir) = dirs_next::config_dir() {
        return dir.join("reelboard");
    }

    // Fallback: "." if everything else fails
    PathBuf::from(".")
}
