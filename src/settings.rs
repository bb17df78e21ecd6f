use std::path::{Path, PathBuf};

use crate::components::history::DEFAULT_MAX_ENTRIES;
use crate::io::MAX_THUMBNAIL_SIZE;
use crate::ops::DEFAULT_TOLERANCE;
use crate::store::PictureStore;

/// Settings that persist across sessions
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Flood fill tolerance (max per-channel difference, 0 = exact match)
    pub tolerance: u32,
    /// Maximum number of undo steps
    pub max_undo_steps: usize,
    /// Longest side of saved-picture thumbnails, in pixels
    pub thumbnail_max_size: u32,
    /// JPEG quality for thumbnails (1–100)
    pub thumbnail_quality: u8,
    /// Saved pictures store file. Empty string = platform data directory.
    pub store_path: String,
    /// Custom palette file. Empty string = built-in palette.
    pub palette_path: String,
    /// Session log file. Empty string = `housepaint.log` next to the store.
    pub log_path: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_undo_steps: DEFAULT_MAX_ENTRIES,
            thumbnail_max_size: 300,
            thumbnail_quality: 70,
            store_path: String::new(),
            palette_path: String::new(),
            log_path: String::new(),
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/housepaint/housepaint_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\HousePaint\housepaint_settings.cfg
    /// On macOS:   ~/Library/Application Support/HousePaint/housepaint_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("housepaint");
            return Some(config_dir.join("housepaint_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            return Some(PathBuf::from(appdata).join("HousePaint").join("housepaint_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("HousePaint")
                    .join("housepaint_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("housepaint_settings.cfg")))
        }
    }

    /// Serialize to the `key=value` file format
    pub fn to_config_string(&self) -> String {
        format!(
            "tolerance={}\n\
             max_undo_steps={}\n\
             thumbnail_max_size={}\n\
             thumbnail_quality={}\n\
             store_path={}\n\
             palette_path={}\n\
             log_path={}\n",
            self.tolerance,
            self.max_undo_steps,
            self.thumbnail_max_size,
            self.thumbnail_quality,
            self.store_path,
            self.palette_path,
            self.log_path,
        )
    }

    /// Parse `key=value` lines. Unknown keys are ignored and bad values keep the default.
    pub fn parse(content: &str) -> Self {
        let defaults = Self::default();
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "tolerance" => {
                    s.tolerance = val.parse().unwrap_or(defaults.tolerance);
                }
                "max_undo_steps" => {
                    s.max_undo_steps = val
                        .parse()
                        .ok()
                        .filter(|&n| n > 0)
                        .unwrap_or(defaults.max_undo_steps);
                }
                "thumbnail_max_size" => {
                    s.thumbnail_max_size = val
                        .parse()
                        .ok()
                        .filter(|n| (1..=MAX_THUMBNAIL_SIZE).contains(n))
                        .unwrap_or(defaults.thumbnail_max_size);
                }
                "thumbnail_quality" => {
                    s.thumbnail_quality = val
                        .parse()
                        .ok()
                        .filter(|q| (1..=100).contains(q))
                        .unwrap_or(defaults.thumbnail_quality);
                }
                "store_path" => {
                    s.store_path = val.to_string();
                }
                "palette_path" => {
                    s.palette_path = val.to_string();
                }
                "log_path" => {
                    s.log_path = val.to_string();
                }
                _ => {}
            }
        }
        s
    }

    /// Write settings to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Resolved location of the saved pictures store.
    pub fn store_file(&self) -> PathBuf {
        if self.store_path.is_empty() {
            PictureStore::default_location()
        } else {
            PathBuf::from(&self.store_path)
        }
    }

    /// Resolved location of the session log.
    pub fn log_file(&self) -> PathBuf {
        if !self.log_path.is_empty() {
            return PathBuf::from(&self.log_path);
        }
        let store = self.store_file();
        match store.parent() {
            Some(dir) => dir.join("housepaint.log"),
            None => PathBuf::from("housepaint.log"),
        }
    }
}
