use image::{ImageError, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::io::{encode_jpeg, encode_png, make_thumbnail};

// ============================================================================
// SAVED PICTURES STORE
// ============================================================================

/// Magic header for the store file
const STORE_MAGIC: &str = "HPS1";

/// One saved painting: the full image plus a small preview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPicture {
    pub id: String,
    /// PNG-encoded full image
    pub image_png: Vec<u8>,
    /// JPEG-encoded thumbnail
    pub thumbnail_jpeg: Vec<u8>,
    /// Seconds since the Unix epoch
    pub created_at: u64,
}

/// Serializable store file
#[derive(Serialize, Deserialize)]
struct StoreFile {
    magic: String,
    pictures: Vec<SavedPicture>,
}

/// Error type for store operations
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
    Encode(ImageError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Serialize(e) => write!(f, "Serialization error: {}", e),
            StoreError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
            StoreError::Encode(e) => write!(f, "Encode error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for StoreError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        StoreError::Serialize(e.to_string())
    }
}

impl From<ImageError> for StoreError {
    fn from(e: ImageError) -> Self {
        StoreError::Encode(e)
    }
}

/// Saved pictures kept newest-first in a single file.
pub struct PictureStore {
    path: PathBuf,
    pictures: Vec<SavedPicture>,
}

impl PictureStore {
    /// `<data dir>/HousePaint/saved_pictures.bin`
    ///
    /// The data dir is `%APPDATA%` on Windows, `~/Library/Application Support`
    /// on macOS and `$XDG_DATA_HOME` (or `~/.local/share`) elsewhere. Falls back
    /// to the working directory when none of those variables is set.
    pub fn default_location() -> PathBuf {
        data_dir().join("HousePaint").join("saved_pictures.bin")
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let pictures = match std::fs::read(&path) {
            Ok(raw) => Self::decode(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, pictures })
    }

    fn decode(raw: &[u8]) -> Result<Vec<SavedPicture>, StoreError> {
        // bincode encodes a String as: 8-byte length prefix + UTF-8 data.
        if raw.len() < 12 || &raw[8..12] != STORE_MAGIC.as_bytes() {
            return Err(StoreError::InvalidFormat("missing store header".into()));
        }
        let file: StoreFile = bincode::deserialize(raw)?;
        Ok(file.pictures)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All pictures, newest first.
    pub fn list(&self) -> &[SavedPicture] {
        &self.pictures
    }

    pub fn get(&self, id: &str) -> Option<&SavedPicture> {
        self.pictures.iter().find(|p| p.id == id)
    }

    /// Encode `image` with a thumbnail, insert it at the front and persist.
    pub fn save(
        &mut self,
        image: &RgbaImage,
        thumbnail_max_size: u32,
        thumbnail_quality: u8,
    ) -> Result<SavedPicture, StoreError> {
        let thumbnail = make_thumbnail(image, thumbnail_max_size);
        let picture = SavedPicture {
            id: Uuid::new_v4().to_string(),
            image_png: encode_png(image)?,
            thumbnail_jpeg: encode_jpeg(&thumbnail, thumbnail_quality)?,
            created_at: unix_seconds(),
        };
        self.pictures.insert(0, picture.clone());
        if let Err(e) = self.flush() {
            self.pictures.remove(0);
            return Err(e);
        }
        crate::log_info!("Saved picture {} to {}", picture.id, self.path.display());
        Ok(picture)
    }

    /// Remove a picture. Returns `false` when no picture has that id.
    ///
    /// The picture stays in the store when the file cannot be rewritten.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(index) = self.pictures.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        let removed = self.pictures.remove(index);
        if let Err(e) = self.flush() {
            self.pictures.insert(index, removed);
            return Err(e);
        }
        crate::log_info!("Deleted picture {}", id);
        Ok(true)
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = StoreFile {
            magic: STORE_MAGIC.to_string(),
            pictures: self.pictures.clone(),
        };
        let mut writer = BufWriter::new(File::create(&self.path)?);
        bincode::serialize_into(&mut writer, &file)?;
        writer.flush()?;
        Ok(())
    }
}

fn data_dir() -> PathBuf {
    let var = |name: &str| std::env::var_os(name).map(PathBuf::from);
    if cfg!(target_os = "windows") {
        if let Some(appdata) = var("APPDATA") {
            return appdata;
        }
    } else if cfg!(target_os = "macos") {
        if let Some(home) = var("HOME") {
            return home.join("Library").join("Application Support");
        }
    }
    var("XDG_DATA_HOME")
        .or_else(|| var("HOME").map(|home| home.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Seconds since the Unix epoch (0 if the clock is before it).
pub(crate) fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `YYYY-MM-DD` (UTC) for a Unix timestamp.
pub fn format_date(created_at: u64) -> String {
    // Days-to-civil conversion (proleptic Gregorian calendar)
    let days = (created_at / 86_400) as i64 + 719_468;
    let era = days.div_euclid(146_097);
    let doe = days.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!("{:04}-{:02}-{:02}", year, month, day)
}
