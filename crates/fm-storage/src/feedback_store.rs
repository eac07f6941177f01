//! File system storage for feedback

use fm_core::error::{ModerationError, Result};
use fm_core::feedback::Feedback;
use fm_core::store::{next_revision, FeedbackFile, FeedbackMigrator, FeedbackStorage, CURRENT_SCHEMA_VERSION};
use fm_core::types::FeedbackId;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lock file guarding writes to the feedback directory
const LOCK_FILE: &str = ".lock";

/// File system based feedback storage
///
/// One JSON file per feedback item. Inserts and lock-version checked saves
/// hold an exclusive lock on `feedback/.lock` for the whole
/// read-compare-write, so every handle on the directory (in this process or
/// another) sees a consistent version.
pub struct FileSystemStorage {
    /// Base directory for storage
    base_dir: PathBuf,
    /// Feedback subdirectory
    feedback_dir: PathBuf,
}

impl FileSystemStorage {
    /// Create a new file system storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let feedback_dir = base_dir.join("feedback");

        let storage = Self {
            base_dir,
            feedback_dir,
        };

        storage.ensure_dirs()?;
        Ok(storage)
    }

    /// Per-user data directory, falling back to ~/.feedback-moderator
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("org", "feedback-moderator", "feedback-moderator")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".feedback-moderator")
            })
    }

    /// Ensure required directories exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.feedback_dir.exists() {
            fs::create_dir_all(&self.feedback_dir).map_err(|e| {
                ModerationError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create feedback directory: {}", e),
                ))
            })?;
            debug!("Created feedback directory: {:?}", self.feedback_dir);
        }
        Ok(())
    }

    /// Take the directory write lock; released when the file is dropped
    fn lock(&self) -> Result<fs::File> {
        let path = self.feedback_dir.join(LOCK_FILE);
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| {
                ModerationError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to open lock file {:?}: {}", path, e),
                ))
            })?;
        file.lock()?;
        Ok(file)
    }

    /// Get the path for a feedback file
    fn feedback_path(&self, id: &FeedbackId) -> PathBuf {
        self.feedback_dir.join(format!("{}.json", id))
    }

    /// Get a temporary path for atomic writes
    fn temp_path(&self, id: &FeedbackId) -> PathBuf {
        self.feedback_dir.join(format!(".{}.json.tmp", id))
    }

    /// Write feedback atomically (write to temp, then rename)
    fn atomic_write(&self, feedback: &Feedback) -> Result<()> {
        let temp_path = self.temp_path(&feedback.id);
        let final_path = self.feedback_path(&feedback.id);

        let file = FeedbackFile::new(feedback.clone());

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            ModerationError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush()?;

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ModerationError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        debug!(
            "Saved feedback {} (version {}, {}) to {:?}",
            feedback.id, feedback.lock_version, feedback.state, final_path
        );
        Ok(())
    }

    /// Read and parse a feedback file
    fn read_feedback(&self, path: &Path) -> Result<Feedback> {
        let file = fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                let id = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown");
                ModerationError::FeedbackNotFound(id.to_string())
            } else {
                ModerationError::Io(e)
            }
        })?;

        let reader = BufReader::new(file);
        let feedback_file: FeedbackFile = serde_json::from_reader(reader)?;

        let migrated = if FeedbackMigrator::needs_migration(&feedback_file) {
            info!(
                "Migrating feedback from schema {} to {}",
                feedback_file.schema_version, CURRENT_SCHEMA_VERSION
            );
            FeedbackMigrator::migrate(feedback_file)?
        } else {
            feedback_file
        };

        Ok(migrated.into_feedback())
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get feedback directory
    pub fn feedback_dir(&self) -> &PathBuf {
        &self.feedback_dir
    }
}

impl FeedbackStorage for FileSystemStorage {
    fn insert(&self, feedback: &Feedback) -> Result<Feedback> {
        let _guard = self.lock()?;
        if self.exists(&feedback.id) {
            return Err(ModerationError::Validation(format!(
                "Feedback with ID {} already exists",
                feedback.id
            )));
        }

        let mut stored = feedback.clone();
        stored.lock_version = 0;
        self.atomic_write(&stored)?;
        Ok(stored)
    }

    fn save(&self, feedback: &Feedback) -> Result<Feedback> {
        let _guard = self.lock()?;
        let current = self.read_feedback(&self.feedback_path(&feedback.id))?;
        let next = next_revision(&current, feedback).map_err(|e| {
            warn!("Rejected stale write to feedback {}: {}", feedback.id, e);
            e
        })?;
        self.atomic_write(&next)?;
        Ok(next)
    }

    fn load(&self, id: &FeedbackId) -> Result<Feedback> {
        self.read_feedback(&self.feedback_path(id))
    }

    fn list(&self) -> Result<Vec<Feedback>> {
        let mut items = Vec::new();

        let entries = fs::read_dir(&self.feedback_dir).map_err(|e| {
            ModerationError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read feedback directory: {}", e),
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            // Skip non-json files and temp files
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match self.read_feedback(&path) {
                Ok(feedback) => items.push(feedback),
                Err(e) => {
                    warn!("Failed to read feedback file {:?}: {}", path, e);
                }
            }
        }

        Ok(items)
    }

    fn exists(&self, id: &FeedbackId) -> bool {
        self.feedback_path(id).exists()
    }
}
