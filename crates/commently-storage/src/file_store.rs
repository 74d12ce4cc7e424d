//! File system storage for comment tables

use commently_core::comment::{Comment, CommentChange, CommenterKey, NewComment};
use commently_core::error::{CommentlyError, Result};
use commently_core::reaction::{Reaction, ReactionState, ReactionToggle};
use commently_core::store::{CascadeOutcome, CommentStore, Tables};
use commently_core::types::{CommentId, MorphRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Current on-disk format version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const DATA_FILE: &str = "comments.json";

/// On-disk envelope around the tables
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreFile {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub tables: Tables,
}

/// File system based comment store
///
/// All tables live in one JSON document. Writes go to a temp file that is
/// renamed over the data file; the in-memory copy is only replaced once the
/// rename succeeded.
pub struct FileSystemStore {
    /// Base directory for the data file
    base_dir: PathBuf,
    /// Loaded tables, also the write lock
    tables: Mutex<Tables>,
}

impl FileSystemStore {
    /// Open (or create) a store in `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        ensure_dir(&base_dir)?;

        let data_path = base_dir.join(DATA_FILE);
        let tables = if data_path.exists() {
            read_tables(&data_path)?
        } else {
            debug!("No data file at {:?}, starting empty", data_path);
            Tables::new()
        };

        Ok(Self {
            base_dir,
            tables: Mutex::new(tables),
        })
    }

    /// Open the store in the platform data directory
    pub fn default_location() -> Result<Self> {
        Self::new(default_data_dir())
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Path of the JSON data file
    pub fn data_path(&self) -> PathBuf {
        self.base_dir.join(DATA_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        self.base_dir.join(format!(".{}.tmp", DATA_FILE))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| CommentlyError::Storage("file store lock poisoned".to_string()))
    }

    /// Run `op` on a copy of the tables, persist it, then publish it
    fn transact<R>(&self, op: impl FnOnce(&mut Tables) -> Result<R>) -> Result<R> {
        let mut guard = self.lock()?;
        let mut working = guard.clone();
        let out = op(&mut working)?;
        self.atomic_write(&working)?;
        *guard = working;
        Ok(out)
    }

    fn read<R>(&self, op: impl FnOnce(&Tables) -> R) -> Result<R> {
        Ok(op(&*self.lock()?))
    }

    /// Write tables atomically (write to temp, then rename)
    fn atomic_write(&self, tables: &Tables) -> Result<()> {
        let temp_path = self.temp_path();
        let final_path = self.data_path();

        let file = StoreFile {
            schema_version: CURRENT_SCHEMA_VERSION,
            saved_at: Utc::now(),
            tables: tables.clone(),
        };

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            CommentlyError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush()?;

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            CommentlyError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        debug!("Saved comment tables to {:?}", final_path);
        Ok(())
    }
}

/// Platform data directory, falling back to `~/.commently`
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "commently", "commently")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".commently")
        })
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            CommentlyError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create data directory: {}", e),
            ))
        })?;
        debug!("Created data directory: {:?}", dir);
    }
    Ok(())
}

fn read_tables(path: &Path) -> Result<Tables> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let store_file: StoreFile = serde_json::from_reader(reader)?;

    if store_file.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CommentlyError::UnsupportedSchemaVersion(
            store_file.schema_version,
        ));
    }

    info!(
        "Loaded {} comments and {} reactions from {:?}",
        store_file.tables.comment_count(),
        store_file.tables.reaction_count(),
        path
    );
    Ok(store_file.tables)
}

impl CommentStore for FileSystemStore {
    fn register_commentable(&self, target: &MorphRef) -> Result<()> {
        if self.read(|t| t.has_commentable(target))? {
            return Ok(());
        }
        self.transact(|t| {
            t.register_commentable(target.clone());
            Ok(())
        })
    }

    fn has_commentable(&self, target: &MorphRef) -> Result<bool> {
        self.read(|t| t.has_commentable(target))
    }

    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        self.read(|t| t.comment(id).cloned())
    }

    fn comments_on(&self, target: &MorphRef) -> Result<Vec<Comment>> {
        self.read(|t| t.comments_on(target))
    }

    fn replies_to(&self, parent: CommentId) -> Result<Vec<Comment>> {
        self.read(|t| t.replies_to(parent))
    }

    fn count_for_commenter(&self, target: &MorphRef, commenter: &CommenterKey) -> Result<usize> {
        self.read(|t| t.count_for_commenter(target, commenter))
    }

    fn count_replies_for_commenter(
        &self,
        parent: CommentId,
        commenter: &CommenterKey,
    ) -> Result<usize> {
        self.read(|t| t.count_replies_for_commenter(parent, commenter))
    }

    fn insert_comment(&self, comment: NewComment, limit: Option<usize>) -> Result<Comment> {
        self.transact(|t| t.insert_comment(comment, limit, Utc::now()))
    }

    fn update_comment(&self, id: CommentId, change: CommentChange) -> Result<Comment> {
        self.transact(|t| t.update_comment(id, change, Utc::now()))
    }

    fn delete_comment(&self, id: CommentId) -> Result<CascadeOutcome> {
        self.transact(|t| t.delete_comment(id))
    }

    fn toggle_reaction(&self, toggle: ReactionToggle) -> Result<ReactionState> {
        self.transact(|t| t.toggle_reaction(toggle, Utc::now()))
    }

    fn reactions_on(&self, comment_id: CommentId) -> Result<Vec<Reaction>> {
        self.read(|t| t.reactions_on(comment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::{IpAddr, Ipv4Addr};
    use tempfile::TempDir;

    fn create_test_store() -> (FileSystemStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn post() -> MorphRef {
        MorphRef::new("posts", 1)
    }

    fn new_comment(reply_id: Option<CommentId>) -> NewComment {
        NewComment {
            commentable: post(),
            commenter: None,
            reply_id,
            text: "hello".to_string(),
            guest_name: Some("Alice".to_string()),
            guest_email: None,
            approved: true,
            ip_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }

    #[test]
    fn test_store_creation() {
        let (store, _temp) = create_test_store();
        assert!(store.base_dir().exists());
        assert!(!store.data_path().exists());
    }

    #[test]
    fn test_persists_across_reopen() {
        let (store, temp) = create_test_store();
        store.register_commentable(&post()).unwrap();
        let comment = store.insert_comment(new_comment(None), None).unwrap();
        store
            .toggle_reaction(ReactionToggle {
                comment_id: comment.id,
                user: None,
                ip_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
                reaction_type: "like".to_string(),
            })
            .unwrap();
        drop(store);

        let reopened = FileSystemStore::new(temp.path()).unwrap();
        assert!(reopened.has_commentable(&post()).unwrap());
        assert_eq!(reopened.get_comment(comment.id).unwrap(), Some(comment));
        assert_eq!(reopened.reactions_on(CommentId(1)).unwrap().len(), 1);

        // ids keep counting after reopen
        let next = reopened.insert_comment(new_comment(None), None).unwrap();
        assert_eq!(next.id, CommentId(2));
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let (store, _temp) = create_test_store();
        store.register_commentable(&post()).unwrap();
        store.insert_comment(new_comment(None), Some(1)).unwrap();

        let before = fs::read_to_string(store.data_path()).unwrap();
        assert!(store.insert_comment(new_comment(None), Some(1)).is_err());
        let after = fs::read_to_string(store.data_path()).unwrap();

        assert_eq!(before, after);
        assert_eq!(store.comments_on(&post()).unwrap().len(), 1);
    }

    #[test]
    fn test_cascade_delete_persisted() {
        let (store, temp) = create_test_store();
        store.register_commentable(&post()).unwrap();
        let parent = store.insert_comment(new_comment(None), None).unwrap();
        store.insert_comment(new_comment(Some(parent.id)), None).unwrap();
        store.insert_comment(new_comment(Some(parent.id)), None).unwrap();

        let outcome = store.delete_comment(parent.id).unwrap();
        assert_eq!(outcome.comment_ids.len(), 3);

        let reopened = FileSystemStore::new(temp.path()).unwrap();
        assert!(reopened.comments_on(&post()).unwrap().is_empty());
        assert!(reopened.replies_to(parent.id).unwrap().is_empty());
    }

    #[test]
    fn test_atomic_write() {
        let (store, _temp) = create_test_store();
        store.register_commentable(&post()).unwrap();

        assert!(!store.temp_path().exists());
        assert!(store.data_path().exists());

        let content = fs::read_to_string(store.data_path()).unwrap();
        assert!(content.contains("schema_version"));
        assert!(content.contains("posts"));
    }

    #[test]
    fn test_rejects_newer_schema() {
        let (store, temp) = create_test_store();
        store.register_commentable(&post()).unwrap();

        let content = fs::read_to_string(store.data_path()).unwrap();
        let bumped = content.replacen("\"schema_version\": 1", "\"schema_version\": 99", 1);
        fs::write(store.data_path(), bumped).unwrap();

        let err = FileSystemStore::new(temp.path()).err().unwrap();
        assert!(matches!(err, CommentlyError::UnsupportedSchemaVersion(99)));
    }

    #[test]
    fn test_default_data_dir() {
        let dir = default_data_dir();
        assert!(dir.is_absolute() || dir.starts_with("."));
        assert!(dir.to_string_lossy().to_lowercase().contains("commently"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(DATA_FILE), "not json").unwrap();
        assert!(FileSystemStore::new(temp.path()).is_err());
    }
}
