//! tally-storage-json
//!
//! Filesystem JSON persistence for users and budgets. Every budget overwrite
//! first copies the previous file into a per-budget backup directory, keeping
//! the newest `retention` copies.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tally_core::{storage::BudgetStorage, CoreError};
use tally_domain::{Budget, User};
use tracing::{debug, warn};
use uuid::Uuid;

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
/// Backups written in the same millisecond take sequence numbers below this.
const MAX_BACKUPS_PER_TICK: u32 = 10_000;
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Directory layout for a storage root.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `<root>/users`, `<root>/budgets` and `<root>/backups`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            backup_root: root.join("backups"),
            data_root: root,
        }
    }
}

/// Describes a persisted backup of a budget file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub budget_id: Uuid,
    pub id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct JsonStorage {
    users_dir: PathBuf,
    budgets_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        let users_dir = paths.data_root.join("users");
        let budgets_dir = paths.data_root.join("budgets");
        fs::create_dir_all(&users_dir)?;
        fs::create_dir_all(&budgets_dir)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            users_dir,
            budgets_dir,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn user_path(&self, id: Uuid) -> PathBuf {
        record_path(&self.users_dir, id)
    }

    pub fn budget_path(&self, id: Uuid) -> PathBuf {
        record_path(&self.budgets_dir, id)
    }

    fn backup_dir(&self, budget_id: Uuid) -> PathBuf {
        self.backups_dir.join(budget_id.to_string())
    }

    /// Backups for a budget, newest first.
    pub fn list_backups(&self, budget_id: Uuid) -> Result<Vec<BackupInfo>, CoreError> {
        let dir = self.backup_dir(budget_id);
        let mut entries: Vec<BackupInfo> = json_files(&dir)?
            .into_iter()
            .filter_map(|path| {
                let id = path.file_name()?.to_str()?.to_string();
                Some(BackupInfo {
                    budget_id,
                    id,
                    path,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(entries)
    }

    /// Reads a backup and writes it back as the live budget.
    pub fn restore_backup(&self, backup: &BackupInfo) -> Result<Budget, CoreError> {
        let budget: Budget = read_json(&backup.path)?;
        if budget.id != backup.budget_id {
            return Err(CoreError::Storage(format!(
                "backup {} belongs to budget {}",
                backup.id, budget.id
            )));
        }
        self.save_budget(&budget)?;
        Ok(budget)
    }

    fn backup_existing_file(&self, budget_id: Uuid, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(budget_id);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let (backup_path, mut target) = create_unique_backup(&dir, &timestamp)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut target)?;
        target.sync_all()?;
        debug!(path = %backup_path.display(), "wrote budget backup");
        self.prune_backups(budget_id)
    }

    fn prune_backups(&self, budget_id: Uuid) -> Result<(), CoreError> {
        let entries = self.list_backups(budget_id)?;
        for entry in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(path = %entry.path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

fn create_unique_backup(dir: &Path, timestamp: &str) -> Result<(PathBuf, File), CoreError> {
    for seq in 0..MAX_BACKUPS_PER_TICK {
        let candidate = dir.join(format!("{timestamp}_{seq:04}.{FILE_EXTENSION}"));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((candidate, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(CoreError::Storage(format!(
        "no free backup name for {timestamp} in {}",
        dir.display()
    )))
}

impl BudgetStorage for JsonStorage {
    fn save_user(&self, user: &User) -> Result<(), CoreError> {
        write_json(&self.user_path(user.id), user)
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        read_optional(&self.user_path(id))
    }

    fn list_users(&self) -> Result<Vec<User>, CoreError> {
        let mut users = json_files(&self.users_dir)?
            .iter()
            .map(|path| read_json::<User>(path))
            .collect::<Result<Vec<_>, _>>()?;
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    fn save_budget(&self, budget: &Budget) -> Result<(), CoreError> {
        let path = self.budget_path(budget.id);
        self.backup_existing_file(budget.id, &path)?;
        write_json(&path, budget)?;
        debug!(budget = %budget.id, path = %path.display(), "saved budget");
        Ok(())
    }

    fn find_budget(&self, id: Uuid) -> Result<Option<Budget>, CoreError> {
        read_optional(&self.budget_path(id))
    }

    fn list_budgets(&self, owner: Uuid) -> Result<Vec<Budget>, CoreError> {
        let mut budgets = Vec::new();
        for path in json_files(&self.budgets_dir)? {
            let budget: Budget = read_json(&path)?;
            if budget.owner == owner {
                budgets.push(budget);
            }
        }
        budgets.sort_by_key(|b| b.created_at);
        Ok(budgets)
    }

    fn delete_budget(&self, id: Uuid) -> Result<(), CoreError> {
        let path = self.budget_path(id);
        if !path.exists() {
            return Err(CoreError::BudgetNotFound(id.to_string()));
        }
        self.backup_existing_file(id, &path)?;
        fs::remove_file(path)?;
        Ok(())
    }
}

fn record_path(dir: &Path, id: Uuid) -> PathBuf {
    dir.join(format!("{}.{}", id, FILE_EXTENSION))
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(FILE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(files)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data)
        .map_err(|err| CoreError::Serde(format!("{}: {}", path.display(), err)))
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    match read_json(path) {
        Ok(value) => Ok(Some(value)),
        Err(CoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|err| CoreError::Serde(err.to_string()))?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
