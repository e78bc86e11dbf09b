//! Flat-file plan storage
//!
//! Each saved plan is a pair of files sharing a base name
//! `<YYYY-MM-DD>_<slug>`: `.json` is the source of truth and is what `load`
//! and `list` read; `.md` is a human-readable copy.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::Plan;
use crate::format::{format_as_json, format_as_markdown};

/// Characters that never make it into a filename
const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Plan not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid plan file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One row of `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    /// Base name without extension
    pub filename: String,
    pub title: String,
    pub created: String,
    pub path: PathBuf,
}

/// A directory of saved plans
#[derive(Debug, Clone)]
pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Write `<name>.json` and `<name>.md`, returning the base path
    pub fn save(&self, plan: &Plan) -> Result<PathBuf, StorageError> {
        debug!(title = %plan.title, dir = ?self.dir, "PlanStore::save: called");
        self.ensure_dir()?;

        let name = generate_filename(plan);
        let json_path = self.dir.join(format!("{name}.json"));
        let json = format_as_json(plan).map_err(|source| StorageError::Json {
            path: json_path.clone(),
            source,
        })?;
        write(&json_path, &json)?;
        write(&self.dir.join(format!("{name}.md")), &format_as_markdown(plan))?;

        let base = self.dir.join(name);

        info!(path = ?base, "PlanStore::save: plan saved");
        Ok(base)
    }

    /// Saved plans, newest name first. Unreadable or corrupt files are skipped.
    pub fn list(&self) -> Result<Vec<PlanSummary>, StorageError> {
        debug!(dir = ?self.dir, "PlanStore::list: called");
        self.ensure_dir()?;

        let entries = fs::read_dir(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        paths.reverse();

        let summaries = paths
            .into_iter()
            .filter_map(|path| match read_summary(&path) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(?path, error = %e, "PlanStore::list: skipping unreadable plan");
                    None
                }
            })
            .collect();
        Ok(summaries)
    }

    /// Load a plan by base name, with or without the `.json` extension
    pub fn load(&self, name: &str) -> Result<Plan, StorageError> {
        debug!(%name, "PlanStore::load: called");
        let filename = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{name}.json")
        };
        let path = self.dir.join(filename);
        if !path.exists() {
            return Err(StorageError::NotFound(path));
        }

        let content = read(&path)?;
        serde_json::from_str(&content).map_err(|source| StorageError::Json { path, source })
    }
}

/// `<YYYY-MM-DD>_<slug>` from the plan's creation date and title
pub fn generate_filename(plan: &Plan) -> String {
    let slug: String = plan
        .title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c))
        .collect();
    format!("{}_{}", plan.created_at().format("%Y-%m-%d"), slug)
}

fn read_summary(path: &Path) -> Result<PlanSummary, StorageError> {
    let content = read(path)?;
    let data: serde_json::Value = serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let field = |key: &str| data.get(key).and_then(|v| v.as_str()).unwrap_or("Unknown").to_string();

    Ok(PlanSummary {
        filename: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        title: field("title"),
        created: field("created_at"),
        path: path.to_path_buf(),
    })
}

fn read(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), StorageError> {
    fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
