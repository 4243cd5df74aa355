//! Scope Model
//!
//! A scope is the collection boundary inside which `order` values are
//! unique and total, e.g. "folders owned by user U" or "notes in folder F".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Kind of entity stored in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Folder,
    Note,
    Section,
    Topic,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Note => "note",
            Self::Section => "section",
            Self::Topic => "topic",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(Self::Folder),
            "note" => Ok(Self::Note),
            "section" => Ok(Self::Section),
            "topic" => Ok(Self::Topic),
            other => Err(AppError::validation(format!("Unknown item kind: {}", other))),
        }
    }
}

/// Identifies one orderable collection
///
/// Text form is `"{kind}:{parent}"`, used as the storage key and in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeKey {
    pub kind: ItemKind,
    /// Owning parent: a user id for top-level folders, a folder id for notes, ...
    pub parent: String,
}

impl ScopeKey {
    /// Build a scope key, validating the parent segment
    pub fn new(kind: ItemKind, parent: impl Into<String>) -> Result<Self, AppError> {
        let parent = parent.into();
        if parent.is_empty() {
            return Err(AppError::validation("Scope parent must not be empty"));
        }
        if parent.contains([':', '/']) {
            return Err(AppError::validation(format!(
                "Scope parent contains a reserved character: {}",
                parent
            )));
        }
        Ok(Self { kind, parent })
    }

    pub fn folders(owner: impl Into<String>) -> Result<Self, AppError> {
        Self::new(ItemKind::Folder, owner)
    }

    pub fn notes(folder: impl Into<String>) -> Result<Self, AppError> {
        Self::new(ItemKind::Note, folder)
    }

    /// Path segment pair used by the HTTP API: `{kind}/{parent}`
    pub fn api_path(&self) -> String {
        format!("{}/{}", self.kind, self.parent)
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.parent)
    }
}

impl FromStr for ScopeKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, parent) = s
            .split_once(':')
            .ok_or_else(|| AppError::validation(format!("Malformed scope key: {}", s)))?;
        Self::new(kind.parse()?, parent)
    }
}

/// Ownership record for a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRecord {
    pub scope: ScopeKey,
    pub owner_id: String,
    pub created_at: i64,
}

impl ScopeRecord {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}
