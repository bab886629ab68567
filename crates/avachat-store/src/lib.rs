//! Avachat Store - named chat persistence
//!
//! File-backed analog of the browser's chat storage. An index file tracks
//! the chat-name list and the current selection; each chat's history lives
//! in its own record file:
//!
//! ```text
//! <root>/chats.json       {"names": ["alice", ...], "current": "alice"}
//! <root>/<name>.json      {"messages": [{"role": "user", "content": "..."}]}
//! ```

use avachat_core::{Error, Result, Role, TranscriptEntry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const INDEX_FILE: &str = "chats.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChatIndex {
    names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChatRecord {
    messages: Vec<TranscriptEntry>,
}

pub struct ChatStore {
    root: PathBuf,
}

impl ChatStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create an empty chat. Duplicates are an error.
    pub fn create(&self, name: &str) -> Result<()> {
        let mut index = self.load_index();
        if index.names.iter().any(|n| n == name) {
            return Err(Error::ChatExists(name.to_string()));
        }
        self.save_record(name, &ChatRecord::default())?;
        index.names.push(name.to_string());
        self.save_index(&index)?;
        debug!("chat created: {}", name);
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        self.load_index().names
    }

    /// Load a chat's history and record it as the current selection.
    pub fn select(&self, name: &str) -> Result<Vec<TranscriptEntry>> {
        let messages = self.load(name)?;
        let mut index = self.load_index();
        index.current = Some(name.to_string());
        self.save_index(&index)?;
        Ok(messages)
    }

    pub fn current(&self) -> Option<String> {
        self.load_index().current
    }

    pub fn load(&self, name: &str) -> Result<Vec<TranscriptEntry>> {
        Ok(self.load_record(name)?.messages)
    }

    /// Append one completed turn.
    pub fn append(&self, name: &str, role: Role, text: &str) -> Result<()> {
        let mut record = self.load_record(name)?;
        record.messages.push(TranscriptEntry {
            role,
            text: text.to_string(),
        });
        self.save_record(name, &record)
    }

    /// Rename a chat, carrying its history and the current selection along.
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let mut index = self.load_index();
        if !index.names.iter().any(|n| n == old) {
            return Err(Error::ChatNotFound(old.to_string()));
        }
        if index.names.iter().any(|n| n == new) {
            return Err(Error::ChatExists(new.to_string()));
        }
        let record = self.load_record(old)?;
        self.save_record(new, &record)?;
        fs::remove_file(self.record_path(old)?)?;
        for n in index.names.iter_mut() {
            if n == old {
                *n = new.to_string();
            }
        }
        if index.current.as_deref() == Some(old) {
            index.current = Some(new.to_string());
        }
        self.save_index(&index)?;
        debug!("chat renamed: {} -> {}", old, new);
        Ok(())
    }

    /// Delete a chat; clears the selection if it pointed there.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut index = self.load_index();
        if !index.names.iter().any(|n| n == name) {
            return Err(Error::ChatNotFound(name.to_string()));
        }
        let _ = fs::remove_file(self.record_path(name)?);
        index.names.retain(|n| n != name);
        if index.current.as_deref() == Some(name) {
            index.current = None;
        }
        self.save_index(&index)?;
        debug!("chat deleted: {}", name);
        Ok(())
    }

    /// Pretty JSON of the full chat record, for export.
    pub fn export(&self, name: &str) -> Result<String> {
        let record = self.load_record(name)?;
        Ok(serde_json::to_string_pretty(&record)?)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn record_path(&self, name: &str) -> Result<PathBuf> {
        // Chat names become file names; reject anything that could escape
        // the store root or collide with the index.
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(Error::InvalidChatName(name.to_string()));
        }
        let file = format!("{}.json", name);
        if file == INDEX_FILE {
            return Err(Error::InvalidChatName(name.to_string()));
        }
        Ok(self.root.join(file))
    }

    fn load_index(&self) -> ChatIndex {
        match fs::read_to_string(self.index_path()) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => ChatIndex::default(),
        }
    }

    fn save_index(&self, index: &ChatIndex) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.index_path(), serde_json::to_string_pretty(index)?)?;
        Ok(())
    }

    fn load_record(&self, name: &str) -> Result<ChatRecord> {
        let path = self.record_path(name)?;
        let content =
            fs::read_to_string(&path).map_err(|_| Error::ChatNotFound(name.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_record(&self, name: &str, record: &ChatRecord) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.record_path(name)?, serde_json::to_string_pretty(record)?)?;
        Ok(())
    }
}
