// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of [`rp_core::ports::rbac::FileBrowser`].
//!
//! Backs the file gateway in tests without a real workspace mount. Paths
//! are normalized relative to a virtual root; `..` segments are rejected
//! rather than resolved, since the gateway must never escape the sandbox.

use async_trait::async_trait;
use parking_lot::Mutex;
use rp_core::ports::rbac::{DirEntry, FileBrowser, GatewayError, GatewayResult, ReadResult};
use std::collections::BTreeMap;

pub struct InMemoryFileBrowser {
    // Directories are tracked explicitly so an empty `mkdir` survives and
    // `list_tree` can distinguish "empty dir" from "missing".
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    dirs: Mutex<BTreeMap<String, ()>>,
}

fn normalize(path: &str) -> GatewayResult<String> {
    if path.split('/').any(|segment| segment == "..") {
        return Err(GatewayError::InvalidPath(path.to_string()));
    }
    let trimmed = path.trim_start_matches('/');
    Ok(trimmed.to_string())
}

impl InMemoryFileBrowser {
    pub fn new() -> Self {
        let dirs = BTreeMap::from([(String::new(), ())]);
        Self { files: Mutex::new(BTreeMap::new()), dirs: Mutex::new(dirs) }
    }

    fn parent_dirs_exist(&self, path: &str) -> bool {
        match path.rfind('/') {
            Some(idx) => self.dirs.lock().contains_key(&path[..idx]),
            None => true, // root-level entries always have an implicit parent
        }
    }
}

#[async_trait]
impl FileBrowser for InMemoryFileBrowser {
    async fn list_tree(&self, path: &str) -> GatewayResult<Vec<DirEntry>> {
        let path = normalize(path)?;
        if !path.is_empty() && !self.dirs.lock().contains_key(&path) {
            return Err(GatewayError::NotFound(path));
        }
        let prefix = if path.is_empty() { String::new() } else { format!("{path}/") };
        let mut entries = Vec::new();
        for (dir, _) in self.dirs.lock().iter() {
            if dir != &path && dir.starts_with(&prefix) && !dir[prefix.len()..].contains('/') {
                entries.push(DirEntry { path: dir.clone(), is_dir: true, size: None });
            }
        }
        for (file, content) in self.files.lock().iter() {
            if file.starts_with(&prefix) && !file[prefix.len()..].contains('/') {
                entries.push(DirEntry { path: file.clone(), is_dir: false, size: Some(content.len() as u64) });
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn download(&self, path: &str) -> GatewayResult<Vec<u8>> {
        let path = normalize(path)?;
        self.files.lock().get(&path).cloned().ok_or(GatewayError::NotFound(path))
    }

    async fn read_file(&self, path: &str, offset: u64, limit: u64) -> GatewayResult<ReadResult> {
        let path = normalize(path)?;
        let files = self.files.lock();
        let content = files.get(&path).ok_or_else(|| GatewayError::NotFound(path.clone()))?;
        let offset = offset as usize;
        if offset > content.len() {
            return Ok(ReadResult { content: Vec::new(), next_offset: None, truncated: false });
        }
        let end = (offset + limit as usize).min(content.len());
        let truncated = end < content.len();
        let next_offset = if truncated { Some(end as u64) } else { None };
        Ok(ReadResult { content: content[offset..end].to_vec(), next_offset, truncated })
    }

    async fn write_file(&self, path: &str, content: Vec<u8>) -> GatewayResult<()> {
        let path = normalize(path)?;
        if self.dirs.lock().contains_key(&path) {
            return Err(GatewayError::IsDirectory(path));
        }
        if !self.parent_dirs_exist(&path) {
            return Err(GatewayError::NotFound(path));
        }
        self.files.lock().insert(path, content);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> GatewayResult<()> {
        let from = normalize(from)?;
        let to = normalize(to)?;
        let mut files = self.files.lock();
        if files.contains_key(&to) {
            return Err(GatewayError::AlreadyExists(to));
        }
        let content = files.remove(&from).ok_or_else(|| GatewayError::NotFound(from.clone()))?;
        files.insert(to, content);
        Ok(())
    }

    async fn delete_path(&self, path: &str) -> GatewayResult<()> {
        let path = normalize(path)?;
        if self.files.lock().remove(&path).is_some() {
            return Ok(());
        }
        if self.dirs.lock().remove(&path).is_some() {
            return Ok(());
        }
        Err(GatewayError::NotFound(path))
    }

    async fn mkdir(&self, path: &str) -> GatewayResult<()> {
        let path = normalize(path)?;
        if self.files.lock().contains_key(&path) {
            return Err(GatewayError::AlreadyExists(path));
        }
        if !self.parent_dirs_exist(&path) {
            return Err(GatewayError::NotFound(path));
        }
        self.dirs.lock().insert(path, ());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_fs_tests.rs"]
mod tests;
