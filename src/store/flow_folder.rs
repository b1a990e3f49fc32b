// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flow documents on disk.
//!
//! A flow folder is a directory tree of `*.flow.json` files. A flow's name is its path relative
//! to the root with `/` separators (`skills/choice-1a2b.flow.json`), which is the same key the
//! store uses.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::model::{FlowGraph, FlowMap, FLOW_FILE_SUFFIX};

#[derive(Debug, Error)]
pub enum FolderError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("json error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("flow name escapes the folder (name={name})")]
    InvalidFlowName { name: String },
    #[error("refusing to write through symlink {path:?}")]
    SymlinkRefused { path: PathBuf },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus atomic rename, no fsync.
    #[default]
    BestEffort,
    /// Also syncs the written file and its directory where the platform allows.
    Durable,
}

#[derive(Debug, Clone)]
pub struct FlowFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl FlowFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn flow_path(&self, flow_name: &str) -> Result<PathBuf, FolderError> {
        let relative = Path::new(flow_name);
        let valid = !flow_name.is_empty()
            && flow_name.ends_with(FLOW_FILE_SUFFIX)
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            return Err(FolderError::InvalidFlowName {
                name: flow_name.to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Reads every flow document under the root, keyed by relative name, in sorted path order.
    pub fn load_flows(&self) -> Result<IndexMap<String, FlowGraph>, FolderError> {
        let mut paths = Vec::new();
        collect_flow_files(&self.root, &mut paths)?;
        paths.sort();

        let mut flows = IndexMap::with_capacity(paths.len());
        for path in paths {
            let Some(name) = flow_name_for(&self.root, &path) else {
                debug!("skipping {path:?}: not representable as a flow name");
                continue;
            };
            let raw = fs::read_to_string(&path).map_err(|source| FolderError::Io {
                path: path.clone(),
                source,
            })?;
            let flow = serde_json::from_str::<FlowGraph>(&raw)
                .map_err(|source| FolderError::Json { path, source })?;
            flows.insert(name, flow);
        }
        Ok(flows)
    }

    /// Writes the named flows back to disk.
    pub fn save_flows<'a>(
        &self,
        flows: &FlowMap,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<usize, FolderError> {
        let mut written = 0;
        for name in names {
            let Some(flow) = flows.get(name) else {
                debug!("not saving {name}: no longer in the store");
                continue;
            };
            self.save_flow(name, flow)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn save_flow(&self, flow_name: &str, flow: &FlowGraph) -> Result<(), FolderError> {
        let path = self.flow_path(flow_name)?;
        let mut contents = serde_json::to_vec_pretty(flow).map_err(|source| FolderError::Json {
            path: path.clone(),
            source,
        })?;
        contents.push(b'\n');
        write_atomic(&self.root, &path, &contents, self.durability)
    }
}

fn collect_flow_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), FolderError> {
    let entries = fs::read_dir(dir).map_err(|source| FolderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| FolderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| FolderError::Io {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            collect_flow_files(&path, out)?;
        } else if file_type.is_file()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(FLOW_FILE_SUFFIX))
        {
            out.push(path);
        } else {
            debug!("skipping {path:?}");
        }
    }
    Ok(())
}

fn flow_name_for(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn create_dir_all_safe(root: &Path, relative: &Path) -> Result<(), FolderError> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) if md.file_type().is_symlink() => {
                return Err(FolderError::SymlinkRefused { path: current });
            }
            Ok(md) if md.is_dir() => {}
            Ok(_) => {
                return Err(FolderError::Io {
                    path: current,
                    source: io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                });
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| FolderError::Io {
                    path: current.clone(),
                    source,
                })?;
            }
            Err(source) => return Err(FolderError::Io { path: current, source }),
        }
    }
    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), FolderError> {
    fs::create_dir_all(root).map_err(|source| FolderError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let Some(parent) = path.parent() else {
        return Err(FolderError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };
    let Some(file_name) = path.file_name() else {
        return Err(FolderError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };
    if let Ok(relative_parent) = parent.strip_prefix(root) {
        create_dir_all_safe(root, relative_parent)?;
    }

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(FolderError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(FolderError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".flowstate.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| FolderError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    file.write_all(contents).map_err(|source| FolderError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| FolderError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(FolderError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| FolderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| FolderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
