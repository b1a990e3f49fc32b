// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The aggregate editor state and the pipeline that applies edits to it.
//!
//! A `FlowStore` is a value: `apply` never mutates the receiver, it returns the next store.
//! Flows are shared between consecutive stores and history snapshots, so an edit only copies
//! the flows it touches.

pub mod flow_folder;
mod pipeline;

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::hash::{refresh_fingerprints, HashTable};
use crate::history::{History, Snapshot, DEFAULT_HISTORY_CAPACITY};
use crate::model::{FlowGraph, FlowMap, FlowNode};
use crate::ops::{apply_edit, Edit, EditError, EditKind, MissingRef};
use crate::services::EditorServices;

pub use flow_folder::{FlowFolder, FolderError, WriteDurability};
use pipeline::{stages_for, Stage};

pub const DEFAULT_FLOW_NAME: &str = "main.flow.json";
pub const SKILL_ID_PREFIX: &str = "skill-";
pub const SKILLS_FOLDER: &str = "skills/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound for each of the undo and redo stacks.
    pub history_capacity: usize,
    /// Flow selected after a load when present.
    pub default_flow_name: String,
    /// Prefix stripped from skill package ids when naming backing flows.
    pub skill_prefix: String,
    /// Folder (flow-name prefix) holding generated skill flows.
    pub skills_folder: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_flow_name: DEFAULT_FLOW_NAME.to_owned(),
            skill_prefix: SKILL_ID_PREFIX.to_owned(),
            skills_folder: SKILLS_FOLDER.to_owned(),
        }
    }
}

impl StoreConfig {
    /// Skill flows back skill-call nodes and are never picked as the editing default.
    pub fn is_skill_flow(&self, name: &str, flow: &FlowGraph) -> bool {
        flow.is_skill() || name.starts_with(&self.skills_folder)
    }

    pub fn normalize_skill_id<'a>(&self, skill_id: &'a str) -> &'a str {
        skill_id
            .strip_prefix(self.skill_prefix.as_str())
            .unwrap_or(skill_id)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    #[default]
    Default,
    /// A skill-call node is staged in the buffer and waits for a canvas position.
    PlacingSkill,
}

#[derive(Debug, Clone, Default)]
pub struct FlowStore {
    pub(crate) config: StoreConfig,
    pub(crate) flows: Arc<FlowMap>,
    pub(crate) current_flow: Option<String>,
    pub(crate) current_flow_node: Option<String>,
    pub(crate) fetching_flows: bool,
    pub(crate) buffered_node: Option<FlowNode>,
    pub(crate) editor_mode: EditorMode,
    pub(crate) current_hashes: HashTable,
    pub(crate) initial_hashes: HashTable,
    pub(crate) history: History,
}

impl FlowStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            history: History::new(config.history_capacity),
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn flows(&self) -> &FlowMap {
        &self.flows
    }

    pub fn flow(&self, name: &str) -> Option<&FlowGraph> {
        self.flows.get(name).map(Arc::as_ref)
    }

    pub fn current_flow(&self) -> Option<&str> {
        self.current_flow.as_deref()
    }

    pub fn current_flow_graph(&self) -> Option<&FlowGraph> {
        self.current_flow().and_then(|name| self.flow(name))
    }

    pub fn current_flow_node(&self) -> Option<&str> {
        self.current_flow_node.as_deref()
    }

    pub fn selected_node(&self) -> Option<&FlowNode> {
        let node_id = self.current_flow_node()?;
        self.current_flow_graph()?.node(node_id)
    }

    pub fn buffered_node(&self) -> Option<&FlowNode> {
        self.buffered_node.as_ref()
    }

    pub fn editor_mode(&self) -> EditorMode {
        self.editor_mode
    }

    pub fn is_fetching_flows(&self) -> bool {
        self.fetching_flows
    }

    pub fn current_hashes(&self) -> &HashTable {
        &self.current_hashes
    }

    pub fn initial_hashes(&self) -> &HashTable {
        &self.initial_hashes
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_flow: self.current_flow.clone(),
            current_flow_node: self.current_flow_node.clone(),
            flows: Arc::clone(&self.flows),
        }
    }

    /// Flows whose content differs from the last load/save baseline, including flows created or
    /// deleted since then. Sorted by name.
    pub fn dirty_flows(&self) -> Vec<&str> {
        let changed = self
            .current_hashes
            .iter()
            .filter(|(name, hash)| self.initial_hashes.get(*name) != Some(*hash))
            .map(|(name, _)| name.as_str());
        let removed = self
            .initial_hashes
            .keys()
            .filter(|name| !self.current_hashes.contains_key(*name))
            .map(String::as_str);

        let mut dirty = changed.chain(removed).collect::<Vec<_>>();
        dirty.sort_unstable();
        dirty
    }

    pub fn is_dirty(&self, flow_name: &str) -> bool {
        self.current_hashes.get(flow_name) != self.initial_hashes.get(flow_name)
    }

    /// Runs `edit` through its stage list and returns the resulting store.
    ///
    /// Stages run strictly in order on a private working copy: history pre-recording sees the
    /// state before the mutation, rehashing sees the state after it, and post-recording captures
    /// the final state. A rejected edit returns the error and leaves `self` untouched.
    pub fn apply(
        &self,
        edit: Edit,
        services: &mut dyn EditorServices,
    ) -> Result<FlowStore, EditError> {
        let kind = edit.kind();
        let mut next = self.clone();
        let mut payload = Some(edit);

        for stage in stages_for(kind) {
            match stage {
                Stage::Meta | Stage::Mutate => {
                    let Some(edit) = payload.take() else {
                        continue;
                    };
                    if let Err(err) = apply_edit(&mut next, edit, services) {
                        warn!("rejected {kind:?}: {err}");
                        return Err(err);
                    }
                }
                Stage::RecordBefore => next.history.record_before(self.snapshot()),
                Stage::Rehash => {
                    next.current_hashes =
                        refresh_fingerprints(&self.current_hashes, &self.flows, &next.flows);
                }
                Stage::ResetBaseline => next.initial_hashes = next.current_hashes.clone(),
                Stage::ResetHistory => next.history.clear(),
                Stage::RecordAfter => {
                    let snapshot = next.snapshot();
                    next.history.record_after(snapshot);
                }
                Stage::Navigate => {
                    let target = match kind {
                        EditKind::Redo => next.history.redo(),
                        _ => next.history.undo(),
                    };
                    let Some(target) = target else {
                        trace!("{kind:?} with empty history");
                        return Ok(next);
                    };
                    trace!(
                        "{kind:?} (undo={}, redo={})",
                        next.history.undo_len(),
                        next.history.redo_len()
                    );
                    next.restore(target);
                }
            }
        }

        debug!(
            "applied {kind:?} (flow={})",
            next.current_flow().unwrap_or("-")
        );
        Ok(next)
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.current_flow = snapshot.current_flow;
        self.current_flow_node = snapshot.current_flow_node;
        self.flows = snapshot.flows;

        // A staged skill-call is only placeable while its backing flow exists.
        if self.editor_mode == EditorMode::PlacingSkill {
            let backed = self
                .buffered_node
                .as_ref()
                .and_then(|node| node.flow.as_deref())
                .is_some_and(|flow| self.flows.contains_key(flow));
            if !backed {
                debug!("dropping staged skill-call without a backing flow");
                self.buffered_node = None;
                self.editor_mode = EditorMode::Default;
            }
        }
    }

    pub(crate) fn flows_mut(&mut self) -> &mut FlowMap {
        Arc::make_mut(&mut self.flows)
    }

    /// Name of the selected flow, which must exist.
    pub(crate) fn require_current_flow(&self) -> Result<String, EditError> {
        let name = self.current_flow.clone().ok_or(MissingRef::NoCurrentFlow)?;
        if !self.flows.contains_key(&name) {
            return Err(MissingRef::Flow { name }.into());
        }
        Ok(name)
    }

    pub(crate) fn flow_ref(&self, name: &str) -> Result<&FlowGraph, EditError> {
        self.flow(name).ok_or_else(|| {
            MissingRef::Flow {
                name: name.to_owned(),
            }
            .into()
        })
    }

    pub(crate) fn flow_mut(&mut self, name: &str) -> Result<&mut FlowGraph, EditError> {
        match self.flows_mut().get_mut(name) {
            Some(flow) => Ok(Arc::make_mut(flow)),
            None => Err(MissingRef::Flow {
                name: name.to_owned(),
            }
            .into()),
        }
    }

    pub(crate) fn selected_node_ref(&self) -> Result<&FlowNode, EditError> {
        let flow_name = self.require_current_flow()?;
        let node_id = self
            .current_flow_node
            .as_deref()
            .ok_or(MissingRef::NoSelectedNode)?;
        self.flow_ref(&flow_name)?.node(node_id).ok_or_else(|| {
            MissingRef::Node {
                flow: flow_name.clone(),
                node_id: node_id.to_owned(),
            }
            .into()
        })
    }
}
