// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Edit requests and the structural mutations behind them.
//!
//! `Edit` is the closed set of requests the store accepts. Mutators run against a private working
//! copy of the store; the store only publishes that copy when the whole edit succeeded, so a
//! failed edit never leaves partial changes behind.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{Action, CatchAll, FlowGraph, FlowNode, Link, Point, Transition};
use crate::query::flow_references;
use crate::services::EditorServices;
use crate::store::FlowStore;

pub mod skill;

/// One edit request. Serialized as `{"type": "<camelCaseKind>", ...payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Edit {
    /// Flows arrived from the persistence layer.
    LoadFlows { flows: IndexMap<String, FlowGraph> },
    /// A fetch of the flow documents started.
    RequestFlows,
    /// The persistence layer finished saving the current flows.
    FlowsSaved,
    SwitchFlow { name: String },
    SwitchFlowNode {
        #[serde(default)]
        node_id: Option<String>,
    },
    CreateFlow { name: String },
    DeleteFlow { name: String },
    DuplicateFlow { source: String, new_name: String },
    RenameFlow { new_name: String },
    UpdateFlow { patch: FlowPatch },
    CreateFlowNode {
        #[serde(default)]
        patch: FlowNodePatch,
    },
    RemoveFlowNode { node_id: String },
    UpdateFlowNode { patch: FlowNodePatch },
    LinkFlowNodes {
        node_id: String,
        index: usize,
        target: String,
    },
    CopyFlowNode,
    PasteFlowNode,
    InsertNewSkill {
        skill_id: String,
        generated_flow: FlowGraph,
        #[serde(default)]
        data: Value,
        #[serde(default)]
        transitions: Vec<Transition>,
    },
    InsertNewSkillNode { position: Point },
    UpdateSkill {
        edit_flow_name: String,
        generated_flow: FlowGraph,
        #[serde(default)]
        data: Value,
        edit_node_id: String,
        #[serde(default)]
        transitions: Vec<Transition>,
    },
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    LoadFlows,
    RequestFlows,
    FlowsSaved,
    SwitchFlow,
    SwitchFlowNode,
    CreateFlow,
    DeleteFlow,
    DuplicateFlow,
    RenameFlow,
    UpdateFlow,
    CreateFlowNode,
    RemoveFlowNode,
    UpdateFlowNode,
    LinkFlowNodes,
    CopyFlowNode,
    PasteFlowNode,
    InsertNewSkill,
    InsertNewSkillNode,
    UpdateSkill,
    Undo,
    Redo,
}

impl Edit {
    pub fn kind(&self) -> EditKind {
        match self {
            Self::LoadFlows { .. } => EditKind::LoadFlows,
            Self::RequestFlows => EditKind::RequestFlows,
            Self::FlowsSaved => EditKind::FlowsSaved,
            Self::SwitchFlow { .. } => EditKind::SwitchFlow,
            Self::SwitchFlowNode { .. } => EditKind::SwitchFlowNode,
            Self::CreateFlow { .. } => EditKind::CreateFlow,
            Self::DeleteFlow { .. } => EditKind::DeleteFlow,
            Self::DuplicateFlow { .. } => EditKind::DuplicateFlow,
            Self::RenameFlow { .. } => EditKind::RenameFlow,
            Self::UpdateFlow { .. } => EditKind::UpdateFlow,
            Self::CreateFlowNode { .. } => EditKind::CreateFlowNode,
            Self::RemoveFlowNode { .. } => EditKind::RemoveFlowNode,
            Self::UpdateFlowNode { .. } => EditKind::UpdateFlowNode,
            Self::LinkFlowNodes { .. } => EditKind::LinkFlowNodes,
            Self::CopyFlowNode => EditKind::CopyFlowNode,
            Self::PasteFlowNode => EditKind::PasteFlowNode,
            Self::InsertNewSkill { .. } => EditKind::InsertNewSkill,
            Self::InsertNewSkillNode { .. } => EditKind::InsertNewSkillNode,
            Self::UpdateSkill { .. } => EditKind::UpdateSkill,
            Self::Undo => EditKind::Undo,
            Self::Redo => EditKind::Redo,
        }
    }
}

impl EditKind {
    /// Edits that take part in undo/redo history.
    pub fn is_recordable(self) -> bool {
        matches!(
            self,
            Self::UpdateFlow
                | Self::RenameFlow
                | Self::CreateFlow
                | Self::DeleteFlow
                | Self::DuplicateFlow
                | Self::CreateFlowNode
                | Self::RemoveFlowNode
                | Self::LinkFlowNodes
                | Self::UpdateFlowNode
                | Self::InsertNewSkill
                | Self::UpdateSkill
                | Self::InsertNewSkillNode
        )
    }
}

/// Field overrides for a node.
///
/// On creation every `Some` field replaces the default; on update every `Some` field replaces the
/// node's value except `id`, which is fixed once a node exists. `extra` entries are merged
/// key-wise into the node's pass-through fields (nested objects merge recursively).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Vec<Transition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_enter: Option<Vec<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_receive: Option<Vec<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowNodePatch {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Field overrides for the current flow. The flow's `name`/`location` are never taken from a
/// patch; renaming goes through `Edit::RenameFlow`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch_all: Option<CatchAll>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<FlowNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A lookup the edit depended on came back empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingRef {
    #[error("no flow is selected")]
    NoCurrentFlow,
    #[error("no node is selected")]
    NoSelectedNode,
    #[error("flow not found (name={name})")]
    Flow { name: String },
    #[error("node not found (flow={flow}, id={node_id})")]
    Node { flow: String, node_id: String },
    #[error("transition slot not found (node={node_id}, index={index})")]
    TransitionSlot { node_id: String, index: usize },
    #[error("node buffer is empty")]
    EmptyNodeBuffer,
}

/// Why an edit was rejected. A rejected edit leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("reference not found: {0}")]
    ReferenceNotFound(#[from] MissingRef),
}

// Extracted mutation implementation for flow and node edits.
include!("ops_impl.rs");
