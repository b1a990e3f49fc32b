// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::link::Link;
use super::node::{Action, FlowNode};

/// Flow collection keyed by flow name, in document order.
///
/// Flows are shared between store values (and history snapshots); an edit replaces only the
/// flows it touches.
pub type FlowMap = IndexMap<String, Arc<FlowGraph>>;

pub const DEFAULT_FLOW_VERSION: &str = "0.1";
pub const ENTRY_NODE_NAME: &str = "entry";

/// A persisted flow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub start_node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch_all: Option<CatchAll>,
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowGraph {
    /// A fresh flow holding a single `entry` node at `(100, 100)`.
    pub fn new(name: impl Into<String>, entry_node_id: impl Into<String>) -> Self {
        let name = name.into();
        let entry = FlowNode::new(entry_node_id, ENTRY_NODE_NAME).with_position(100.0, 100.0);
        Self {
            location: Some(name.clone()),
            name,
            version: DEFAULT_FLOW_VERSION.to_owned(),
            start_node: ENTRY_NODE_NAME.to_owned(),
            catch_all: Some(CatchAll::default()),
            nodes: vec![entry],
            links: Vec::new(),
            skill_data: None,
            extra: Map::new(),
        }
    }

    pub fn is_skill(&self) -> bool {
        self.skill_data.is_some()
    }

    pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// True when any node of this flow points at `flow_name`.
    pub fn references_flow(&self, flow_name: &str) -> bool {
        self.nodes.iter().any(|n| n.references_flow(flow_name))
    }
}

/// Fallback behavior applied to every node of a flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchAll {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_receive: Option<Vec<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_enter: Option<Vec<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Vec<Action>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
