// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::link::serialize_coord;

/// Transition target that ends the conversation.
pub const END_MARKER: &str = "END";

/// Node type of nodes that delegate to a generated skill flow.
pub const SKILL_CALL_NODE_TYPE: &str = "skill-call";

/// File suffix shared by every flow document name.
pub const FLOW_FILE_SUFFIX: &str = ".flow.json";

/// A single node of a flow graph.
///
/// `id` is the only stable identity and is never rewritten once created. Transitions refer to
/// sibling nodes by `name`, which is unique within the owning flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, serialize_with = "serialize_coord")]
    pub x: f64,
    #[serde(default, serialize_with = "serialize_coord")]
    pub y: f64,
    #[serde(default)]
    pub next: Vec<Transition>,
    #[serde(default)]
    pub on_enter: Option<Vec<Action>>,
    #[serde(default)]
    pub on_receive: Option<Vec<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowNode {
    /// A node with the editor defaults: origin position, no transitions, an empty `onEnter`
    /// list and a null `onReceive`.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: None,
            x: 0.0,
            y: 0.0,
            next: Vec::new(),
            on_enter: Some(Vec::new()),
            on_receive: None,
            flow: None,
            last_modified: None,
            extra: Map::new(),
        }
    }

    /// A staged skill-reference node pointing at its backing flow.
    pub fn skill_call(
        id: impl Into<String>,
        name: impl Into<String>,
        flow: impl Into<String>,
        next: Vec<Transition>,
    ) -> Self {
        Self {
            node_type: Some(SKILL_CALL_NODE_TYPE.to_owned()),
            next,
            on_enter: None,
            flow: Some(flow.into()),
            ..Self::new(id, name)
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_next(mut self, next: Vec<Transition>) -> Self {
        self.next = next;
        self
    }

    pub fn is_skill_call(&self) -> bool {
        self.node_type.as_deref() == Some(SKILL_CALL_NODE_TYPE)
    }

    /// True when this node points at `flow_name`, either as its backing skill flow or through
    /// one of its transitions.
    pub fn references_flow(&self, flow_name: &str) -> bool {
        self.flow.as_deref() == Some(flow_name) || self.next.iter().any(|t| t.node == flow_name)
    }
}

/// Classification of a transition's `node` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget<'a> {
    /// The conversation ends.
    Terminal,
    /// Another flow document (`*.flow.json`).
    Flow(&'a str),
    /// A condition tag (`#...`).
    ConditionTag(&'a str),
    /// A sibling node, by name. May be empty for a dangling output.
    Node(&'a str),
}

/// One outgoing edge of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    #[serde(default)]
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transition {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            condition: None,
            extra: Map::new(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn target(&self) -> TransitionTarget<'_> {
        let node = self.node.as_str();
        if node == END_MARKER {
            TransitionTarget::Terminal
        } else if node.contains(FLOW_FILE_SUFFIX) {
            TransitionTarget::Flow(node)
        } else if node.starts_with('#') {
            TransitionTarget::ConditionTag(node)
        } else {
            TransitionTarget::Node(node)
        }
    }

    /// Targets that canvas links cannot express and therefore survive a link resync.
    pub fn is_link_independent(&self) -> bool {
        !matches!(self.target(), TransitionTarget::Node(_))
    }
}

/// An entry of an `onEnter`/`onReceive`/catch-all action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    Named(String),
    Structured(StructuredAction),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn transition(node: impl Into<String>, condition: Option<String>) -> Self {
        Self::Structured(StructuredAction {
            node: Some(node.into()),
            condition,
            extra: Map::new(),
        })
    }
}
