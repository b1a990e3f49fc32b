// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Composition of generated skill flows into a host flow.
//!
//! A skill is backed by its own flow document under the skills folder. The host flow holds a
//! `skill-call` node whose `flow` field names the backing document; placing that node is a
//! two-step interaction (stage, then drop at a canvas position).

use std::sync::Arc;

use serde_json::Value;

use super::{merge_pass_through, EditError, MissingRef, FLOW_FIELDS};
use crate::model::{FlowGraph, FlowNode, Point, Transition, FLOW_FILE_SUFFIX};
use crate::services::EditorServices;
use crate::store::{EditorMode, FlowStore};

/// Registers the generated backing flow and stages a skill-call node in the node buffer.
///
/// The current flow is not touched; the staged node is placed by `insert_new_skill_node`.
pub(crate) fn insert_new_skill(
    store: &mut FlowStore,
    skill_id: &str,
    generated_flow: FlowGraph,
    data: Value,
    transitions: Vec<Transition>,
    services: &mut dyn EditorServices,
) {
    let short_id = services.short_id();
    let display_name = format!("{}-{short_id}", store.config.normalize_skill_id(skill_id));
    let flow_name = format!(
        "{}{display_name}{FLOW_FILE_SUFFIX}",
        store.config.skills_folder
    );

    let mut flow = generated_flow;
    flow.name = flow_name.clone();
    flow.location = Some(flow_name.clone());
    flow.skill_data = Some(data);
    store.flows_mut().insert(flow_name.clone(), Arc::new(flow));

    let node = FlowNode::skill_call(
        format!("skill-{short_id}"),
        display_name,
        flow_name,
        transitions,
    );
    store.buffered_node = Some(node);
    store.editor_mode = EditorMode::PlacingSkill;
}

/// Drops the staged node into the current flow at `position` and empties the buffer.
pub(crate) fn insert_new_skill_node(
    store: &mut FlowStore,
    position: Point,
) -> Result<(), EditError> {
    let flow_name = store.require_current_flow()?;
    let Some(mut node) = store.buffered_node.take() else {
        return Err(MissingRef::EmptyNodeBuffer.into());
    };
    node.x = position.x;
    node.y = position.y;

    store.flow_mut(&flow_name)?.nodes.push(node);
    store.editor_mode = EditorMode::Default;
    Ok(())
}

/// Regenerates the backing flow in place and rewires the host node's outputs.
pub(crate) fn update_skill(
    store: &mut FlowStore,
    edit_flow_name: String,
    generated_flow: FlowGraph,
    data: Value,
    edit_node_id: &str,
    transitions: Vec<Transition>,
) -> Result<(), EditError> {
    let host_flow = store.require_current_flow()?;
    if store.flow_ref(&host_flow)?.node(edit_node_id).is_none() {
        return Err(MissingRef::Node {
            flow: host_flow,
            node_id: edit_node_id.to_owned(),
        }
        .into());
    }

    let skill_flow = store.flow_mut(&edit_flow_name)?;
    let FlowGraph {
        name: _,
        location: _,
        version,
        start_node,
        catch_all,
        nodes,
        links,
        skill_data: _,
        extra,
    } = generated_flow;
    skill_flow.version = version;
    skill_flow.start_node = start_node;
    skill_flow.catch_all = catch_all;
    skill_flow.nodes = nodes;
    skill_flow.links = links;
    merge_pass_through(&mut skill_flow.extra, extra, FLOW_FIELDS);
    skill_flow.name = edit_flow_name.clone();
    skill_flow.location = Some(edit_flow_name);
    skill_flow.skill_data = Some(data);

    if let Some(node) = store.flow_mut(&host_flow)?.node_mut(edit_node_id) {
        node.next = transitions;
    }
    Ok(())
}
