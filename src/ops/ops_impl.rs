// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Routes a request to its mutator. `Undo`/`Redo` are history navigation and never reach here.
pub(crate) fn apply_edit(
    store: &mut FlowStore,
    edit: Edit,
    services: &mut dyn EditorServices,
) -> Result<(), EditError> {
    match edit {
        Edit::LoadFlows { flows } => {
            load_flows(store, flows);
            Ok(())
        }
        Edit::RequestFlows => {
            store.fetching_flows = true;
            Ok(())
        }
        Edit::FlowsSaved | Edit::Undo | Edit::Redo => Ok(()),
        Edit::SwitchFlow { name } => switch_flow(store, name),
        Edit::SwitchFlowNode { node_id } => switch_flow_node(store, node_id),
        Edit::CreateFlow { name } => {
            create_flow(store, name, services);
            Ok(())
        }
        Edit::DeleteFlow { name } => delete_flow(store, &name),
        Edit::DuplicateFlow { source, new_name } => {
            duplicate_flow(store, &source, new_name, services)
        }
        Edit::RenameFlow { new_name } => rename_flow(store, new_name),
        Edit::UpdateFlow { patch } => update_flow(store, patch, services),
        Edit::CreateFlowNode { patch } => create_flow_node(store, patch, services),
        Edit::RemoveFlowNode { node_id } => remove_flow_node(store, &node_id),
        Edit::UpdateFlowNode { patch } => update_flow_node(store, patch, services),
        Edit::LinkFlowNodes {
            node_id,
            index,
            target,
        } => link_flow_nodes(store, &node_id, index, target),
        Edit::CopyFlowNode => copy_flow_node(store),
        Edit::PasteFlowNode => paste_flow_node(store, services),
        Edit::InsertNewSkill {
            skill_id,
            generated_flow,
            data,
            transitions,
        } => {
            skill::insert_new_skill(store, &skill_id, generated_flow, data, transitions, services);
            Ok(())
        }
        Edit::InsertNewSkillNode { position } => skill::insert_new_skill_node(store, position),
        Edit::UpdateSkill {
            edit_flow_name,
            generated_flow,
            data,
            edit_node_id,
            transitions,
        } => skill::update_skill(
            store,
            edit_flow_name,
            generated_flow,
            data,
            &edit_node_id,
            transitions,
        ),
    }
}

fn load_flows(store: &mut FlowStore, raw_flows: IndexMap<String, FlowGraph>) {
    let flows = raw_flows
        .into_iter()
        .map(|(name, flow)| (name, Arc::new(flow)))
        .collect::<crate::model::FlowMap>();

    let is_editable = |name: &str, flow: &FlowGraph| !store.config.is_skill_flow(name, flow);
    let default_flow = flows
        .get_key_value(store.config.default_flow_name.as_str())
        .filter(|(name, flow)| is_editable(name, flow))
        .or_else(|| flows.iter().find(|(name, flow)| is_editable(name, flow)))
        .map(|(name, _)| name.clone());

    store.flows = Arc::new(flows);
    if let Some(name) = default_flow {
        if store.current_flow.as_deref() != Some(name.as_str()) {
            store.current_flow_node = None;
        }
        store.current_flow = Some(name);
    }
    store.fetching_flows = false;
}

fn switch_flow(store: &mut FlowStore, name: String) -> Result<(), EditError> {
    if !store.flows.contains_key(&name) {
        return Err(MissingRef::Flow { name }.into());
    }
    if store.current_flow.as_deref() != Some(name.as_str()) {
        store.current_flow_node = None;
    }
    store.current_flow = Some(name);
    Ok(())
}

fn switch_flow_node(store: &mut FlowStore, node_id: Option<String>) -> Result<(), EditError> {
    if let Some(node_id) = &node_id {
        let flow_name = store.require_current_flow()?;
        let flow = store.flow_ref(&flow_name)?;
        if flow.node(node_id).is_none() {
            return Err(MissingRef::Node {
                flow: flow_name,
                node_id: node_id.clone(),
            }
            .into());
        }
    }
    store.current_flow_node = node_id;
    Ok(())
}

/// Registers a fresh flow under `name`, replacing any flow already stored under that name.
fn create_flow(store: &mut FlowStore, name: String, services: &mut dyn EditorServices) {
    let flow = FlowGraph::new(name.clone(), services.node_id());
    store.flows_mut().insert(name.clone(), Arc::new(flow));
    store.current_flow = Some(name);
    store.current_flow_node = None;
}

fn delete_flow(store: &mut FlowStore, name: &str) -> Result<(), EditError> {
    if store.flows_mut().shift_remove(name).is_none() {
        return Err(MissingRef::Flow {
            name: name.to_owned(),
        }
        .into());
    }
    if store.current_flow.as_deref() == Some(name) {
        store.current_flow = None;
        store.current_flow_node = None;
    }
    Ok(())
}

/// Copies `source` under `new_name` with a fresh id for every node. Transitions address nodes by
/// name, so they stay valid; links are re-pointed at the new ids.
fn duplicate_flow(
    store: &mut FlowStore,
    source: &str,
    new_name: String,
    services: &mut dyn EditorServices,
) -> Result<(), EditError> {
    let mut flow = FlowGraph::clone(store.flow_ref(source)?);
    flow.name = new_name.clone();
    flow.location = Some(new_name.clone());

    let mut new_ids = std::collections::HashMap::with_capacity(flow.nodes.len());
    for node in &mut flow.nodes {
        let fresh = services.node_id();
        new_ids.insert(std::mem::replace(&mut node.id, fresh.clone()), fresh);
    }
    for link in &mut flow.links {
        if let Some(source) = new_ids.get(&link.source) {
            link.source = source.clone();
        }
        if let Some(target) = new_ids.get(&link.target) {
            link.target = target.clone();
        }
    }

    store.flows_mut().insert(new_name.clone(), Arc::new(flow));
    store.current_flow = Some(new_name);
    store.current_flow_node = None;
    Ok(())
}

/// Renames the current flow and re-points every whole-field reference to the old name held by
/// other flows (transition targets and skill `flow` fields). No collision check is made: an
/// existing flow stored under `new_name` is replaced.
fn rename_flow(store: &mut FlowStore, new_name: String) -> Result<(), EditError> {
    let old_name = store.require_current_flow()?;
    let flows = store.flows_mut();

    let Some((mut index, _, mut flow)) = flows.shift_remove_full(&old_name) else {
        return Err(MissingRef::Flow { name: old_name }.into());
    };
    if let Some((replaced, _, _)) = flows.shift_remove_full(&new_name) {
        if replaced < index {
            index -= 1;
        }
    }
    {
        let flow = Arc::make_mut(&mut flow);
        flow.name = new_name.clone();
        flow.location = Some(new_name.clone());
    }

    for (_, other) in flows.iter_mut() {
        if other.references_flow(&old_name) {
            retarget_flow_references(Arc::make_mut(other), &old_name, &new_name);
        }
    }
    flows.shift_insert(index.min(flows.len()), new_name.clone(), flow);

    store.current_flow = Some(new_name);
    Ok(())
}

fn retarget_flow_references(flow: &mut FlowGraph, old_name: &str, new_name: &str) {
    for node in &mut flow.nodes {
        if node.flow.as_deref() == Some(old_name) {
            node.flow = Some(new_name.to_owned());
        }
        for transition in &mut node.next {
            if transition.node == old_name {
                transition.node = new_name.to_owned();
            }
        }
    }
}

/// Explicit default-plus-override construction of a new node.
fn build_node(patch: FlowNodePatch, services: &mut dyn EditorServices) -> FlowNode {
    let id = patch.id.clone().unwrap_or_else(|| services.node_id());
    let name = patch.name.clone().unwrap_or_else(|| services.node_name());
    let mut node = FlowNode::new(id, name);
    apply_node_patch(&mut node, patch);
    node
}

/// Applies every field of `patch` except `id` and `name`, which callers handle.
fn apply_node_patch(node: &mut FlowNode, patch: FlowNodePatch) {
    let FlowNodePatch {
        id: _,
        name: _,
        node_type,
        x,
        y,
        next,
        on_enter,
        on_receive,
        flow,
        extra,
    } = patch;

    if let Some(node_type) = node_type {
        node.node_type = Some(node_type);
    }
    if let Some(x) = x {
        node.x = x;
    }
    if let Some(y) = y {
        node.y = y;
    }
    if let Some(next) = next {
        node.next = next;
    }
    if let Some(on_enter) = on_enter {
        node.on_enter = Some(on_enter);
    }
    if let Some(on_receive) = on_receive {
        node.on_receive = Some(on_receive);
    }
    if let Some(flow) = flow {
        node.flow = Some(flow);
    }
    merge_pass_through(&mut node.extra, extra, NODE_FIELDS);
}

const NODE_FIELDS: &[&str] = &[
    "id",
    "name",
    "type",
    "x",
    "y",
    "next",
    "onEnter",
    "onReceive",
    "flow",
    "lastModified",
];

const FLOW_FIELDS: &[&str] = &[
    "name",
    "location",
    "version",
    "startNode",
    "catchAll",
    "nodes",
    "links",
    "skillData",
];

/// Key-wise merge of pass-through fields; nested objects merge recursively, anything else is
/// replaced. Keys naming typed fields are dropped so they cannot shadow them on serialization.
fn merge_pass_through(target: &mut Map<String, Value>, patch: Map<String, Value>, typed: &[&str]) {
    for (key, value) in patch {
        if typed.contains(&key.as_str()) {
            continue;
        }
        match target.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn merge_value(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

fn create_flow_node(
    store: &mut FlowStore,
    patch: FlowNodePatch,
    services: &mut dyn EditorServices,
) -> Result<(), EditError> {
    let flow_name = store.require_current_flow()?;
    let node = build_node(patch, services);
    store.flow_mut(&flow_name)?.nodes.push(node);
    Ok(())
}

/// Removes a node from the current flow. Removing the last reference to a skill flow also
/// removes that flow.
fn remove_flow_node(store: &mut FlowStore, node_id: &str) -> Result<(), EditError> {
    let flow_name = store.require_current_flow()?;
    let flow = store.flow_ref(&flow_name)?;
    let Some(index) = flow.nodes.iter().position(|n| n.id == node_id) else {
        return Err(MissingRef::Node {
            flow: flow_name,
            node_id: node_id.to_owned(),
        }
        .into());
    };

    let node = &flow.nodes[index];
    let orphaned_skill_flow = match (&node.flow, node.is_skill_call()) {
        (Some(skill_flow), true) if flow_references(&store.flows, skill_flow).len() <= 1 => {
            Some(skill_flow.clone())
        }
        _ => None,
    };

    store.flow_mut(&flow_name)?.nodes.remove(index);
    if let Some(skill_flow) = orphaned_skill_flow {
        debug!("removing orphaned skill flow {skill_flow}");
        store.flows_mut().shift_remove(&skill_flow);
    }
    if store.current_flow_node.as_deref() == Some(node_id) {
        store.current_flow_node = None;
    }
    Ok(())
}

/// Updates the selected node. A name change is propagated to the sibling transitions and to the
/// flow's `startNode`; references held by other flows are left alone.
fn update_flow_node(
    store: &mut FlowStore,
    patch: FlowNodePatch,
    services: &mut dyn EditorServices,
) -> Result<(), EditError> {
    let flow_name = store.require_current_flow()?;
    let node_id = store
        .current_flow_node
        .clone()
        .ok_or(MissingRef::NoSelectedNode)?;
    let timestamp = services.timestamp();

    let flow = store.flow_mut(&flow_name)?;
    let Some(index) = flow.nodes.iter().position(|n| n.id == node_id) else {
        return Err(MissingRef::Node {
            flow: flow_name,
            node_id,
        }
        .into());
    };

    let new_name = patch.name.clone();
    let node = &mut flow.nodes[index];
    let old_name = node.name.clone();
    if let Some(name) = &new_name {
        node.name = name.clone();
    }
    apply_node_patch(node, patch);
    node.last_modified = Some(timestamp);

    let Some(new_name) = new_name.filter(|name| *name != old_name) else {
        return Ok(());
    };
    for (i, other) in flow.nodes.iter_mut().enumerate() {
        if i == index {
            continue;
        }
        for transition in &mut other.next {
            if transition.node == old_name {
                transition.node = new_name.clone();
            }
        }
    }
    if flow.start_node == old_name {
        flow.start_node = new_name;
    }
    Ok(())
}

/// Bulk update of the current flow. Supplied links are authoritative for node-to-node
/// transitions: every output slot is re-derived from the link leaving it.
fn update_flow(
    store: &mut FlowStore,
    patch: FlowPatch,
    services: &mut dyn EditorServices,
) -> Result<(), EditError> {
    let flow_name = store.require_current_flow()?;
    let timestamp = services.timestamp();
    let flow = store.flow_mut(&flow_name)?;

    let FlowPatch {
        version,
        start_node,
        catch_all,
        nodes,
        links,
        skill_data,
        extra,
    } = patch;

    if let Some(version) = version {
        flow.version = version;
    }
    if let Some(start_node) = start_node {
        flow.start_node = start_node;
    }
    if let Some(catch_all) = catch_all {
        flow.catch_all = Some(catch_all);
    }
    if let Some(skill_data) = skill_data {
        flow.skill_data = Some(skill_data);
    }
    if let Some(nodes) = nodes {
        flow.nodes = nodes;
    }
    merge_pass_through(&mut flow.extra, extra, FLOW_FIELDS);

    if let Some(links) = links {
        resync_transitions(&mut flow.nodes, &links);
        flow.links = links;
    }
    flow.links = std::mem::take(&mut flow.links)
        .into_iter()
        .map(Link::rounded)
        .collect();

    for node in &mut flow.nodes {
        node.last_modified = Some(timestamp.clone());
    }
    Ok(())
}

/// Re-derives every transition target from the links leaving its slot. Slots without a link
/// keep targets links cannot express (`END`, other flows, condition tags) and are blanked
/// otherwise.
fn resync_transitions(nodes: &mut [FlowNode], links: &[Link]) {
    let names_by_id = nodes
        .iter()
        .map(|n| (n.id.clone(), n.name.clone()))
        .collect::<std::collections::HashMap<_, _>>();

    for node in nodes.iter_mut() {
        for (slot, transition) in node.next.iter_mut().enumerate() {
            let linked_name = links
                .iter()
                .find(|link| link.source == node.id && link.slot_index() == Some(slot))
                .and_then(|link| names_by_id.get(&link.target));

            match linked_name {
                Some(name) => transition.node = name.clone(),
                None if transition.is_link_independent() => {}
                None => transition.node.clear(),
            }
        }
    }
}

fn link_flow_nodes(
    store: &mut FlowStore,
    node_id: &str,
    index: usize,
    target: String,
) -> Result<(), EditError> {
    let flow_name = store.require_current_flow()?;
    let flow = store.flow_mut(&flow_name)?;
    let Some(node) = flow.node_mut(node_id) else {
        return Err(MissingRef::Node {
            flow: flow_name,
            node_id: node_id.to_owned(),
        }
        .into());
    };
    let Some(transition) = node.next.get_mut(index) else {
        return Err(MissingRef::TransitionSlot {
            node_id: node_id.to_owned(),
            index,
        }
        .into());
    };
    transition.node = target;
    Ok(())
}

fn copy_flow_node(store: &mut FlowStore) -> Result<(), EditError> {
    let node = store.selected_node_ref()?.clone();
    store.buffered_node = Some(node);
    Ok(())
}

/// Appends a copy of the buffered node to the current flow and selects it.
fn paste_flow_node(
    store: &mut FlowStore,
    services: &mut dyn EditorServices,
) -> Result<(), EditError> {
    let flow_name = store.require_current_flow()?;
    let mut node = store
        .buffered_node
        .take()
        .ok_or(MissingRef::EmptyNodeBuffer)?;

    node.id = services.node_id();
    node.x = 0.0;
    node.y = 0.0;
    node.last_modified = Some(services.timestamp());

    let flow = store.flow_mut(&flow_name)?;
    node.name = unique_copy_name(flow, &node.name);
    let node_id = node.id.clone();
    flow.nodes.push(node);

    store.current_flow_node = Some(node_id);
    Ok(())
}

/// First free name among `<base>-copy`, `<base>-copy-1`, `<base>-copy-2`, ...
fn unique_copy_name(flow: &FlowGraph, base: &str) -> String {
    let taken = flow
        .nodes
        .iter()
        .map(|n| n.name.as_str())
        .collect::<HashSet<_>>();

    let candidate = format!("{base}-copy");
    if !taken.contains(candidate.as_str()) {
        return candidate;
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{base}-copy-{n}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}
