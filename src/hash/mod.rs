// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-flow content fingerprints used for dirty-state detection.
//!
//! A fingerprint covers the flow name, start node, catch-all actions, node content (nodes taken
//! in id order) and link geometry. Fields that do not affect the saved content in a meaningful
//! way (`lastModified`, pass-through extras) are left out, so a timestamp bump alone never marks
//! a flow dirty.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::model::link::as_whole;
use crate::model::{Action, CatchAll, FlowGraph, FlowMap, FlowNode, Link, Transition};

/// Flow name to hex fingerprint.
pub type HashTable = BTreeMap<String, String>;

const NULL_TOKEN: &str = "null";
const TOKEN_SEPARATOR: char = '\u{1f}';

/// Fingerprints every flow in the collection.
pub fn compute_fingerprints(flows: &FlowMap) -> HashTable {
    flows
        .iter()
        .map(|(name, flow)| (name.clone(), fingerprint_flow(flow)))
        .collect()
}

/// Fingerprints `after`, reusing entries of `previous` for flows still shared with `before`.
///
/// `previous` must be the fingerprint table of `before`. A flow whose `Arc` is shared between
/// both collections cannot have changed, so only replaced or added flows are hashed again.
pub fn refresh_fingerprints(previous: &HashTable, before: &FlowMap, after: &FlowMap) -> HashTable {
    after
        .iter()
        .map(|(name, flow)| {
            let reused = before
                .get(name)
                .filter(|old| Arc::ptr_eq(old, flow))
                .and_then(|_| previous.get(name));
            let hash = match reused {
                Some(hash) => hash.clone(),
                None => fingerprint_flow(flow),
            };
            (name.clone(), hash)
        })
        .collect()
}

/// Fingerprint of a single flow.
pub fn fingerprint_flow(flow: &FlowGraph) -> String {
    let mut buffer = FingerprintBuffer::default();

    buffer.push_str(&flow.name);
    buffer.push_str(&flow.start_node);
    push_catch_all(&mut buffer, flow.catch_all.as_ref());

    let mut nodes = flow.nodes.iter().collect::<Vec<_>>();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    for node in nodes {
        push_node(&mut buffer, node);
    }

    let mut links = flow
        .links
        .iter()
        .map(|link| (format!("{}{}", link.source, link.target), link))
        .collect::<Vec<_>>();
    links.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (_, link) in links {
        push_link(&mut buffer, link);
    }

    buffer.digest()
}

fn push_catch_all(buffer: &mut FingerprintBuffer, catch_all: Option<&CatchAll>) {
    let Some(catch_all) = catch_all else {
        buffer.push_str(NULL_TOKEN);
        return;
    };
    buffer.push_actions(catch_all.on_receive.as_deref());
    buffer.push_actions(catch_all.on_enter.as_deref());
    buffer.push_actions(catch_all.next.as_deref());
}

fn push_node(buffer: &mut FingerprintBuffer, node: &FlowNode) {
    buffer.push_actions(node.on_receive.as_deref());
    buffer.push_actions(node.on_enter.as_deref());
    buffer.push_transitions(&node.next);
    buffer.push_str(&node.id);
    buffer.push_opt(node.flow.as_deref());
    buffer.push_opt(node.node_type.as_deref());
    buffer.push_str(&node.name);
    buffer.push_number(node.x);
    buffer.push_number(node.y);
}

fn push_link(buffer: &mut FingerprintBuffer, link: &Link) {
    buffer.push_str(&link.source);
    buffer.push_str(&link.target);
    for point in &link.points {
        let point = point.rounded();
        buffer.push_number(point.x);
        buffer.push_number(point.y);
    }
}

/// Ordered token buffer. Tokens are separated so adjacent fields cannot bleed into each other.
#[derive(Debug, Default)]
struct FingerprintBuffer {
    text: String,
}

impl FingerprintBuffer {
    fn push_str(&mut self, token: &str) {
        self.text.push_str(token);
        self.text.push(TOKEN_SEPARATOR);
    }

    fn push_opt(&mut self, token: Option<&str>) {
        self.push_str(token.unwrap_or(NULL_TOKEN));
    }

    fn push_number(&mut self, value: f64) {
        if let Some(whole) = as_whole(value) {
            let mut digits = itoa::Buffer::new();
            self.push_str(digits.format(whole));
        } else {
            let _ = write!(self.text, "{value}");
            self.text.push(TOKEN_SEPARATOR);
        }
    }

    fn push_actions(&mut self, actions: Option<&[Action]>) {
        let Some(actions) = actions else {
            self.push_str(NULL_TOKEN);
            return;
        };
        for action in actions {
            match action {
                Action::Named(name) => self.push_str(name),
                Action::Structured(structured) => {
                    self.push_opt(structured.node.as_deref());
                    self.push_opt(structured.condition.as_deref());
                }
            }
        }
    }

    fn push_transitions(&mut self, transitions: &[Transition]) {
        for transition in transitions {
            self.push_str(&transition.node);
            self.push_opt(transition.condition.as_deref());
        }
    }

    fn digest(self) -> String {
        format!("{:x}", Sha256::digest(self.text.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{compute_fingerprints, fingerprint_flow, refresh_fingerprints};
    use crate::model::fixtures::{flow_main, flows_small};
    use crate::model::{Point, Transition};

    #[test]
    fn identical_collections_hash_identically() {
        let a = compute_fingerprints(&flows_small());
        let b = compute_fingerprints(&flows_small());
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a["main.flow.json"].len(), 64);
        assert_ne!(a["main.flow.json"], a["other.flow.json"]);
    }

    #[test]
    fn a_single_field_change_only_affects_its_flow() {
        let before = compute_fingerprints(&flows_small());

        let mut moved = flows_small();
        Arc::make_mut(&mut moved["main.flow.json"]).nodes[1].x += 1.0;
        let after_move = compute_fingerprints(&moved);
        assert_ne!(after_move["main.flow.json"], before["main.flow.json"]);
        assert_eq!(after_move["other.flow.json"], before["other.flow.json"]);

        let mut retargeted = flows_small();
        Arc::make_mut(&mut retargeted["main.flow.json"]).nodes[0].next[0] =
            Transition::new("END").with_condition("true");
        let after_retarget = compute_fingerprints(&retargeted);
        assert_ne!(after_retarget["main.flow.json"], before["main.flow.json"]);
        assert_eq!(after_retarget["other.flow.json"], before["other.flow.json"]);

        let mut bent = flows_small();
        Arc::make_mut(&mut bent["main.flow.json"]).links[1]
            .points
            .push(Point::new(10.0, 20.0));
        let after_bend = compute_fingerprints(&bent);
        assert_ne!(after_bend["main.flow.json"], before["main.flow.json"]);
        assert_eq!(after_bend["other.flow.json"], before["other.flow.json"]);
    }

    #[test]
    fn node_order_link_order_and_sub_integer_point_moves_are_ignored() {
        let flow = flow_main();
        let base = fingerprint_flow(&flow);

        let mut reordered = flow.clone();
        reordered.nodes.reverse();
        reordered.links.reverse();
        assert_eq!(fingerprint_flow(&reordered), base);

        let mut nudged = flow.clone();
        nudged.links[0].points[0].x += 0.1;
        assert_eq!(fingerprint_flow(&nudged), base);
    }

    #[test]
    fn timestamps_and_pass_through_fields_are_ignored() {
        let flow = flow_main();
        let base = fingerprint_flow(&flow);

        let mut stamped = flow.clone();
        for node in &mut stamped.nodes {
            node.last_modified = Some("2024-05-01T10:00:00Z".to_owned());
        }
        stamped
            .extra
            .insert("description".to_owned(), serde_json::json!("x"));
        assert_eq!(fingerprint_flow(&stamped), base);
    }

    #[test]
    fn missing_catch_all_differs_from_empty_catch_all() {
        let flow = flow_main();
        let mut without = flow.clone();
        without.catch_all = None;
        assert_ne!(fingerprint_flow(&without), fingerprint_flow(&flow));
    }

    #[test]
    fn null_and_empty_action_lists_differ() {
        let flow = flow_main();
        let mut emptied = flow.clone();
        emptied.nodes[0].on_enter = None;
        assert_ne!(fingerprint_flow(&emptied), fingerprint_flow(&flow));
    }

    #[test]
    fn refresh_rehashes_only_replaced_flows() {
        let before = flows_small();
        let previous = compute_fingerprints(&before);

        let mut after = before.clone();
        Arc::make_mut(&mut after["main.flow.json"]).start_node = "ask".to_owned();
        let refreshed = refresh_fingerprints(&previous, &before, &after);
        assert_eq!(refreshed, compute_fingerprints(&after));
        assert_eq!(refreshed["other.flow.json"], previous["other.flow.json"]);
        assert_ne!(refreshed["main.flow.json"], previous["main.flow.json"]);

        let mut stale = previous.clone();
        stale.insert("other.flow.json".to_owned(), "stale".to_owned());
        let reused = refresh_fingerprints(&stale, &before, &after);
        assert_eq!(reused["other.flow.json"], "stale");
    }
}
