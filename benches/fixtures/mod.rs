// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use indexmap::IndexMap;

use flowstate::model::{Action, FlowGraph, FlowNode, Link, Point, Transition};
use flowstate::ops::Edit;
use flowstate::services::SequentialServices;
use flowstate::store::FlowStore;

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// 4 flows x 12 nodes.
    Small,
    /// 16 flows x 60 nodes.
    Medium,
    /// 40 flows x 250 nodes, long action lists.
    Large,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    fn shape(self) -> (usize, usize, usize) {
        match self {
            Self::Small => (4, 12, 1),
            Self::Medium => (16, 60, 2),
            Self::Large => (40, 250, 6),
        }
    }
}

pub const ALL_CASES: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

pub fn flow_name(index: usize) -> String {
    if index == 0 {
        "main.flow.json".to_owned()
    } else {
        format!("flow_{index:03}.flow.json")
    }
}

pub fn node_id(flow: usize, node: usize) -> String {
    format!("f{flow:03}n{node:04}")
}

fn flow(index: usize, nodes: usize, actions: usize) -> FlowGraph {
    let name = flow_name(index);
    let mut flow = FlowGraph::new(name, node_id(index, 0));

    for n in 1..nodes {
        let mut node = FlowNode::new(node_id(index, n), format!("node_{n:04}"))
            .with_position((n % 20) as f64 * 180.0, (n / 20) as f64 * 120.0);
        node.on_enter = Some(
            (0..actions)
                .map(|a| Action::named(format!("say #!builtin_text-{index}-{n}-{a}")))
                .collect(),
        );
        flow.nodes.push(node);
    }

    for n in 0..nodes {
        let next_name = if n + 1 < nodes {
            format!("node_{:04}", n + 1)
        } else {
            "END".to_owned()
        };
        let mut next = vec![Transition::new(next_name).with_condition("true")];
        if n % 7 == 3 {
            next.push(Transition::new(flow_name((index + 1) % 3)).with_condition("temp.handoff"));
        }
        flow.nodes[n].next = next;
        if n + 1 < nodes {
            flow.links.push(
                Link::new(node_id(index, n), node_id(index, n + 1), 0)
                    .with_points(vec![Point::new(n as f64 * 10.5, 3.25)]),
            );
        }
    }
    flow
}

pub fn raw_flows(case: Case) -> IndexMap<String, FlowGraph> {
    let (flows, nodes, actions) = case.shape();
    (0..flows)
        .map(|i| (flow_name(i), flow(i, nodes, actions)))
        .collect()
}

/// A store with `case` loaded and node 1 of the main flow selected.
pub fn loaded_store(case: Case) -> FlowStore {
    let mut services = SequentialServices::new();
    let store = FlowStore::new()
        .apply(
            Edit::LoadFlows {
                flows: raw_flows(case),
            },
            &mut services,
        )
        .expect("load flows");
    store
        .apply(
            Edit::SwitchFlowNode {
                node_id: Some(node_id(0, 1)),
            },
            &mut services,
        )
        .expect("select node")
}
