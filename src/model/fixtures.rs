// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use super::flow::{FlowGraph, FlowMap};
use super::link::{Link, Point};
use super::node::{Action, FlowNode, Transition};

/// `entry -> ask -> (END | other.flow.json | #escalate | entry)` with links for the node edges.
pub(crate) fn flow_main() -> FlowGraph {
    let mut flow = FlowGraph::new("main.flow.json", "n:entry");
    flow.nodes[0].next = vec![Transition::new("ask").with_condition("true")];

    let mut ask = FlowNode::new("n:ask", "ask")
        .with_position(300.0, 100.0)
        .with_next(vec![
            Transition::new("END").with_condition("event.nlu.intent == 'bye'"),
            Transition::new("other.flow.json").with_condition("event.nlu.intent == 'help'"),
            Transition::new("#escalate").with_condition("temp.angry"),
            Transition::new("entry").with_condition("true"),
        ]);
    ask.on_enter = Some(vec![Action::named("say #!builtin_text-ask")]);
    ask.on_receive = Some(vec![Action::named("builtin/setVariable")]);
    flow.nodes.push(ask);

    flow.links = vec![
        Link::new("n:entry", "n:ask", 0).with_points(vec![Point::new(150.2, 100.7)]),
        Link::new("n:ask", "n:entry", 3),
    ];
    flow
}

pub(crate) fn flow_other() -> FlowGraph {
    let mut flow = FlowGraph::new("other.flow.json", "o:entry");
    flow.nodes[0].next = vec![Transition::new("main.flow.json")];
    flow
}

pub(crate) fn flows(list: Vec<FlowGraph>) -> FlowMap {
    list.into_iter()
        .map(|flow| (flow.name.clone(), Arc::new(flow)))
        .collect()
}

pub(crate) fn flows_small() -> FlowMap {
    flows(vec![flow_main(), flow_other()])
}
