// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use regex::RegexBuilder;

use crate::model::{FlowGraph, FlowMap, FlowNode};

/// A node that points at some flow, either through its `flow` field or one of its transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowReference<'a> {
    pub flow_name: &'a str,
    pub node: &'a FlowNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSearchMode {
    Substring,
    Regex,
}

/// Every node, across all flows, that references `target`. Each node is reported once even when
/// several of its fields match.
pub fn flow_references<'a>(flows: &'a FlowMap, target: &str) -> Vec<FlowReference<'a>> {
    flows
        .iter()
        .flat_map(|(flow_name, flow)| {
            flow.nodes
                .iter()
                .filter(move |node| node.references_flow(target))
                .map(move |node| FlowReference {
                    flow_name: flow_name.as_str(),
                    node,
                })
        })
        .collect()
}

/// Nodes of `flow` whose name matches `needle`, in document order.
pub fn node_search<'a>(
    flow: &'a FlowGraph,
    needle: &str,
    mode: NodeSearchMode,
    case_insensitive: bool,
) -> Result<Vec<&'a FlowNode>, regex::Error> {
    match mode {
        NodeSearchMode::Substring => {
            if case_insensitive {
                let needle_lower = needle.to_lowercase();
                Ok(flow
                    .nodes
                    .iter()
                    .filter(|node| node.name.to_lowercase().contains(&needle_lower))
                    .collect())
            } else {
                Ok(flow
                    .nodes
                    .iter()
                    .filter(|node| node.name.contains(needle))
                    .collect())
            }
        }
        NodeSearchMode::Regex => {
            let regex = RegexBuilder::new(needle)
                .case_insensitive(case_insensitive)
                .build()?;
            Ok(flow
                .nodes
                .iter()
                .filter(|node| regex.is_match(&node.name))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{flow_references, node_search, NodeSearchMode};
    use crate::model::fixtures::{flow_main, flows, flows_small};
    use crate::model::{FlowNode, Transition};

    #[test]
    fn flow_references_counts_flow_fields_and_transitions() {
        let mut host = flow_main();
        host.nodes.push(FlowNode::skill_call(
            "skill-a",
            "choice-a",
            "skills/choice.flow.json",
            vec![Transition::new("skills/choice.flow.json")],
        ));
        let flows = flows(vec![host]);

        let refs = flow_references(&flows, "skills/choice.flow.json");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].flow_name, "main.flow.json");
        assert_eq!(refs[0].node.id, "skill-a");
    }

    #[test]
    fn flow_references_spans_every_flow() {
        let flows = flows_small();
        let to_other = flow_references(&flows, "other.flow.json");
        assert_eq!(to_other.len(), 1);
        assert_eq!(to_other[0].node.id, "n:ask");

        let to_main = flow_references(&flows, "main.flow.json");
        assert_eq!(to_main.len(), 1);
        assert_eq!(to_main[0].flow_name, "other.flow.json");

        assert!(flow_references(&flows, "main").is_empty());
    }

    #[test]
    fn node_search_supports_substring_and_case_folding() {
        let flow = flow_main();
        let hits = node_search(&flow, "AS", NodeSearchMode::Substring, true).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "ask");

        let hits = node_search(&flow, "AS", NodeSearchMode::Substring, false).expect("search");
        assert!(hits.is_empty());
    }

    #[test]
    fn node_search_supports_regex_mode() {
        let flow = flow_main();
        let hits = node_search(&flow, "^(entry|ask)$", NodeSearchMode::Regex, false)
            .expect("search result");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn node_search_returns_error_for_invalid_regex() {
        let flow = flow_main();
        let err = node_search(&flow, "(", NodeSearchMode::Regex, true)
            .expect_err("expected invalid regex error");
        assert!(!err.to_string().is_empty());
    }
}
