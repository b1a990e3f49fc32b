// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowstate CLI entrypoint.
//!
//! Loads a flow folder, optionally replays a JSON edit script against it and reports per-flow
//! fingerprints and unsaved changes. `--write` saves the dirty flows back.

use std::error::Error;

use flowstate::ops::Edit;
use flowstate::query::{node_search, NodeSearchMode};
use flowstate::services::SystemServices;
use flowstate::store::{FlowFolder, FlowStore, WriteDurability};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<flows-dir>] [--apply <edits.json>] [--write] [--durable-writes]\n  {program} [<flows-dir>] --search <needle> [--regex]\n\nIf flows-dir is omitted, the current working directory is used.\n--apply replays a JSON array of edits (`{{\"type\": \"createFlow\", \"name\": ...}}`).\n--write saves every dirty flow back to flows-dir.\n--search lists nodes of the selected flow whose name matches (case-insensitive)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    flows_dir: Option<String>,
    apply: Option<String>,
    write: bool,
    durable_writes: bool,
    search: Option<String>,
    regex: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--apply" => {
                if options.apply.is_some() {
                    return Err(());
                }
                options.apply = Some(args.next().ok_or(())?);
            }
            "--write" => {
                if options.write {
                    return Err(());
                }
                options.write = true;
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--search" => {
                if options.search.is_some() {
                    return Err(());
                }
                options.search = Some(args.next().ok_or(())?);
            }
            "--regex" => {
                if options.regex {
                    return Err(());
                }
                options.regex = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.flows_dir.is_some() {
                    return Err(());
                }
                options.flows_dir = Some(arg);
            }
        }
    }

    if options.regex && options.search.is_none() {
        return Err(());
    }

    if options.durable_writes && !options.write {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "flowstate".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let dir = options.flows_dir.unwrap_or_else(|| ".".to_owned());
        let folder = if options.durable_writes {
            FlowFolder::new(dir).with_durability(WriteDurability::Durable)
        } else {
            FlowFolder::new(dir)
        };

        let mut services = SystemServices;
        let mut store = FlowStore::new().apply(
            Edit::LoadFlows {
                flows: folder.load_flows()?,
            },
            &mut services,
        )?;

        if let Some(script) = &options.apply {
            let raw = std::fs::read_to_string(script)?;
            let edits: Vec<Edit> = serde_json::from_str(&raw)?;
            for edit in edits {
                store = store.apply(edit, &mut services)?;
            }
        }

        let dirty = store.dirty_flows();
        for (name, hash) in store.current_hashes() {
            let marker = if dirty.contains(&name.as_str()) { '*' } else { ' ' };
            let nodes = store.flow(name).map_or(0, |flow| flow.nodes.len());
            println!("{marker} {} {name} ({nodes} nodes)", &hash[..12]);
        }
        for name in dirty.iter().filter(|name| store.flow(name).is_none()) {
            println!("- deleted {name}");
        }
        println!(
            "selected: {}",
            store.current_flow().unwrap_or("(none)")
        );

        if let Some(needle) = &options.search {
            let mode = if options.regex {
                NodeSearchMode::Regex
            } else {
                NodeSearchMode::Substring
            };
            if let Some(flow) = store.current_flow_graph() {
                for node in node_search(flow, needle, mode, true)? {
                    println!("  {} {}", node.id, node.name);
                }
            }
        }

        if options.write {
            let written = folder.save_flows(store.flows(), dirty.iter().copied())?;
            let store = store.apply(Edit::FlowsSaved, &mut services)?;
            println!(
                "saved {written} flow(s), {} still dirty",
                store.dirty_flows().len()
            );
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("flowstate: {err}");
        std::process::exit(1);
    }
}
