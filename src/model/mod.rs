// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flow document model.
//!
//! These types are the persisted document shape (camelCase JSON). Fields the model does not know
//! about are kept in `extra` maps so documents round-trip field-for-field.

pub mod flow;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod link;
pub mod node;

pub use flow::{CatchAll, FlowGraph, FlowMap, DEFAULT_FLOW_VERSION, ENTRY_NODE_NAME};
pub use link::{Link, Point};
pub use node::{
    Action, FlowNode, StructuredAction, Transition, TransitionTarget, END_MARKER,
    FLOW_FILE_SUFFIX, SKILL_CALL_NODE_TYPE,
};
