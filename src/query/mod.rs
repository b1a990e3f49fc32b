// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over the flow collection.
//!
//! Queries provide derived views (cross-flow references, node lookup) used by edits and tooling.

pub mod flow;

pub use flow::{flow_references, node_search, FlowReference, NodeSearchMode};
