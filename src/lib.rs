// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowstate: an in-memory editing core for named conversation flow graphs.
//!
//! The store applies structural edits as pure transitions, keeps bounded undo/redo history and
//! tracks per-flow content fingerprints for unsaved-change detection.

pub mod hash;
pub mod history;
pub mod model;
pub mod ops;
pub mod query;
pub mod services;
pub mod store;
