// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Generators the editing core treats as opaque services.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use uuid::Uuid;

/// Produces fresh ids, names and timestamps for edits.
///
/// Every value returned must be unique for the lifetime of the store that consumes it; the core
/// never checks.
pub trait EditorServices {
    /// A fresh node id.
    fn node_id(&mut self) -> String;

    /// A short random-looking token used in generated skill flow names and node ids.
    fn short_id(&mut self) -> String;

    /// A placeholder name for a node created without one.
    fn node_name(&mut self) -> String;

    /// Value stamped into `lastModified`.
    fn timestamp(&mut self) -> String;
}

/// Random ids (uuid v4) and wall-clock timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemServices;

impl EditorServices for SystemServices {
    fn node_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn short_id(&mut self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        id
    }

    fn node_name(&mut self) -> String {
        format!("node-{}", &self.short_id()[..4])
    }

    fn timestamp(&mut self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Deterministic counters and a clock that advances one second per stamp.
#[derive(Debug, Clone)]
pub struct SequentialServices {
    next: u64,
    clock: DateTime<Utc>,
}

impl SequentialServices {
    pub fn new() -> Self {
        Self::starting_at(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default())
    }

    pub fn starting_at(clock: DateTime<Utc>) -> Self {
        Self { next: 0, clock }
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl Default for SequentialServices {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorServices for SequentialServices {
    fn node_id(&mut self) -> String {
        format!("id{:05}", self.bump())
    }

    fn short_id(&mut self) -> String {
        format!("s{:04}", self.bump())
    }

    fn node_name(&mut self) -> String {
        format!("node-{}", self.bump())
    }

    fn timestamp(&mut self) -> String {
        self.clock += Duration::seconds(1);
        self.clock.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
