// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::ops::EditKind;

/// One step of the edit pipeline. Each edit kind runs a fixed, ordered list of stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    /// Selection and flag updates that never enter history.
    Meta,
    /// Push the pre-edit snapshot onto the undo stack.
    RecordBefore,
    /// Structural mutation.
    Mutate,
    /// Recompute `current_hashes` from the post-edit flows.
    Rehash,
    /// `initial_hashes = current_hashes`.
    ResetBaseline,
    ResetHistory,
    /// Refresh the current snapshot to the final state.
    RecordAfter,
    /// Restore the top of the undo or redo stack.
    Navigate,
}

const META: &[Stage] = &[Stage::Meta];
const LOAD: &[Stage] = &[
    Stage::Mutate,
    Stage::Rehash,
    Stage::ResetBaseline,
    Stage::ResetHistory,
    Stage::RecordAfter,
];
const SAVED: &[Stage] = &[Stage::ResetBaseline];
const RECORDED: &[Stage] = &[
    Stage::RecordBefore,
    Stage::Mutate,
    Stage::Rehash,
    Stage::RecordAfter,
];
const BUFFER_ONLY: &[Stage] = &[Stage::Mutate];
const UNRECORDED: &[Stage] = &[Stage::Mutate, Stage::Rehash, Stage::RecordAfter];
const NAVIGATE: &[Stage] = &[Stage::Navigate, Stage::Rehash, Stage::RecordAfter];

pub(crate) fn stages_for(kind: EditKind) -> &'static [Stage] {
    match kind {
        EditKind::LoadFlows => LOAD,
        EditKind::RequestFlows | EditKind::SwitchFlow | EditKind::SwitchFlowNode => META,
        EditKind::FlowsSaved => SAVED,
        EditKind::CopyFlowNode => BUFFER_ONLY,
        // Paste changes the flow but is not part of the undoable set.
        EditKind::PasteFlowNode => UNRECORDED,
        EditKind::Undo | EditKind::Redo => NAVIGATE,
        kind if kind.is_recordable() => RECORDED,
        _ => UNRECORDED,
    }
}
