// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use flowstate::ops::{Edit, FlowNodePatch};
use flowstate::services::SequentialServices;
use flowstate::store::FlowStore;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `ops.apply`
// - Case IDs: `<edit>_<fixture>` (e.g. `rename_node_medium`, `create_batch_200_large`).
//   Keep them stable so results stay comparable over time.

fn checksum_store(store: &FlowStore) -> u64 {
    let mut acc = 0u64;
    acc = acc
        .wrapping_mul(131)
        .wrapping_add(store.flows().len() as u64);
    acc = acc
        .wrapping_mul(131)
        .wrapping_add(store.history().undo_len() as u64);
    for hash in store.current_hashes().values() {
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(u64::from(hash.as_bytes()[0]));
    }
    acc
}

fn run(store: FlowStore, edits: &[Edit]) -> FlowStore {
    let mut services = SequentialServices::new();
    edits.iter().cloned().fold(store, |store, edit| {
        store.apply(edit, &mut services).expect("apply edit")
    })
}

fn create_nodes(count: usize) -> Vec<Edit> {
    (0..count)
        .map(|idx| Edit::CreateFlowNode {
            patch: FlowNodePatch::named(format!("bench_node_{idx:06}")),
        })
        .collect()
}

fn benches_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("ops.apply");

    for case in fixtures::ALL_CASES {
        let template = fixtures::loaded_store(case);

        let rename = vec![Edit::UpdateFlowNode {
            patch: FlowNodePatch::named("renamed_node"),
        }];
        group.throughput(Throughput::Elements(1));
        group.bench_function(format!("rename_node_{}", case.id()), |b| {
            b.iter_batched(
                || template.clone(),
                |store| black_box(checksum_store(&run(store, black_box(&rename)))),
                BatchSize::SmallInput,
            )
        });

        let batch = create_nodes(200);
        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_function(format!("create_batch_200_{}", case.id()), |b| {
            b.iter_batched(
                || template.clone(),
                |store| black_box(checksum_store(&run(store, black_box(&batch)))),
                BatchSize::SmallInput,
            )
        });

        let mut undo_redo = create_nodes(25);
        undo_redo.extend(std::iter::repeat(Edit::Undo).take(25));
        undo_redo.extend(std::iter::repeat(Edit::Redo).take(25));
        group.throughput(Throughput::Elements(undo_redo.len() as u64));
        group.bench_function(format!("undo_redo_25_{}", case.id()), |b| {
            b.iter_batched(
                || template.clone(),
                |store| black_box(checksum_store(&run(store, black_box(&undo_redo)))),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_ops
}
criterion_main!(benches);
