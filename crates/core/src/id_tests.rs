// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn uuid_gen_creates_unique_prefixed_ids() {
    let id_gen = UuidIdGen;
    let id1 = id_gen.next("run");
    let id2 = id_gen.next("run");
    assert_ne!(id1, id2);
    assert!(id1.starts_with("run_"));
    assert_eq!(id1.len(), "run_".len() + 32);
}

#[test]
fn sequential_gen_creates_predictable_ids() {
    let id_gen = SequentialIdGen::new();
    assert_eq!(id_gen.next("run"), "run-1");
    assert_eq!(id_gen.next("job"), "job-2");
    assert_eq!(id_gen.next("run"), "run-3");
}

#[test]
fn sequential_gen_is_cloneable_and_shared() {
    let id_gen1 = SequentialIdGen::new();
    let id_gen2 = id_gen1.clone();
    assert_eq!(id_gen1.next("q"), "q-1");
    assert_eq!(id_gen2.next("q"), "q-2");
    assert_eq!(id_gen1.next("q"), "q-3");
}
