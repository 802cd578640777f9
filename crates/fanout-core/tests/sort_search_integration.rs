//! Integration tests for the sort and search primitives
//!
//! Verifies the sort/search round trip over both backends: sorting, reusing
//! caller scratch, computing sort permutations, and inserting elements at
//! the indices returned by batched binary search.

use fanout_core::ops::search::Side;
use fanout_core::{ops, Dispatch, DeviceGridBackend, ThreadPoolBackend};
use rand::Rng;

#[test]
fn sort_then_search_round_trip() {
    fanout_tracing::init_for_tests();
    let cpu = ThreadPoolBackend::new();
    let mut rng = rand::thread_rng();

    let mut data: Vec<i64> = (0..20_000).map(|_| rng.gen_range(-1000..1000)).collect();
    let opts = Dispatch::default().with_max_tasks(8);
    ops::sort::sort(&cpu, &mut data, None, &opts).unwrap();
    assert!(data.windows(2).all(|w| w[0] <= w[1]));

    let queries: Vec<i64> = (0..500).map(|_| rng.gen_range(-1200..1200)).collect();
    let mut insertion = vec![0usize; queries.len()];
    ops::search::search_sorted(&cpu, &data, &queries, &mut insertion, Side::Left, &opts).unwrap();

    // Inserting any query at its returned index keeps the sequence sorted
    for (q, &idx) in queries.iter().zip(&insertion) {
        let mut v = data.clone();
        v.insert(idx, *q);
        assert!(v.windows(2).all(|w| w[0] <= w[1]), "insert {q} at {idx}");
    }
}

#[test]
fn device_grid_sorts_like_cpu() {
    let cpu = ThreadPoolBackend::new();
    let grid = DeviceGridBackend::new();
    let mut rng = rand::thread_rng();

    let original: Vec<u32> = (0..30_000).map(|_| rng.gen()).collect();

    let mut by_cpu = original.clone();
    ops::sort::sort(&cpu, &mut by_cpu, None, &Dispatch::default().with_max_tasks(8)).unwrap();

    let mut by_grid = original.clone();
    ops::sort::sort(&grid, &mut by_grid, None, &Dispatch::default().with_block_size(1024)).unwrap();

    assert_eq!(by_cpu, by_grid);
}

#[test]
fn scratch_buffer_reuse_across_calls() {
    let cpu = ThreadPoolBackend::new();
    let opts = Dispatch::default().with_max_tasks(6);
    let mut rng = rand::thread_rng();
    let mut temp: Vec<u64> = vec![0; 5000];

    for round in 0..5 {
        let mut data: Vec<u64> = (0..5000).map(|_| rng.gen()).collect();
        let mut expected = data.clone();
        expected.sort_unstable();
        ops::sort::sort(&cpu, &mut data, Some(&mut temp), &opts).unwrap();
        assert_eq!(data, expected, "round {round}");
        assert_eq!(temp.len(), 5000, "scratch must never be resized");
    }
}

#[test]
fn sort_permutation_then_gather() {
    let cpu = ThreadPoolBackend::new();
    let opts = Dispatch::default().with_max_tasks(4);
    let mut rng = rand::thread_rng();

    let keys: Vec<i32> = (0..10_000).map(|_| rng.gen_range(0..500)).collect();
    let mut perm = vec![0usize; keys.len()];
    ops::sort::sort_permutation(&cpu, &keys, &mut perm, None, &opts).unwrap();

    let gathered: Vec<i32> = perm.iter().map(|&p| keys[p]).collect();
    assert!(gathered.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn upper_bound_side_places_after_ties() {
    let cpu = ThreadPoolBackend::new();
    let haystack = vec![1, 5, 5, 5, 8];
    let queries = vec![5];
    let opts = Dispatch::default();

    let mut left = vec![0usize; 1];
    ops::search::search_sorted(&cpu, &haystack, &queries, &mut left, Side::Left, &opts).unwrap();
    let mut right = vec![0usize; 1];
    ops::search::search_sorted(&cpu, &haystack, &queries, &mut right, Side::Right, &opts).unwrap();

    assert_eq!(left[0], 1);
    assert_eq!(right[0], 4);
}
