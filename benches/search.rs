//! Performance benchmarks for famdex
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use famdex::load::{build_tree, LoadMode};
use famdex::normalize::normalize;
use famdex::query::SearchEngine;
use famdex::tree::PathTree;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a data root with one record per item, spread over nested families
fn create_benchmark_fixtures() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::Builder::new()
        .prefix("famdex-bench")
        .tempdir()
        .expect("Failed to create temp dir");
    let root_path = temp_dir.path().to_path_buf();

    for i in 0..500 {
        let content = format!(
            r#"family: [Team {team}, Quarter {quarter}]
name: graph_{i}.png
title: Revenue report {i} for region {region}
index: [finance, region{region}]
labels: [{label}]
rank: {i}
"#,
            team = i % 7,
            quarter = i % 4,
            region = i % 13,
            label = if i % 5 == 0 { "important" } else { "new" },
            i = i
        );
        fs::write(root_path.join(format!("graph_{}.yml", i)), content)
            .expect("Failed to write record");
    }

    (temp_dir, root_path)
}

fn normalized_tree(root: &PathBuf) -> PathTree {
    let mut tree = build_tree(root, LoadMode::Structured);
    normalize(&mut tree);
    tree
}

fn bench_query_parsing(c: &mut Criterion) {
    let queries = vec![
        "simple",
        "two words",
        "\"exact phrase\"",
        "#finance -#archived",
        "revenue #region3 -draft 'year end'",
        "unbalanced \"quote",
    ];

    let mut group = c.benchmark_group("query_parsing");
    for query in queries {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, &q| {
            b.iter(|| famdex::query::parse_query(black_box(q)))
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let (_temp_dir, root_path) = create_benchmark_fixtures();

    c.bench_function("load_and_normalize", |b| {
        b.iter(|| normalized_tree(black_box(&root_path)))
    });
}

fn bench_search(c: &mut Criterion) {
    let (_temp_dir, root_path) = create_benchmark_fixtures();
    let engine = SearchEngine::new(normalized_tree(&root_path));
    let query = engine.parse("revenue #finance -#region3");

    let mut group = c.benchmark_group("search");

    group.bench_function("uncached", |b| {
        b.iter_batched(
            || SearchEngine::new(engine.tree().clone()),
            |fresh| fresh.search(black_box(&query), false),
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("cached", |b| {
        b.iter(|| engine.search(black_box(&query), false))
    });

    group.bench_function("ratio", |b| {
        b.iter(|| engine.search_ratio(black_box("#important | team 3"), true))
    });

    group.finish();
}

fn bench_tags(c: &mut Criterion) {
    let (_temp_dir, root_path) = create_benchmark_fixtures();
    let tree = normalized_tree(&root_path);

    c.bench_function("rank_tags", |b| {
        b.iter(|| famdex::tags::rank_tags(black_box(&tree), 0.2))
    });
}

criterion_group!(benches, bench_query_parsing, bench_load, bench_search, bench_tags);

criterion_main!(benches);
