//! Benchmarks for precommit-gate.

#![allow(missing_docs)]
#![allow(let_underscore_drop)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use precommit_gate::checks::builtin;
use precommit_gate::core::collector::{self, FileRecord, ProjectFileSet};
use precommit_gate::core::rules;
use std::path::PathBuf;
use tempfile::TempDir;

fn synthetic_files(count: usize) -> ProjectFileSet {
    (0..count)
        .map(|i| FileRecord {
            path: PathBuf::from(format!("src/Module{}/File{i}.php", i % 20)),
            content: "<?php\nfunction handle($request) {\n    return $request;\n}\n".repeat(40),
        })
        .collect()
}

fn benchmark_rule_check(c: &mut Criterion) {
    let files = synthetic_files(500);
    let rules = builtin::php_rules();

    c.bench_function("check_all_500_files", |b| {
        b.iter(|| black_box(rules::check_all(black_box(&files), &rules).len()));
    });
}

fn benchmark_collection(c: &mut Criterion) {
    let temp = TempDir::new().expect("create temp dir");
    for i in 0..200 {
        let dir = temp.path().join(format!("src/m{}", i % 10));
        std::fs::create_dir_all(&dir).expect("create dir");
        std::fs::write(dir.join(format!("f{i}.php")), "<?php echo 1;\n").expect("write file");
    }
    let vendor = temp.path().join("vendor/pkg");
    std::fs::create_dir_all(&vendor).expect("create vendor");
    std::fs::write(vendor.join("lib.php"), "<?php").expect("write vendor file");

    c.bench_function("collect_200_files", |b| {
        b.iter(|| {
            let files = collector::collect(temp.path(), &["php"], &["vendor"]).expect("collect");
            black_box(files.len())
        });
    });
}

criterion_group!(benches, benchmark_rule_check, benchmark_collection);
criterion_main!(benches);
