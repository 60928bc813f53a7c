use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sp_core::config::OverlayRule;
use sp_core::document::parse_filename;
use std::path::PathBuf;

fn bench_parse_filename(c: &mut Criterion) {
    let overlays = vec![
        OverlayRule {
            tag: "pass".into(),
            marker: "passed".into(),
            image: PathBuf::from("pass.png"),
        },
        OverlayRule {
            tag: "fail".into(),
            marker: "".into(),
            image: PathBuf::from("fail.png"),
        },
    ];
    let names = vec![
        "report_2150_passed.pdf",
        "report_5_final.pdf",
        "nounderscore.pdf",
        "batch_9700_failed_resubmission.pdf",
        "scan_0042.pdf",
    ];

    c.bench_function("parse_1000_filenames", |b| {
        b.iter(|| {
            for _ in 0..200 {
                for name in &names {
                    black_box(parse_filename(name, &overlays).unwrap());
                }
            }
        })
    });
}

criterion_group!(benches, bench_parse_filename);
criterion_main!(benches);
