//! Benchmarks for probe output handling.
//!
//! Measures JSON document parsing for metadata probe output and token
//! rendering for the argument builder.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use frameprobe::Options;
use serde_json::Value;

/// Sample ffprobe JSON output for a typical two-stream file.
const FFPROBE_JSON: &str = r#"{
    "format": {
        "filename": "/movies/movie.mkv",
        "format_name": "matroska,webm",
        "duration": "7200.000000",
        "size": "15000000000"
    },
    "streams": [
        {
            "index": 0,
            "codec_type": "video",
            "codec_name": "hevc",
            "width": 3840,
            "height": 2160,
            "r_frame_rate": "24000/1001",
            "disposition": {"default": 1, "forced": 0},
            "tags": {}
        },
        {
            "index": 1,
            "codec_type": "audio",
            "codec_name": "truehd",
            "channels": 8,
            "sample_rate": "48000",
            "disposition": {"default": 1, "forced": 0},
            "tags": {"language": "eng", "title": "TrueHD 7.1"}
        }
    ]
}"#;

fn bench_metadata_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("metadata_parsing");
    group.throughput(Throughput::Bytes(FFPROBE_JSON.len() as u64));
    group.bench_function("json_document", |b| {
        b.iter(|| {
            let doc: Value = serde_json::from_str(black_box(FFPROBE_JSON)).unwrap();
            black_box(doc)
        })
    });
    group.finish();
}

fn bench_arg_rendering(c: &mut Criterion) {
    c.bench_function("render_args", |b| {
        b.iter(|| {
            let mut opts = Options::new();
            opts.option("select_streams", "v:0")
                .option("loglevel", "quiet")
                .flag("count_frames")
                .option("probesize", 5_000_000);
            black_box(opts.to_args())
        })
    });
}

criterion_group!(benches, bench_metadata_parsing, bench_arg_rendering);
criterion_main!(benches);
