//! Performance benchmarks for Voicefall Gateway
//!
//! Run with: cargo bench
//! Or for specific benchmarks: cargo bench -- <filter>

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::time::Duration;
use voicefall_gateway::core::audio::generate_silence;
use voicefall_gateway::{PcmAudio, RawAudio, SynthesisRequest, TextBounds, encode, sanitize};

/// Benchmark request parsing performance
fn bench_request_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parsing");
    group.measurement_time(Duration::from_secs(5));

    let small = r#"{"text":"Hello world","speaker_id":3}"#;
    let large = format!(
        r#"{{"text":"{}","language":"en","speaker_wav":"speaker.wav","length_scale":1.1}}"#,
        "Hello, this is a test message for speech synthesis. ".repeat(30)
    );

    for (name, body) in [("small", small.to_string()), ("large", large)] {
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, body.len()), &body, |b, body| {
            b.iter(|| {
                let _: Result<SynthesisRequest, _> = serde_json::from_str(black_box(body));
            });
        });
    }

    group.finish();
}

/// Benchmark text sanitization
fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");

    let short = "\u{201c}Hello there\u{201d} \u{2014} how are you today?!?";
    let long = "Some text, with (brackets) & symbols... and \u{2026} ellipses! ".repeat(25);

    group.bench_function("short_strict", |b| {
        b.iter(|| sanitize(black_box(short), TextBounds::STRICT))
    });
    group.bench_function("long_extended", |b| {
        b.iter(|| sanitize(black_box(&long), TextBounds::EXTENDED))
    });

    group.finish();
}

/// Benchmark audio encoding and WAV serialization
fn bench_audio(c: &mut Criterion) {
    let mut group = c.benchmark_group("audio");

    for seconds in [1usize, 10] {
        let samples: Vec<f32> = (0..seconds * 22050)
            .map(|i| (i as f32 * 0.05).sin() * 0.8)
            .collect();
        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("encode_f32", seconds),
            &samples,
            |b, samples| b.iter(|| encode(RawAudio::F32(black_box(samples.clone())), 22050)),
        );

        let pcm: PcmAudio = encode(RawAudio::F32(samples), 22050);
        group.bench_with_input(BenchmarkId::new("to_wav_bytes", seconds), &pcm, |b, pcm| {
            b.iter(|| black_box(pcm).to_wav_bytes())
        });
    }

    group.bench_function("silence_100ms", |b| {
        b.iter(|| generate_silence(black_box(0.1), 22050))
    });

    group.finish();
}

criterion_group!(benches, bench_request_parsing, bench_sanitize, bench_audio);
criterion_main!(benches);
