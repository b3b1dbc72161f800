//! Performance benchmarks for tempo analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stratum_tempo::features::onset::spectral_flux::compute_onset_function;
use stratum_tempo::features::onset::threshold::normalize;
use stratum_tempo::features::period::comb_filter::comb_filter_scores;
use stratum_tempo::{analyze_audio, AnalysisConfig, AudioSignal, NoProgress, PcmBuffer};

/// 30 seconds of 120 BPM clicks at 44.1 kHz
fn click_train() -> Vec<f32> {
    let sample_rate = 44100usize;
    let mut samples = vec![0.0f32; sample_rate * 30];
    for start in (0..samples.len()).step_by(sample_rate / 2) {
        for i in 0..441.min(samples.len() - start) {
            let t = i as f32 / sample_rate as f32;
            samples[start + i] = 0.8 * (2.0 * std::f32::consts::PI * 1000.0 * t).sin() * (-t / 0.003).exp();
        }
    }
    samples
}

fn bench_analyze_audio(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let buffer = PcmBuffer::mono(click_train(), 44100).expect("valid buffer");

    c.bench_function("analyze_audio_30s", |b| {
        b.iter(|| {
            let _ = analyze_audio(black_box(&buffer), black_box(&config), &NoProgress);
        });
    });
}

fn bench_stages(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let signal = AudioSignal {
        sample_rate: 44100,
        samples: click_train(),
    };

    c.bench_function("spectral_flux_30s", |b| {
        b.iter(|| compute_onset_function(black_box(&signal), black_box(&config)));
    });

    let odf = compute_onset_function(&signal, &config).map(|odf| normalize(&odf));
    if let Some(odf) = odf {
        c.bench_function("comb_filter_30s", |b| {
            b.iter(|| comb_filter_scores(black_box(&odf), black_box(&config)));
        });
    }
}

criterion_group!(benches, bench_analyze_audio, bench_stages);
criterion_main!(benches);
