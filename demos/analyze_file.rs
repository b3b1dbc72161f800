//! Example: Analyze a single audio file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- [--json] <file>
//!
//! Set `RUST_LOG=info` (or `debug`) to see progress and pipeline details.

#[path = "common/decode.rs"]
mod decode;

use std::env;

use stratum_tempo::{analyze_audio, AnalysisConfig, AnalysisStage, ProgressObserver};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let mut json = false;
    let mut path: Option<String> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--help" | "-h" => {
                eprintln!("Usage: analyze_file [--json] <file>");
                return Ok(());
            }
            _ => path = Some(arg),
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let progress = |percent: u8, stage: &str| log::info!("[{:>3}%] {}", percent, stage);

    let buffer = decode::decode_audio_file(&path)?;
    let decoded = AnalysisStage::Decoded;
    progress.on_progress(decoded.percent(), decoded.label());

    let config = AnalysisConfig::default();
    let result = analyze_audio(&buffer, &config, &progress)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Analysis Results: {}", path);
    println!(
        "  BPM: {} (confidence: {:.0}%, {})",
        result.bpm,
        result.confidence * 100.0,
        result.confidence_level().as_str()
    );
    println!(
        "  Duration: {:.2} s, {} channel(s) at {} Hz",
        result.metadata.duration_seconds,
        buffer.channel_count(),
        result.metadata.sample_rate
    );
    println!("  Onsets: {} in {} frames", result.onsets.len(), result.frame_count);
    if !result.flags.is_empty() {
        println!("  Flags: {:?}", result.flags);
    }

    println!("  Candidates:");
    for candidate in result.candidates.iter().take(5) {
        println!(
            "    {:>6.1} BPM  score={:.3} (autocorr={:.3}, comb={:.3}){}",
            candidate.bpm,
            candidate.score,
            candidate.autocorr,
            candidate.comb,
            if candidate.selected { "  <- selected" } else { "" }
        );
    }

    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    Ok(())
}
