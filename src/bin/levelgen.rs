use clap::Parser;
use hospital_levelgen_rust_server::charset::Charset;
use hospital_levelgen_rust_server::level::{generate, GenerateOptions, GeneratedLevel};
use hospital_levelgen_rust_server::log::{default_run_id, emit_log, now_ms};
use hospital_levelgen_rust_server::server_utils::{parse_format, OutputFormat};
use hospital_levelgen_rust_server::types::GenerationOutcome;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 1)]
    level: u32,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
    #[arg(long)]
    charset: Option<String>,
    #[arg(long)]
    format: Option<String>,
    #[arg(long, default_value_t = 1)]
    count: u32,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct LevelResultLine {
    seed: u32,
    level: u32,
    width: i32,
    height: i32,
    outcome: GenerationOutcome,
    rooms: usize,
    doors: usize,
    #[serde(rename = "bossDoors")]
    boss_doors: usize,
    placements: usize,
    #[serde(rename = "repairCarves")]
    repair_carves: usize,
    #[serde(rename = "finalizeRounds")]
    finalize_rounds: usize,
    #[serde(rename = "elapsedMs")]
    elapsed_ms: u64,
    warnings: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "levelCount")]
    level_count: usize,
    #[serde(rename = "degradedCount")]
    degraded_count: usize,
    #[serde(rename = "averageElapsedMs")]
    average_elapsed_ms: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    levels: Vec<LevelResultLine>,
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let base_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id("gen", base_seed, run_started_at_ms));
    let format = match cli.format.as_deref() {
        None => OutputFormat::Ascii,
        raw => parse_format(raw),
    };

    let charset = match parse_charset_arg(cli.charset.as_deref()) {
        Ok(charset) => charset,
        Err(error) => {
            emit_log(
                "error",
                "invalid_charset",
                &run_id,
                None,
                json!({ "error": error }),
            );
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();
    let mut degraded = false;
    for idx in 0..cli.count.max(1) {
        let seed = seed_for(base_seed, idx);
        let options = GenerateOptions {
            seed: Some(seed),
            width: cli.width,
            height: cli.height,
            charset: charset.clone(),
            place: false,
        };
        emit_log(
            "info",
            "level_started",
            &run_id,
            Some(seed),
            json!({
                "level": cli.level,
                "width": cli.width,
                "height": cli.height,
            }),
        );

        let generated = match generate(cli.level, &options) {
            Ok(generated) => generated,
            Err(error) => {
                emit_log(
                    "error",
                    "invalid_options",
                    &run_id,
                    Some(seed),
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for warning in &generated.report.warnings {
            emit_log(
                "warn",
                "level_degraded",
                &run_id,
                Some(seed),
                json!({ "message": warning }),
            );
        }
        if generated.report.outcome == GenerationOutcome::Degraded {
            degraded = true;
        }

        emit_log(
            "info",
            "level_finished",
            &run_id,
            Some(seed),
            json!({
                "outcome": generated.report.outcome,
                "rooms": generated.report.room_count,
                "corridors": generated.report.corridor_count,
                "repairCarves": generated.report.repair_carves,
                "finalizeRounds": generated.report.finalize_rounds,
                "elapsedMs": generated.report.elapsed_ms,
            }),
        );

        if let Err(error) = print_level(&generated, format) {
            emit_log(
                "error",
                "output_failed",
                &run_id,
                Some(seed),
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
        results.push(result_line(&generated));
    }

    let summary = build_run_summary(run_id.clone(), run_started_at_ms, now_ms(), results);

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        json!({
            "levelCount": summary.level_count,
            "degradedCount": summary.degraded_count,
            "averageElapsedMs": summary.average_elapsed_ms,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if degraded {
        std::process::exit(1);
    }
}

fn parse_charset_arg(raw: Option<&str>) -> Result<Option<Charset>, String> {
    match raw {
        None => Ok(None),
        Some(text) => serde_json::from_str::<Charset>(text)
            .map(Some)
            .map_err(|error| format!("charset is not valid JSON: {error}")),
    }
}

fn seed_for(base: u32, idx: u32) -> u32 {
    base.wrapping_add(idx)
}

fn print_level(generated: &GeneratedLevel, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Ascii => {
            for row in &generated.ascii {
                println!("{row}");
            }
            println!();
        }
        OutputFormat::Json => {
            let text = serde_json::to_string(generated).map_err(io::Error::other)?;
            println!("{text}");
        }
    }
    Ok(())
}

fn outcome_key(outcome: GenerationOutcome) -> String {
    match outcome {
        GenerationOutcome::Complete => "complete",
        GenerationOutcome::Degraded => "degraded",
    }
    .to_string()
}

fn result_line(generated: &GeneratedLevel) -> LevelResultLine {
    let report = &generated.report;
    LevelResultLine {
        seed: generated.seed,
        level: generated.level,
        width: generated.width,
        height: generated.height,
        outcome: report.outcome,
        rooms: report.room_count,
        doors: report.door_count,
        boss_doors: report.boss_door_count,
        placements: report.placement_count,
        repair_carves: report.repair_carves,
        finalize_rounds: report.finalize_rounds,
        elapsed_ms: report.elapsed_ms,
        warnings: report.warnings.clone(),
    }
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    levels: Vec<LevelResultLine>,
) -> RunSummary {
    let level_count = levels.len();
    let total_elapsed_ms: u64 = levels.iter().map(|line| line.elapsed_ms).sum();
    let average_elapsed_ms = if level_count == 0 {
        0
    } else {
        total_elapsed_ms / level_count as u64
    };
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    for line in &levels {
        *outcome_counts.entry(outcome_key(line.outcome)).or_insert(0) += 1;
    }
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        level_count,
        degraded_count: outcome_counts.get("degraded").copied().unwrap_or(0),
        average_elapsed_ms,
        outcome_counts,
        levels,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
