use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use mood_curator::observability;
use mood_curator::replay::{ReplayConfig, replay_recommendation};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing()?;
    let config = parse_args()?;
    let report = replay_recommendation(config).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to render report")?
    );
    Ok(())
}

fn parse_args() -> Result<ReplayConfig> {
    let mut dataset = None;
    let mut mood = None;
    let mut minutes = None;
    let mut seed = None;
    let mut shuffle = true;
    let mut remote = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => {
                let value = args.next().context("--dataset requires a path argument")?;
                dataset = Some(PathBuf::from(value));
            }
            "--mood" => {
                let value = args.next().context("--mood requires a description")?;
                mood = Some(value);
            }
            "--minutes" => {
                let value = args.next().context("--minutes requires a number")?;
                let parsed = value
                    .parse::<u32>()
                    .context("--minutes must be an integer")?;
                minutes = Some(parsed);
            }
            "--seed" => {
                let value = args.next().context("--seed requires a number")?;
                let parsed = value.parse::<u64>().context("--seed must be an integer")?;
                seed = Some(parsed);
            }
            "--no-shuffle" => {
                shuffle = false;
            }
            "--remote" => {
                remote = true;
            }
            "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                bail!("unknown argument: {}", arg);
            }
        }
    }

    let dataset = dataset.ok_or_else(|| anyhow!("--dataset is required"))?;
    let mood = mood.ok_or_else(|| anyhow!("--mood is required"))?;
    let minutes = minutes.ok_or_else(|| anyhow!("--minutes is required"))?;

    Ok(ReplayConfig {
        dataset,
        mood,
        minutes,
        seed,
        shuffle,
        remote,
    })
}

fn print_usage() {
    eprintln!(
        "Usage: replay_recommendation --dataset <tracks.jsonl> --mood <text> --minutes <n> [--seed <u64>] [--no-shuffle] [--remote]"
    );
}
