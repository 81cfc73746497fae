use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use llava_bench::{run_benchmark, BenchConfig, JsonlDataset, OpenAiCompat};

#[derive(Parser, Debug)]
#[command(
    name = "llava-bench",
    about = "Replay a vision-question-answering dataset against an OpenAI-compatible server",
    version
)]
struct Args {
    /// Base URL of the inference server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,
    /// Model name/alias exposed by the server
    #[arg(long, default_value = "gemma-3-4b-it-q4_K_M")]
    model: String,
    /// Sampling temperature
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,
    /// Maximum tokens to generate per answer
    #[arg(long, default_value_t = 256)]
    max_tokens: u32,
    /// Optional limit on the number of samples
    #[arg(long)]
    limit: Option<usize>,
    /// Path to the dataset manifest (JSONL)
    #[arg(long, default_value = "data/llava-bench-in-the-wild.jsonl")]
    dataset: PathBuf,
    /// Path to write JSON results
    #[arg(long, default_value = "artifacts/baseline/gemma3-4b-baseline.json")]
    output: PathBuf,
    /// Optional per-request timeout in seconds (no timeout by default)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let provider = OpenAiCompat::new(
        &args.server,
        &args.model,
        args.temperature,
        args.max_tokens,
        args.timeout_secs,
    );
    let dataset = JsonlDataset::open(&args.dataset)
        .with_context(|| format!("failed to open dataset manifest {}", args.dataset.display()))?;

    let config = BenchConfig {
        server_url: args.server,
        model: args.model,
        temperature: args.temperature,
        max_tokens: args.max_tokens,
        limit: args.limit,
    };

    let report = run_benchmark(&config, &provider, dataset).await?;
    report
        .save(&args.output)
        .with_context(|| format!("failed to write results to {}", args.output.display()))?;

    println!("Saved results to {}", args.output.display());
    println!(
        "Average latency: {:.1} ms over {} samples",
        report.avg_latency_ms, report.num_samples
    );
    println!("Average similarity: {:.3}", report.avg_similarity);
    Ok(())
}
