//! The sequential benchmark loop.
//!
//! One forward pass over the dataset: encode the image, send one chat
//! completion request, score the answer, accumulate the record. Any failure
//! aborts the whole run; nothing is written for a partial run.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::chat::{ChatMessage, ChatProvider, ImageMime};
use crate::dataset::DatasetRow;
use crate::error::BenchError;
use crate::report::{BenchReport, SampleResult};
use crate::similarity;

/// Settings for one benchmark run, echoed into the report.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub server_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Optional cap on the number of samples; `None` runs the whole dataset.
    pub limit: Option<usize>,
}

/// Replays the dataset against the provider and assembles the report.
///
/// Iteration stops as soon as `limit` results have been accumulated, without
/// pulling further rows.
pub async fn run_benchmark<I>(
    config: &BenchConfig,
    provider: &dyn ChatProvider,
    rows: I,
) -> Result<BenchReport, BenchError>
where
    I: IntoIterator<Item = Result<DatasetRow, BenchError>>,
{
    let progress = make_progress_bar(config.limit);
    let mut rows = rows.into_iter();
    let mut results: Vec<SampleResult> = Vec::new();

    loop {
        if config.limit.is_some_and(|limit| results.len() >= limit) {
            break;
        }
        let Some(row) = rows.next() else {
            break;
        };
        results.push(evaluate_sample(provider, row?).await?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(BenchReport::new(
        &config.model,
        config.temperature,
        config.max_tokens,
        &config.server_url,
        results,
    ))
}

async fn evaluate_sample(
    provider: &dyn ChatProvider,
    row: DatasetRow,
) -> Result<SampleResult, BenchError> {
    let png = row.png_bytes()?;
    let message = ChatMessage::user()
        .image(ImageMime::PNG, png)
        .content(row.question.clone())
        .build();

    let start = Instant::now();
    let reply = provider.chat(&[message]).await?;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    let response = reply.text().ok_or_else(|| BenchError::ResponseFormatError {
        message: "chat completion carried no message content".to_string(),
        raw_response: format!("{reply:?}"),
    })?;
    let usage = reply.usage();

    let reference_lower = row
        .reference
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let similarity = similarity::ratio(&response.to_lowercase(), &reference_lower);

    log::debug!(
        "question {} answered in {latency_ms:.1} ms (similarity {similarity:.3})",
        row.question_id
    );

    Ok(SampleResult {
        question_id: row.question_id,
        image_id: row.image_id,
        category: row.category,
        question: row.question,
        reference: row.reference,
        response,
        latency_ms,
        similarity,
        prompt_tokens: usage.as_ref().and_then(|u| u.prompt_tokens),
        completion_tokens: usage.as_ref().and_then(|u| u.completion_tokens),
        total_tokens: usage.as_ref().and_then(|u| u.total_tokens),
    })
}

fn make_progress_bar(total: Option<usize>) -> ProgressBar {
    let bar = match total {
        Some(total) => ProgressBar::new(total as u64),
        None => ProgressBar::no_length(),
    };
    bar.set_style(
        ProgressStyle::with_template("Evaluating {pos}/{len} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
