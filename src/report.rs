//! Per-sample records, aggregate statistics and the JSON report.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Outcome of one benchmarked sample. Absent token counts serialize as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleResult {
    pub question_id: i64,
    pub image_id: String,
    pub category: String,
    pub question: String,
    pub reference: Option<String>,
    pub response: String,
    pub latency_ms: f64,
    pub similarity: f64,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// The full benchmark report written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub server_url: String,
    /// UTC creation time, `YYYY-MM-DDTHH:MM:SSZ`.
    pub created: String,
    pub num_samples: usize,
    pub avg_latency_ms: f64,
    pub avg_similarity: f64,
    pub results: Vec<SampleResult>,
}

impl BenchReport {
    /// Assembles a report over the accumulated results, stamping the current
    /// UTC time. Averages are 0 for an empty result set.
    pub fn new(
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        server_url: impl Into<String>,
        results: Vec<SampleResult>,
    ) -> Self {
        let num_samples = results.len();
        let denom = num_samples.max(1) as f64;
        Self {
            model: model.into(),
            temperature,
            max_tokens,
            server_url: server_url.into(),
            created: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            num_samples,
            avg_latency_ms: results.iter().map(|r| r.latency_ms).sum::<f64>() / denom,
            avg_similarity: results.iter().map(|r| r.similarity).sum::<f64>() / denom,
            results,
        }
    }

    /// Writes the report as pretty-printed JSON, creating parent directories
    /// as needed and overwriting any existing file.
    pub fn save(&self, path: &Path) -> Result<(), BenchError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(latency_ms: f64, similarity: f64) -> SampleResult {
        SampleResult {
            question_id: 1,
            image_id: "001".to_string(),
            category: "conv".to_string(),
            question: "What is this?".to_string(),
            reference: Some("a dog".to_string()),
            response: "a dog".to_string(),
            latency_ms,
            similarity,
            prompt_tokens: Some(291),
            completion_tokens: Some(12),
            total_tokens: Some(303),
        }
    }

    #[test]
    fn empty_report_has_zero_averages() {
        let report = BenchReport::new("m", 0.2, 256, "http://localhost:8080", Vec::new());
        assert_eq!(report.num_samples, 0);
        assert_eq!(report.avg_latency_ms, 0.0);
        assert_eq!(report.avg_similarity, 0.0);
        assert!(report.results.is_empty());
    }

    #[test]
    fn averages_are_arithmetic_means() {
        let report = BenchReport::new(
            "m",
            0.2,
            256,
            "http://localhost:8080",
            vec![sample(100.0, 0.5), sample(300.0, 1.0)],
        );
        assert_eq!(report.num_samples, 2);
        assert!((report.avg_latency_ms - 200.0).abs() < 1e-9);
        assert!((report.avg_similarity - 0.75).abs() < 1e-9);
    }

    #[test]
    fn created_is_utc_second_resolution() {
        let report = BenchReport::new("m", 0.2, 256, "s", Vec::new());
        // e.g. 2026-08-31T12:34:56Z
        assert_eq!(report.created.len(), 20);
        assert!(report.created.ends_with('Z'));
        assert_eq!(&report.created[4..5], "-");
        assert_eq!(&report.created[10..11], "T");
    }

    #[test]
    fn report_round_trips_through_json() {
        let mut incomplete = sample(42.5, 0.25);
        incomplete.reference = None;
        incomplete.prompt_tokens = None;
        incomplete.total_tokens = None;
        let report = BenchReport::new(
            "gemma-3-4b-it-q4_K_M",
            0.2,
            256,
            "http://127.0.0.1:8080",
            vec![sample(123.4, 0.9), incomplete],
        );

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: BenchReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.model, report.model);
        assert_eq!(parsed.temperature, report.temperature);
        assert_eq!(parsed.max_tokens, report.max_tokens);
        assert_eq!(parsed.created, report.created);
        assert_eq!(parsed.num_samples, 2);
        assert!((parsed.avg_latency_ms - report.avg_latency_ms).abs() < 1e-9);
        assert!((parsed.avg_similarity - report.avg_similarity).abs() < 1e-9);
        assert_eq!(parsed.results[1].reference, None);
        assert_eq!(parsed.results[1].prompt_tokens, None);
        assert_eq!(parsed.results[1].completion_tokens, Some(12));
        assert_eq!(parsed.results[0].response, "a dog");
    }

    #[test]
    fn absent_token_counts_serialize_as_null() {
        let mut result = sample(1.0, 1.0);
        result.prompt_tokens = None;
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""prompt_tokens":null"#));
    }

    #[test]
    fn save_creates_parent_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts/baseline/out.json");

        let report = BenchReport::new("m", 0.2, 256, "s", vec![sample(10.0, 1.0)]);
        report.save(&path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.contains(r#""num_samples": 1"#));

        let report = BenchReport::new("m", 0.2, 256, "s", Vec::new());
        report.save(&path).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert!(second.contains(r#""num_samples": 0"#));
    }
}
