//! Benchmark harness for OpenAI-compatible multimodal inference servers.
//!
//! Replays a vision-question-answering dataset against a server's
//! `/v1/chat/completions` endpoint, one request per sample, and reports
//! per-sample latency, token usage and a block-matching similarity score
//! against the reference answers, plus run-level averages.

pub mod backends;
pub mod chat;
pub mod dataset;
pub mod error;
pub mod report;
pub mod runner;
pub mod similarity;

pub use backends::openai_compat::{OpenAiCompat, OpenAiCompatConfig};
pub use chat::{ChatMessage, ChatProvider, ChatResponse, Usage};
pub use dataset::{DatasetRow, JsonlDataset};
pub use error::BenchError;
pub use report::{BenchReport, SampleResult};
pub use runner::{run_benchmark, BenchConfig};
