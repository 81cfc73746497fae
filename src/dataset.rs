//! Loading of the benchmark dataset from a local JSONL manifest.
//!
//! Each manifest line is one sample: identifiers, the question, the
//! reference answer (nullable) and a path to the image file, resolved
//! relative to the manifest's directory. Rows are pulled lazily so a large
//! dataset is never fully resident.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Lines};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Deserializer};

use crate::error::BenchError;

/// One row of the benchmark dataset, with its image decoded.
#[derive(Debug, Clone)]
pub struct DatasetRow {
    pub question_id: i64,
    pub image_id: String,
    pub category: String,
    pub question: String,
    /// Reference answer; null in the manifest is carried through as `None`.
    pub reference: Option<String>,
    pub image: DynamicImage,
}

impl DatasetRow {
    /// Re-encode the row's image as an in-memory PNG.
    pub fn png_bytes(&self) -> Result<Vec<u8>, BenchError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

#[derive(Deserialize)]
struct ManifestRecord {
    #[serde(deserialize_with = "int_or_string")]
    question_id: i64,
    image_id: String,
    category: String,
    question: String,
    #[serde(default)]
    gpt_answer: Option<String>,
    image: String,
}

/// Lazy reader over a JSONL dataset manifest.
#[derive(Debug)]
pub struct JsonlDataset {
    base_dir: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl JsonlDataset {
    /// Opens a manifest for sequential reading. Blank lines are skipped.
    pub fn open(path: &Path) -> Result<Self, BenchError> {
        let file = File::open(path).map_err(|e| {
            BenchError::DatasetError(format!("failed to open manifest {}: {e}", path.display()))
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            base_dir,
            lines: BufReader::new(file).lines(),
        })
    }

    fn parse_line(&self, line: &str) -> Result<DatasetRow, BenchError> {
        let record: ManifestRecord = serde_json::from_str(line)
            .map_err(|e| BenchError::DatasetError(format!("malformed manifest line: {e}")))?;
        let image_path = self.base_dir.join(&record.image);
        let image = image::open(&image_path).map_err(|e| {
            BenchError::DatasetError(format!(
                "failed to decode image {}: {e}",
                image_path.display()
            ))
        })?;
        Ok(DatasetRow {
            question_id: record.question_id,
            image_id: record.image_id,
            category: record.category,
            question: record.question,
            reference: record.gpt_answer,
            image,
        })
    }
}

impl Iterator for JsonlDataset {
    type Item = Result<DatasetRow, BenchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(BenchError::IoError(e.to_string()))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(&line));
        }
    }
}

/// Accepts `7` as well as `"7"`; the upstream dataset stores identifiers
/// inconsistently across splits.
fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom("question_id is not an integer")),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|e| D::Error::custom(format!("question_id: {e}"))),
        other => Err(D::Error::custom(format!(
            "question_id must be an integer or string, got {other}"
        ))),
    }
}
