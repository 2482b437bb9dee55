//! Append-only prediction journal (CSV on disk)

use crate::classifier::Action;
use crate::types::{EngineError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Grade of a prediction. Terminal once Won/Lost: a graded row is never
/// reviewed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "WIN")]
    Win,
    #[serde(rename = "LOSS")]
    Loss,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Outcome::Pending => "Pending",
            Outcome::Win => "WIN",
            Outcome::Loss => "LOSS",
        })
    }
}

/// One journal row: a prediction made for one symbol in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Prediction {
    pub date: NaiveDate,
    pub symbol: String,
    pub price: Decimal,
    pub action: Action,
    pub momentum: f64,
    pub outcome: Outcome,
}

/// The prediction journal. Rows are only ever appended, and only the
/// `outcome` column of a pending row is ever rewritten.
pub struct Journal {
    path: PathBuf,
    rows: Vec<Prediction>,
}

impl Journal {
    /// Load the journal, treating a missing file as an empty journal.
    /// An unreadable or malformed file is a run-level failure.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self { path, rows: Vec::new() });
        }

        let mut reader = csv::Reader::from_path(&path).map_err(csv_err)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record.map_err(csv_err)?);
        }
        Ok(Self { path, rows })
    }

    pub fn rows(&self) -> &[Prediction] {
        &self.rows
    }

    /// Indices of rows still awaiting a grade
    pub fn pending_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.outcome == Outcome::Pending)
            .map(|(i, _)| i)
            .collect()
    }

    /// Append one row and persist. On a failed persist the row is dropped
    /// from memory so the journal never claims more than the file holds.
    pub fn append(&mut self, row: Prediction) -> Result<()> {
        self.rows.push(row);
        if let Err(e) = self.persist() {
            self.rows.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Transition one row's outcome and persist. A failed persist rolls the
    /// transition back so a later run can retry the grade.
    pub fn set_outcome(&mut self, index: usize, outcome: Outcome) -> Result<()> {
        let previous = self.rows[index].outcome;
        self.rows[index].outcome = outcome;
        if let Err(e) = self.persist() {
            self.rows[index].outcome = previous;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| EngineError::CorruptState(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("csv.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn csv_err(e: csv::Error) -> EngineError {
    EngineError::CorruptState(e.to_string())
}
