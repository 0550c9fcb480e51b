use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

const BUNDLED_PROBLEMS: &str = include_str!("../assets/math-problems.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(key.trim()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Addition => "Addition",
            Operation::Subtraction => "Subtraction",
            Operation::Multiplication => "Multiplication",
            Operation::Division => "Division",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(key.trim()))
    }

    /// Level thresholds used when difficulty is not chosen up front.
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=3 => Difficulty::Easy,
            4..=6 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric answer compared by value: `4` and `4.0` are the same answer.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(try_from = "f64")]
pub struct Answer(f64);

impl Answer {
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // Fold -0.0 into 0.0 so equal values share one bit pattern.
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Answer {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("answer {value} is not a finite number"))
    }
}

impl From<i64> for Answer {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl PartialEq for Answer {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Answer {}

impl Hash for Answer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Answer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Answer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub text: String,
    pub answer: Answer,
    pub operation: Operation,
    pub difficulty: Difficulty,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEntry {
    text: String,
    answer: Answer,
}

type RawCatalog = BTreeMap<String, BTreeMap<String, Vec<RawEntry>>>;

/// Read-only lookup of operation -> difficulty -> problems.
#[derive(Clone, Debug, Default)]
pub struct ProblemCatalog {
    pools: BTreeMap<(Operation, Difficulty), Vec<Problem>>,
}

impl ProblemCatalog {
    pub fn bundled() -> Result<Self, GameError> {
        Self::from_json(BUNDLED_PROBLEMS)
    }

    pub fn load(path: &Path) -> Result<Self, GameError> {
        let content = fs::read_to_string(path).map_err(|e| {
            GameError::CatalogLoadFailed(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let raw: RawCatalog =
            serde_json::from_str(json).map_err(|e| GameError::CatalogLoadFailed(e.to_string()))?;

        let mut pools = BTreeMap::new();
        for (op_key, by_difficulty) in raw {
            let Some(operation) = Operation::from_key(&op_key) else {
                tracing::warn!(operation = %op_key, "ignoring unknown operation in catalog");
                continue;
            };
            for (diff_key, entries) in by_difficulty {
                let Some(difficulty) = Difficulty::from_key(&diff_key) else {
                    tracing::warn!(%operation, difficulty = %diff_key, "ignoring unknown difficulty in catalog");
                    continue;
                };
                let problems = entries
                    .into_iter()
                    .map(|e| Problem {
                        text: e.text,
                        answer: e.answer,
                        operation,
                        difficulty,
                    })
                    .collect();
                pools.insert((operation, difficulty), problems);
            }
        }

        tracing::debug!(pools = pools.len(), "problem catalog loaded");
        Ok(Self { pools })
    }

    pub fn from_problems(problems: impl IntoIterator<Item = Problem>) -> Self {
        let mut pools: BTreeMap<(Operation, Difficulty), Vec<Problem>> = BTreeMap::new();
        for p in problems {
            pools.entry((p.operation, p.difficulty)).or_default().push(p);
        }
        Self { pools }
    }

    pub fn problems(&self, operation: Operation, difficulty: Difficulty) -> &[Problem] {
        self.pools
            .get(&(operation, difficulty))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Operations with at least one problem at any difficulty.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops: Vec<Operation> = self
            .pools
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|((op, _), _)| *op)
            .collect();
        ops.dedup();
        ops
    }

    pub fn is_empty(&self) -> bool {
        self.pools.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }
}
