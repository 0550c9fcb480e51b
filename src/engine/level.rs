use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Answer, Difficulty, Operation, Problem};

pub const DEFAULT_LEVEL_SECONDS: u32 = 60;
pub const DEFAULT_PROBLEMS_PER_LEVEL: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub id: String,
    pub text: String,
    pub answer: Answer,
}

/// Drop slot for a piece. Shares the pairing id with exactly one piece.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub answer: Answer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelState {
    pub level_number: u32,
    pub pieces: Vec<Piece>,
    pub targets: Vec<Target>,
    pub matched_ids: HashSet<String>,
    pub time_remaining: u32,
}

impl LevelState {
    pub fn is_complete(&self) -> bool {
        self.matched_ids.len() == self.pieces.len()
    }

    pub fn piece(&self, id: &str) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn target(&self, id: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn is_matched(&self, id: &str) -> bool {
        self.matched_ids.contains(id)
    }

    pub fn unmatched_count(&self) -> usize {
        self.pieces.len().saturating_sub(self.matched_ids.len())
    }

    pub fn progress(&self) -> f64 {
        if self.pieces.is_empty() {
            return 0.0;
        }
        self.matched_ids.len() as f64 / self.pieces.len() as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyMode {
    #[default]
    Chosen,
    ByLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationMode {
    #[default]
    Fixed,
    ByLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifficultyPolicy {
    Chosen(Difficulty),
    ByLevel,
}

impl DifficultyPolicy {
    pub fn from_mode(mode: DifficultyMode, chosen: Difficulty) -> Self {
        match mode {
            DifficultyMode::Chosen => DifficultyPolicy::Chosen(chosen),
            DifficultyMode::ByLevel => DifficultyPolicy::ByLevel,
        }
    }

    pub fn difficulty_for(self, level: u32) -> Difficulty {
        match self {
            DifficultyPolicy::Chosen(d) => d,
            DifficultyPolicy::ByLevel => Difficulty::for_level(level),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationPolicy {
    Fixed(Operation),
    /// Operation mix widens over the first levels: +, then +-, then +-×, then all four.
    ByLevel,
}

impl OperationPolicy {
    pub fn from_mode(mode: OperationMode, chosen: Operation) -> Self {
        match mode {
            OperationMode::Fixed => OperationPolicy::Fixed(chosen),
            OperationMode::ByLevel => OperationPolicy::ByLevel,
        }
    }

    pub fn operations_for(self, level: u32) -> Vec<Operation> {
        match self {
            OperationPolicy::Fixed(op) => vec![op],
            OperationPolicy::ByLevel => {
                let count = (level as usize).clamp(1, Operation::ALL.len());
                Operation::ALL[..count].to_vec()
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct LevelBuilder {
    level_seconds: u32,
}

impl Default for LevelBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_SECONDS)
    }
}

impl LevelBuilder {
    pub fn new(level_seconds: u32) -> Self {
        Self { level_seconds }
    }

    pub fn level_seconds(&self) -> u32 {
        self.level_seconds
    }

    /// Pieces keep selection order. Targets mirror that order; display
    /// order is the renderer's business.
    pub fn build(&self, level_number: u32, problems: &[Problem]) -> LevelState {
        let pieces: Vec<Piece> = problems
            .iter()
            .enumerate()
            .map(|(i, p)| Piece {
                id: format!("eq{}", i + 1),
                text: p.text.clone(),
                answer: p.answer,
            })
            .collect();

        let targets = pieces
            .iter()
            .map(|p| Target {
                id: p.id.clone(),
                answer: p.answer,
            })
            .collect();

        LevelState {
            level_number: level_number.max(1),
            pieces,
            targets,
            matched_ids: HashSet::new(),
            time_remaining: self.level_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems(entries: &[(&str, i64)]) -> Vec<Problem> {
        entries
            .iter()
            .map(|&(text, answer)| Problem {
                text: text.to_string(),
                answer: Answer::from(answer),
                operation: Operation::Addition,
                difficulty: Difficulty::Easy,
            })
            .collect()
    }

    #[test]
    fn build_pairs_pieces_and_targets_by_id() {
        let level = LevelBuilder::default().build(2, &problems(&[("1 + 1", 2), ("2 + 3", 5)]));
        assert_eq!(level.level_number, 2);
        assert_eq!(level.time_remaining, DEFAULT_LEVEL_SECONDS);
        assert_eq!(level.pieces[0].id, "eq1");
        assert_eq!(level.pieces[1].id, "eq2");
        for piece in &level.pieces {
            let target = level.target(&piece.id).unwrap();
            assert_eq!(target.answer, piece.answer);
        }
        assert!(level.matched_ids.is_empty());
        assert!(!level.is_complete());
    }

    #[test]
    fn unmatched_count_tracks_matches() {
        let mut level =
            LevelBuilder::default().build(1, &problems(&[("1 + 1", 2), ("2 + 3", 5), ("3 + 3", 6)]));
        assert_eq!(level.unmatched_count(), 3);
        level.matched_ids.insert("eq2".to_string());
        assert_eq!(level.unmatched_count(), 2);
        level.matched_ids.insert("eq1".to_string());
        level.matched_ids.insert("eq3".to_string());
        assert_eq!(level.unmatched_count(), 0);
        assert!(level.is_complete());
    }

    #[test]
    fn empty_level_is_trivially_complete() {
        let level = LevelBuilder::new(30).build(1, &[]);
        assert!(level.is_complete());
        assert_eq!(level.progress(), 0.0);
        assert_eq!(level.time_remaining, 30);
    }

    #[test]
    fn difficulty_policy_chosen_ignores_level() {
        let policy = DifficultyPolicy::Chosen(Difficulty::Hard);
        assert_eq!(policy.difficulty_for(1), Difficulty::Hard);
        assert_eq!(DifficultyPolicy::ByLevel.difficulty_for(5), Difficulty::Medium);
    }

    #[test]
    fn operation_mix_widens_with_level() {
        let policy = OperationPolicy::ByLevel;
        assert_eq!(policy.operations_for(1), vec![Operation::Addition]);
        assert_eq!(
            policy.operations_for(2),
            vec![Operation::Addition, Operation::Subtraction]
        );
        assert_eq!(policy.operations_for(3).len(), 3);
        assert_eq!(policy.operations_for(4).len(), 4);
        assert_eq!(policy.operations_for(12).len(), 4);
        assert_eq!(
            OperationPolicy::Fixed(Operation::Division).operations_for(9),
            vec![Operation::Division]
        );
    }
}
