use std::collections::HashSet;

use rand::Rng;
use rand::rngs::SmallRng;

use crate::catalog::{Answer, Difficulty, Operation, Problem, ProblemCatalog};
use crate::error::GameError;

/// Exhaustion cycles allowed per selection before giving up.
const MAX_EXHAUSTION_CYCLES: usize = 2;

/// Problem texts already drawn in the current play session.
#[derive(Clone, Debug, Default)]
pub struct SessionHistory {
    used: HashSet<String>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.used.contains(text)
    }

    pub fn record(&mut self, text: &str) {
        self.used.insert(text.to_string());
    }

    pub fn clear(&mut self) {
        self.used.clear();
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

pub struct ProblemSelector {
    rng: SmallRng,
}

impl ProblemSelector {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }

    /// Draw `count` problems for one operation and difficulty.
    pub fn select(
        &mut self,
        catalog: &ProblemCatalog,
        history: &mut SessionHistory,
        operation: Operation,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Problem>, GameError> {
        self.select_mixed(catalog, history, &[operation], difficulty, count)
    }

    /// Draw `count` problems where each draw first picks one of `operations`.
    ///
    /// Texts in `history` are skipped and every drawn text is recorded there.
    /// Answers never repeat within one call. When the filtered pool runs dry
    /// the history is cleared and selection restarts from scratch; a second
    /// dry run means the catalog itself is too small.
    pub fn select_mixed(
        &mut self,
        catalog: &ProblemCatalog,
        history: &mut SessionHistory,
        operations: &[Operation],
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Problem>, GameError> {
        let full_pool: Vec<&Problem> = operations
            .iter()
            .flat_map(|&op| catalog.problems(op, difficulty))
            .collect();
        if full_pool.is_empty() {
            return Err(insufficient(operations, difficulty, count, 0));
        }

        for cycle in 0..MAX_EXHAUSTION_CYCLES {
            if let Some(problems) = self.draw(catalog, history, operations, difficulty, count) {
                return Ok(problems);
            }
            tracing::debug!(cycle, "problem pool exhausted, clearing session history");
            history.clear();
        }

        let mut answers: Vec<Answer> = full_pool.iter().map(|p| p.answer).collect();
        answers.sort_unstable();
        answers.dedup();
        Err(insufficient(operations, difficulty, count, answers.len()))
    }

    fn draw(
        &mut self,
        catalog: &ProblemCatalog,
        history: &mut SessionHistory,
        operations: &[Operation],
        difficulty: Difficulty,
        count: usize,
    ) -> Option<Vec<Problem>> {
        let mut picked: Vec<Problem> = Vec::with_capacity(count);
        let mut used_answers: HashSet<Answer> = HashSet::new();

        while picked.len() < count {
            let candidates_by_op: Vec<Vec<&Problem>> = operations
                .iter()
                .map(|&op| {
                    catalog
                        .problems(op, difficulty)
                        .iter()
                        .filter(|p| {
                            !used_answers.contains(&p.answer) && !history.contains(&p.text)
                        })
                        .collect::<Vec<_>>()
                })
                .filter(|candidates| !candidates.is_empty())
                .collect();

            if candidates_by_op.is_empty() {
                return None;
            }

            let op_idx = self.rng.gen_range(0..candidates_by_op.len());
            let candidates = &candidates_by_op[op_idx];
            let problem = candidates[self.rng.gen_range(0..candidates.len())].clone();

            used_answers.insert(problem.answer);
            history.record(&problem.text);
            picked.push(problem);
        }

        Some(picked)
    }
}

fn insufficient(
    operations: &[Operation],
    difficulty: Difficulty,
    needed: usize,
    available: usize,
) -> GameError {
    let ops: Vec<&str> = operations.iter().map(|op| op.as_str()).collect();
    GameError::InsufficientPool {
        pool: format!("{}/{difficulty}", ops.join("+")),
        needed,
        available,
    }
}
