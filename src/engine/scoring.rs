/// Completion bonus: one point per started ten seconds left on the clock.
pub fn time_bonus(time_remaining: u32) -> u32 {
    time_remaining.div_ceil(10)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelScore {
    pub bonus: u32,
    pub total_score: u32,
    pub is_new_high_score: bool,
}

/// Running score for one session against the player's stored best.
#[derive(Clone, Debug, Default)]
pub struct ScoreTracker {
    total_score: u32,
    best_score: u32,
}

impl ScoreTracker {
    pub fn new(best_score: u32) -> Self {
        Self {
            total_score: 0,
            best_score,
        }
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn record_completion(&mut self, time_remaining: u32) -> LevelScore {
        let bonus = time_bonus(time_remaining);
        self.total_score += bonus;

        let is_new_high_score = self.total_score > self.best_score;
        if is_new_high_score {
            self.best_score = self.total_score;
        }

        LevelScore {
            bonus,
            total_score: self.total_score,
            is_new_high_score,
        }
    }

    pub fn reset(&mut self) {
        self.total_score = 0;
    }
}
