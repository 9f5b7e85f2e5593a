//! The game the signals drive
//!
//! The controller only needs two things from a game: a continuous steering
//! input each tick and a reset when the eyebrow trigger fires.

use log::info;

pub trait Game {
    /// Continuous control in `[0, 1]`, sent once per tick with a face
    fn steer(&mut self, control: f32);

    /// Start over
    fn reset(&mut self);

    /// Short human readable state for the overlay
    fn status(&self) -> String;
}

/// Minimal built-in game: points accrue while the mouth is open
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    score: f32,
    best: f32,
    resets: u32,
    control: f32,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score as u32
    }

    pub fn best(&self) -> u32 {
        self.best as u32
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn control(&self) -> f32 {
        self.control
    }
}

impl Game for Scoreboard {
    fn steer(&mut self, control: f32) {
        self.control = control.clamp(0.0, 1.0);
        self.score += self.control * 10.0;
    }

    fn reset(&mut self) {
        self.best = self.best.max(self.score);
        self.resets += 1;
        info!(
            "Game reset #{}: score {} (best {})",
            self.resets,
            self.score(),
            self.best()
        );
        self.score = 0.0;
        self.control = 0.0;
    }

    fn status(&self) -> String {
        format!("score {}  best {}  resets {}", self.score(), self.best(), self.resets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard() {
        let mut game = Scoreboard::new();
        game.steer(1.0);
        game.steer(0.5);
        game.steer(4.0);
        assert_eq!(game.score(), 25);
        assert_eq!(game.control(), 1.0);

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.best(), 25);
        assert_eq!(game.resets(), 1);

        game.steer(0.2);
        game.reset();
        assert_eq!(game.best(), 25);
        assert_eq!(game.status(), "score 0  best 25  resets 2");
    }
}
