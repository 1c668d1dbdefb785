//! Number-guessing game.
//!
//! A round is always in play: guessing the secret reports the win and
//! immediately starts a fresh round with a newly drawn secret.

use std::ops::RangeInclusive;

use datafun_common::{DatafunError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SECRET_RANGE: RangeInclusive<i64> = 1..=100;

/// Result of one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuessOutcome {
    TooLow,
    TooHigh,
    /// Carries the secret and the attempts the finished round took.
    Won { secret: i64, attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessGame {
    secret: i64,
    attempts: u32,
    guesses: Vec<i64>,
}

impl GuessGame {
    /// Start a round with a secret drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_secret(rng.gen_range(SECRET_RANGE))
    }

    /// Start a round with a known secret.
    pub fn with_secret(secret: i64) -> Self {
        Self {
            secret,
            attempts: 0,
            guesses: Vec::new(),
        }
    }

    pub fn secret(&self) -> i64 {
        self.secret
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn guesses(&self) -> &[i64] {
        &self.guesses
    }

    /// Record a guess and compare it with the secret.
    ///
    /// Guesses outside 1..=100 are rejected without touching the round.
    pub fn submit_guess<R: Rng + ?Sized>(&mut self, guess: i64, rng: &mut R) -> Result<GuessOutcome> {
        if !SECRET_RANGE.contains(&guess) {
            return Err(DatafunError::InvalidArgument(format!(
                "guess {} is outside {}..={}",
                guess,
                SECRET_RANGE.start(),
                SECRET_RANGE.end()
            )));
        }

        self.attempts += 1;
        self.guesses.push(guess);

        let outcome = match guess.cmp(&self.secret) {
            std::cmp::Ordering::Less    => GuessOutcome::TooLow,
            std::cmp::Ordering::Greater => GuessOutcome::TooHigh,
            std::cmp::Ordering::Equal   => {
                let won = GuessOutcome::Won {
                    secret: self.secret,
                    attempts: self.attempts,
                };
                *self = Self::new(rng);
                won
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_scripted_round() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut game = GuessGame::with_secret(50);

        assert_eq!(game.submit_guess(30, &mut rng).unwrap(), GuessOutcome::TooLow);
        assert_eq!(game.attempts(), 1);

        assert_eq!(game.submit_guess(70, &mut rng).unwrap(), GuessOutcome::TooHigh);
        assert_eq!(game.attempts(), 2);
        assert_eq!(game.guesses(), &[30, 70]);

        assert_eq!(
            game.submit_guess(50, &mut rng).unwrap(),
            GuessOutcome::Won { secret: 50, attempts: 3 }
        );
        assert_eq!(game.attempts(), 0);
        assert!(game.guesses().is_empty());
        assert!(SECRET_RANGE.contains(&game.secret()));
    }

    #[test]
    fn test_miss_keeps_secret() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut game = GuessGame::new(&mut rng);
        let secret = game.secret();
        let miss = if secret == 100 { 1 } else { secret + 1 };

        for i in 1..=5 {
            game.submit_guess(miss, &mut rng).unwrap();
            assert_eq!(game.secret(), secret);
            assert_eq!(game.attempts(), i);
            assert_eq!(game.guesses().len(), i as usize);
            assert_eq!(*game.guesses().last().unwrap(), miss);
        }
    }

    #[test]
    fn test_secret_always_wins() {
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let mut game = GuessGame::new(&mut rng);
        for _ in 0..50 {
            let secret = game.secret();
            let outcome = game.submit_guess(secret, &mut rng).unwrap();
            assert_eq!(outcome, GuessOutcome::Won { secret, attempts: 1 });
            assert_eq!(game.attempts(), 0);
            assert!(game.guesses().is_empty());
        }
    }

    #[test]
    fn test_out_of_range_guess_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut game = GuessGame::with_secret(10);
        assert!(game.submit_guess(0, &mut rng).is_err());
        assert!(game.submit_guess(101, &mut rng).is_err());
        assert_eq!(game.attempts(), 0);
        assert!(game.guesses().is_empty());
    }

    #[test]
    fn test_new_secret_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..200 {
            assert!(SECRET_RANGE.contains(&GuessGame::new(&mut rng).secret()));
        }
    }
}
