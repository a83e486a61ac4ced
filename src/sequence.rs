//! The key sequence the player must type during green light.

use rand::Rng;
use tracing::debug;

/// Letters eligible for the sequence. `q` quits the game at any time, so it
/// never appears as a target key.
const ALPHABET: &[u8] = b"abcdefghijklmnoprstuvwxyz";

pub const SEQUENCE_LEN: usize = 5;

/// What a key press did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Matched the expected key; the cursor moved forward.
    Advanced,
    /// Wrong key; the cursor went back to the start.
    Reset,
    /// The final key matched; the whole sequence has been typed.
    Completed,
}

/// Tracks the player's progress through a fixed key sequence.
///
/// The tracker is phase-agnostic: the engine only feeds it keys while the
/// light is green.
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    keys: Vec<char>,
    cursor: usize,
}

impl SequenceTracker {
    /// Generates a fresh random sequence.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let keys = (0..SEQUENCE_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self { keys, cursor: 0 }
    }

    /// Builds a tracker over a known sequence.
    pub fn from_keys(keys: Vec<char>) -> Self {
        Self { keys, cursor: 0 }
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Feeds one key press. A match advances the cursor, anything else resets
    /// it to the start. Reaching the end of the sequence reports `Completed`.
    pub fn on_key(&mut self, key: char) -> KeyOutcome {
        if self.cursor < self.keys.len() && key == self.keys[self.cursor] {
            self.cursor += 1;
            if self.cursor == self.keys.len() {
                debug!("sequence completed");
                KeyOutcome::Completed
            } else {
                debug!(key = %key, cursor = self.cursor, "correct key");
                KeyOutcome::Advanced
            }
        } else {
            debug!(key = %key, "wrong key, sequence reset");
            self.cursor = 0;
            KeyOutcome::Reset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracker() -> SequenceTracker {
        SequenceTracker::from_keys(vec!['a', 'b', 'c', 'd', 'e'])
    }

    #[test]
    fn advances_on_each_correct_key() {
        let mut t = tracker();
        for (i, key) in ['a', 'b', 'c', 'd'].into_iter().enumerate() {
            assert_eq!(t.on_key(key), KeyOutcome::Advanced);
            assert_eq!(t.cursor(), i + 1);
        }
        assert_eq!(t.on_key('e'), KeyOutcome::Completed);
        assert_eq!(t.cursor(), t.keys().len());
    }

    #[test]
    fn wrong_key_resets_to_zero_from_any_position() {
        for progress in 1..5 {
            let mut t = tracker();
            for key in &['a', 'b', 'c', 'd'][..progress] {
                t.on_key(*key);
            }
            assert_eq!(t.cursor(), progress);
            assert_eq!(t.on_key('z'), KeyOutcome::Reset);
            assert_eq!(t.cursor(), 0);
        }
    }

    #[test]
    fn repeating_the_expected_key_does_not_skip_ahead() {
        let mut t = tracker();
        assert_eq!(t.on_key('a'), KeyOutcome::Advanced);
        // 'a' is no longer expected, so it resets.
        assert_eq!(t.on_key('a'), KeyOutcome::Reset);
        assert_eq!(t.cursor(), 0);
    }

    #[test]
    fn generated_sequences_never_contain_the_quit_key() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let t = SequenceTracker::generate(&mut rng);
            assert_eq!(t.keys().len(), SEQUENCE_LEN);
            assert!(t.keys().iter().all(|k| k.is_ascii_lowercase() && *k != 'q'));
        }
    }

    proptest! {
        /// The cursor never exceeds the sequence length, completion fires at
        /// most once per run, and it fires exactly when the cursor reaches the
        /// end.
        #[test]
        fn cursor_stays_bounded_for_any_key_stream(keys in proptest::collection::vec(proptest::char::range('a', 'z'), 0..200)) {
            let mut t = tracker();
            let mut completions = 0;
            for key in keys {
                let outcome = t.on_key(key);
                prop_assert!(t.cursor() <= t.keys().len());
                if outcome == KeyOutcome::Completed {
                    completions += 1;
                    prop_assert_eq!(t.cursor(), t.keys().len());
                    break;
                }
                prop_assert!(t.cursor() < t.keys().len());
                if outcome == KeyOutcome::Reset {
                    prop_assert_eq!(t.cursor(), 0);
                }
            }
            prop_assert!(completions <= 1);
        }
    }
}
