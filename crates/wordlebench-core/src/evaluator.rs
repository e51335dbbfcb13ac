//! Per-letter feedback for a guess.
//!
//! Marks are assigned in a single pass: a letter that is not in the right
//! position but occurs anywhere in the target is `Present`, no matter how many
//! times it occurs. This differs from canonical Wordle duplicate handling and
//! is the rule the stored benchmark results were scored with.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Exact,
    Present,
    Absent,
}

impl Mark {
    pub fn as_char(self) -> char {
        match self {
            Mark::Exact => 'G',
            Mark::Present => 'Y',
            Mark::Absent => 'B',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feedback(Vec<Mark>);

impl Feedback {
    pub fn marks(&self) -> &[Mark] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_perfect(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|m| *m == Mark::Exact)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.0 {
            write!(f, "{}", m.as_char())?;
        }
        Ok(())
    }
}

/// Scores `guess` against `target`, case-insensitively.
///
/// Positions are zipped, so the result has one mark per position present in
/// both words.
pub fn evaluate(guess: &str, target: &str) -> Feedback {
    let guess: Vec<char> = guess.to_uppercase().chars().collect();
    let target: Vec<char> = target.to_uppercase().chars().collect();

    let marks = guess
        .iter()
        .zip(target.iter())
        .map(|(g, t)| {
            if g == t {
                Mark::Exact
            } else if target.contains(g) {
                Mark::Present
            } else {
                Mark::Absent
            }
        })
        .collect();

    Feedback(marks)
}
