//! Grade calculator: percentages, letter grades, display tags and GPA.
//!
//! Every function here is total. Missing or unusable inputs produce a
//! fallback value instead of an error, NaN or infinity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Anything carrying a score and the maximum it was marked out of.
pub trait Scored {
    fn score(&self) -> Option<f64>;
    fn max_score(&self) -> Option<f64>;
}

/// A loose score/max pair, as it arrives from a form or an untyped record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePair {
    pub score: Option<f64>,
    pub max_score: Option<f64>,
}

impl ScorePair {
    pub fn new(score: f64, max_score: f64) -> Self {
        Self {
            score: Some(score),
            max_score: Some(max_score),
        }
    }
}

impl Scored for ScorePair {
    fn score(&self) -> Option<f64> {
        self.score
    }

    fn max_score(&self) -> Option<f64> {
        self.max_score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }

    /// Value on the 4.0 scale.
    pub fn points(self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::B => 3.0,
            LetterGrade::C => 2.0,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }

    pub fn color_tag(self) -> &'static str {
        match self {
            LetterGrade::A => "grade-a",
            LetterGrade::B => "grade-b",
            LetterGrade::C => "grade-c",
            LetterGrade::D => "grade-d",
            LetterGrade::F => "grade-f",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLetterGrade(pub String);

impl fmt::Display for UnknownLetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown letter grade '{}'", self.0)
    }
}

impl std::error::Error for UnknownLetterGrade {}

impl FromStr for LetterGrade {
    type Err = UnknownLetterGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(LetterGrade::A),
            "B" => Ok(LetterGrade::B),
            "C" => Ok(LetterGrade::C),
            "D" => Ok(LetterGrade::D),
            "F" => Ok(LetterGrade::F),
            other => Err(UnknownLetterGrade(other.to_string())),
        }
    }
}

/// `score / max_score * 100`, or `None` when either input is missing, the
/// maximum is zero, or the result is not finite. Scores above the maximum are
/// not clamped.
pub fn percentage(score: Option<f64>, max_score: Option<f64>) -> Option<f64> {
    let (score, max_score) = (score?, max_score?);
    if max_score == 0.0 {
        return None;
    }
    let value = score / max_score * 100.0;
    value.is_finite().then_some(value)
}

/// Thresholds are inclusive at the lower bound. Out-of-range input falls
/// through to A (above 100) or F (below 0, NaN).
pub fn letter_grade(percentage: f64) -> LetterGrade {
    if percentage >= 90.0 {
        LetterGrade::A
    } else if percentage >= 80.0 {
        LetterGrade::B
    } else if percentage >= 70.0 {
        LetterGrade::C
    } else if percentage >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

/// Display tag for a letter; anything unrecognized gets the F tag.
pub fn grade_color_tag(letter: &str) -> &'static str {
    letter
        .parse::<LetterGrade>()
        .unwrap_or(LetterGrade::F)
        .color_tag()
}

/// Mean grade points, rounded to two decimals. A grade without a usable
/// percentage counts as an F; an empty set averages to 0.
pub fn gpa<T: Scored>(grades: &[T]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }

    let total: f64 = grades
        .iter()
        .map(|grade| {
            percentage(grade.score(), grade.max_score())
                .map(letter_grade)
                .unwrap_or(LetterGrade::F)
                .points()
        })
        .sum();

    round_to_hundredths(total / grades.len() as f64)
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
