// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed score → grade / status / color step functions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// ≥90 A, ≥80 B, ≥70 C, ≥60 D, else F.
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Qualitative status of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl Status {
    /// ≥90 excellent, ≥75 good, ≥50 warning, else critical.
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Status::Excellent,
            75..=89 => Status::Good,
            50..=74 => Status::Warning,
            _ => Status::Critical,
        }
    }

    /// Dashboard color for the status band.
    pub fn color(self) -> &'static str {
        match self {
            Status::Excellent => "#10b981",
            Status::Good => "#3b82f6",
            Status::Warning => "#f59e0b",
            Status::Critical => "#ef4444",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(90), Grade::A);
        assert_eq!(Grade::from_score(89), Grade::B);
        assert_eq!(Grade::from_score(80), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::C);
        assert_eq!(Grade::from_score(60), Grade::D);
        assert_eq!(Grade::from_score(59), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn test_status_and_color() {
        assert_eq!(Status::from_score(90), Status::Excellent);
        assert_eq!(Status::from_score(75), Status::Good);
        assert_eq!(Status::from_score(74), Status::Warning);
        assert_eq!(Status::from_score(50), Status::Warning);
        assert_eq!(Status::from_score(49), Status::Critical);
        assert_eq!(Status::Good.color(), "#3b82f6");
        assert_eq!(
            serde_json::to_string(&Status::Excellent).unwrap(),
            "\"excellent\""
        );
    }
}
