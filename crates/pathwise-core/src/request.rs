//! User input for roadmap generation.
//!
//! A [`RoadmapRequest`] can only be built through [`RoadmapRequest::parse`]
//! (or from already-typed values), so an incomplete request never reaches the
//! prompt builder.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The request field a [`ValidationError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    Goal,
    SkillLevel,
    TimeCommitment,
    LearningStyle,
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Goal => "goal",
            Self::SkillLevel => "skill level",
            Self::TimeCommitment => "time commitment",
            Self::LearningStyle => "learning style",
        };
        f.write_str(s)
    }
}

/// Incomplete or unrecognized user input. No model call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(RequestField),

    #[error("unrecognized {field}: {value:?}")]
    Unrecognized { field: RequestField, value: String },
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Parse a fixed-label enum case-insensitively, reporting blanks as missing.
fn parse_label<T: Copy>(
    input: &str,
    field: RequestField,
    variants: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    variants
        .iter()
        .copied()
        .find(|v| label(*v).eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| ValidationError::Unrecognized {
            field,
            value: trimmed.to_owned(),
        })
}

/// Self-reported current skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkillLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, RequestField::SkillLevel, &Self::ALL, Self::label)
    }
}

/// Weekly study time band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeCommitment {
    LessThan5,
    FiveTo10,
    TenTo15,
    MoreThan15,
}

impl TimeCommitment {
    pub const ALL: [Self; 4] = [
        Self::LessThan5,
        Self::FiveTo10,
        Self::TenTo15,
        Self::MoreThan15,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::LessThan5 => "Less than 5 hours per week",
            Self::FiveTo10 => "5 to 10 hours per week",
            Self::TenTo15 => "10 to 15 hours per week",
            Self::MoreThan15 => "More than 15 hours per week",
        }
    }
}

impl fmt::Display for TimeCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeCommitment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, RequestField::TimeCommitment, &Self::ALL, Self::label)
    }
}

/// Preferred way of learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningStyle {
    HandsOnProjects,
    VideoTutorials,
    ReadingMaterials,
    InteractiveExercises,
    QuizzesAndAssessments,
}

impl LearningStyle {
    pub const ALL: [Self; 5] = [
        Self::HandsOnProjects,
        Self::VideoTutorials,
        Self::ReadingMaterials,
        Self::InteractiveExercises,
        Self::QuizzesAndAssessments,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::HandsOnProjects => "Hands-on projects",
            Self::VideoTutorials => "Video tutorials",
            Self::ReadingMaterials => "Reading materials",
            Self::InteractiveExercises => "Interactive exercises",
            Self::QuizzesAndAssessments => "Quizzes and assessments",
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LearningStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, RequestField::LearningStyle, &Self::ALL, Self::label)
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapRequest {
    goal: String,
    pub skill_level: SkillLevel,
    pub time_commitment: TimeCommitment,
    pub learning_style: LearningStyle,
}

impl RoadmapRequest {
    /// Build a request from typed choices. The goal is trimmed and must not
    /// be blank.
    pub fn new(
        goal: &str,
        skill_level: SkillLevel,
        time_commitment: TimeCommitment,
        learning_style: LearningStyle,
    ) -> Result<Self, ValidationError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(ValidationError::Missing(RequestField::Goal));
        }
        Ok(Self {
            goal: goal.to_owned(),
            skill_level,
            time_commitment,
            learning_style,
        })
    }

    /// Build a request from raw form values, checking fields in order.
    pub fn parse(
        goal: &str,
        skill_level: &str,
        time_commitment: &str,
        learning_style: &str,
    ) -> Result<Self, ValidationError> {
        if goal.trim().is_empty() {
            return Err(ValidationError::Missing(RequestField::Goal));
        }
        Self::new(
            goal,
            skill_level.parse()?,
            time_commitment.parse()?,
            learning_style.parse()?,
        )
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }
}
