//! Study subjects and cohort rosters
//!
//! Subject identifiers are 4-character tokens embedded in sample labels.
//! Astronaut and control tokens are disjoint but visually similar, so ids
//! are tagged with their cohort and the two rosters are kept separate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TeloError};

/// Which arm of the study a subject belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cohort {
    Astronaut,
    Control,
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cohort::Astronaut => write!(f, "astronaut"),
            Cohort::Control => write!(f, "control"),
        }
    }
}

/// Cohort-tagged subject identifier.
///
/// The tag prevents an astronaut token from being looked up in the control
/// registry (and vice versa) by accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId {
    cohort: Cohort,
    token: String,
}

impl SubjectId {
    /// Create an id from a 4-character token
    pub fn new(cohort: Cohort, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(TeloError::InvalidInput {
                reason: format!("subject token '{}' is not a 4-digit id", token),
            });
        }
        Ok(Self { cohort, token })
    }

    pub fn cohort(&self) -> Cohort {
        self.cohort
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

/// One study participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    /// Publication ordinal; astronauts only
    ordinal: Option<u32>,
    /// De-identified display name, e.g. "synthetic 5"
    alias: Option<String>,
}

impl Subject {
    pub fn new(id: SubjectId, ordinal: Option<u32>, alias: Option<String>) -> Self {
        Self { id, ordinal, alias }
    }

    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    pub fn ordinal(&self) -> Option<u32> {
        self.ordinal
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// Ordered collection of the subjects in one cohort.
///
/// Labels are matched against tokens by substring, first match wins; the
/// roster order is the publication order used for sorting output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRoster {
    cohort: Cohort,
    subjects: Vec<Subject>,
}

/// Astronaut tokens with publication ordinals (6 and 13 were never enrolled)
const ASTRONAUTS: [(&str, u32); 11] = [
    ("5163", 1),
    ("1536", 2),
    ("7673", 3),
    ("2479", 4),
    ("2171", 5),
    ("1261", 7),
    ("3228", 8),
    ("2381", 9),
    ("4819", 10),
    ("1062", 11),
    ("2494", 12),
];

/// Age- and sex-matched control tokens
const CONTROLS: [&str; 11] = [
    "0397", "3907", "1826", "2377", "3609", "1264", "2580", "4127", "0646", "0100", "0912",
];

impl SubjectRoster {
    /// The astronaut cohort
    pub fn astronauts() -> Self {
        let subjects = ASTRONAUTS
            .iter()
            .map(|&(token, ordinal)| {
                Subject::new(
                    SubjectId {
                        cohort: Cohort::Astronaut,
                        token: token.to_string(),
                    },
                    Some(ordinal),
                    Some(format!("synthetic {}", ordinal)),
                )
            })
            .collect();
        Self {
            cohort: Cohort::Astronaut,
            subjects,
        }
    }

    /// The control cohort
    pub fn controls() -> Self {
        let subjects = CONTROLS
            .iter()
            .map(|&token| {
                Subject::new(
                    SubjectId {
                        cohort: Cohort::Control,
                        token: token.to_string(),
                    },
                    None,
                    None,
                )
            })
            .collect();
        Self {
            cohort: Cohort::Control,
            subjects,
        }
    }

    /// Built-in roster for a cohort
    pub fn for_cohort(cohort: Cohort) -> Self {
        match cohort {
            Cohort::Astronaut => Self::astronauts(),
            Cohort::Control => Self::controls(),
        }
    }

    pub fn cohort(&self) -> Cohort {
        self.cohort
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Find the subject whose token appears in a sample label.
    /// First roster entry wins; None when no token matches.
    pub fn match_label(&self, label: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| label.contains(s.id.token()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_id_validation() {
        assert!(SubjectId::new(Cohort::Astronaut, "5163").is_ok());
        assert!(SubjectId::new(Cohort::Astronaut, "516").is_err());
        assert!(SubjectId::new(Cohort::Astronaut, "51a3").is_err());
    }

    #[test]
    fn test_match_label() {
        let roster = SubjectRoster::astronauts();
        let subject = roster
            .match_label("dso5163 mphase TeloFISH L-270")
            .expect("5163 is on the roster");
        assert_eq!(subject.id().token(), "5163");
        assert_eq!(subject.ordinal(), Some(1));
        assert_eq!(subject.alias(), Some("synthetic 1"));

        assert!(roster.match_label("dso9999 L-270").is_none());
    }

    #[test]
    fn test_cohorts_are_disjoint() {
        let astros = SubjectRoster::astronauts();
        let controls = SubjectRoster::controls();
        for c in controls.subjects() {
            assert!(astros.match_label(c.id().token()).is_none());
        }
    }

    #[test]
    fn test_control_roster_has_no_ordinals() {
        let controls = SubjectRoster::controls();
        assert!(controls.subjects().iter().all(|s| s.ordinal().is_none()));
    }
}
