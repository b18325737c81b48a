//! Canonical study-schedule taxonomy
//!
//! Sample labels embed a timepoint relative to launch (L-) and return (R+),
//! or a flight day (FD). Classification scans the label length class by
//! length class, longest first, so that "L-270" is never shadowed by a
//! shorter variant.

use std::fmt;

use crate::error::{Result, TeloError};

/// Coarse schedule bucket derived from the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightPhase {
    PreFlight,
    MidFlight,
    PostFlight,
}

impl FlightPhase {
    /// Phase from a label. "L" is checked before "FD" before "R" because
    /// malformed labels can carry more than one marker.
    pub fn from_label(label: &str) -> Option<Self> {
        const RULES: [(&str, FlightPhase); 3] = [
            ("L", FlightPhase::PreFlight),
            ("FD", FlightPhase::MidFlight),
            ("R", FlightPhase::PostFlight),
        ];
        RULES
            .iter()
            .find(|(marker, _)| label.contains(marker))
            .map(|&(_, phase)| phase)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightPhase::PreFlight => "Pre-Flight",
            FlightPhase::MidFlight => "Mid-Flight",
            FlightPhase::PostFlight => "Post-Flight",
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mid-flight assay window. Different subjects were assayed on different
/// flight days, so FD45/FD90 fill one comparison slot and FD140/FD260 the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidSlot {
    Mid1,
    Mid2,
}

/// One of the 13 canonical collection timepoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timepoint {
    L270,
    L180,
    L60,
    Fd45,
    Fd90,
    Fd140,
    Fd260,
    R5,
    R7,
    R60,
    R105,
    R180,
    R270,
}

/// Canonical schedule order
pub const CANONICAL_TIMEPOINTS: [Timepoint; 13] = [
    Timepoint::L270,
    Timepoint::L180,
    Timepoint::L60,
    Timepoint::Fd45,
    Timepoint::Fd90,
    Timepoint::Fd140,
    Timepoint::Fd260,
    Timepoint::R5,
    Timepoint::R7,
    Timepoint::R60,
    Timepoint::R105,
    Timepoint::R180,
    Timepoint::R270,
];

/// Length classes scanned longest first
const CLASS_5: [Timepoint; 7] = [
    Timepoint::L270,
    Timepoint::L180,
    Timepoint::Fd140,
    Timepoint::Fd260,
    Timepoint::R105,
    Timepoint::R180,
    Timepoint::R270,
];
const CLASS_4: [Timepoint; 4] = [Timepoint::L60, Timepoint::Fd45, Timepoint::Fd90, Timepoint::R60];
const CLASS_3: [Timepoint; 2] = [Timepoint::R5, Timepoint::R7];

impl Timepoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timepoint::L270 => "L-270",
            Timepoint::L180 => "L-180",
            Timepoint::L60 => "L-60",
            Timepoint::Fd45 => "FD45",
            Timepoint::Fd90 => "FD90",
            Timepoint::Fd140 => "FD140",
            Timepoint::Fd260 => "FD260",
            Timepoint::R5 => "R+5",
            Timepoint::R7 => "R+7",
            Timepoint::R60 => "R+60",
            Timepoint::R105 => "R+105",
            Timepoint::R180 => "R+180",
            Timepoint::R270 => "R+270",
        }
    }

    /// Position in the canonical schedule order
    pub fn rank(&self) -> usize {
        CANONICAL_TIMEPOINTS
            .iter()
            .position(|tp| tp == self)
            .unwrap_or(CANONICAL_TIMEPOINTS.len())
    }

    /// Phase this timepoint belongs to
    pub fn phase(&self) -> FlightPhase {
        match self {
            Timepoint::L270 | Timepoint::L180 | Timepoint::L60 => FlightPhase::PreFlight,
            Timepoint::Fd45 | Timepoint::Fd90 | Timepoint::Fd140 | Timepoint::Fd260 => {
                FlightPhase::MidFlight
            }
            _ => FlightPhase::PostFlight,
        }
    }

    /// Mid-flight comparison slot, None outside mid-flight
    pub fn mid_slot(&self) -> Option<MidSlot> {
        match self {
            Timepoint::Fd45 | Timepoint::Fd90 => Some(MidSlot::Mid1),
            Timepoint::Fd140 | Timepoint::Fd260 => Some(MidSlot::Mid2),
            _ => None,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        CANONICAL_TIMEPOINTS.iter().copied().find(|tp| tp.as_str() == s)
    }
}

impl fmt::Display for Timepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strip a trailing spreadsheet/export extension so that raw file names
/// classify the same as trimmed labels
fn trim_extension(label: &str) -> &str {
    const EXTENSIONS: [&str; 4] = [".xlsx", ".xls", ".csv", ".tsv"];
    for ext in EXTENSIONS {
        if let Some(stem) = label.strip_suffix(ext) {
            return stem;
        }
    }
    label
}

/// Classify a sample label into its timepoint and flight phase.
///
/// Length classes are scanned longest first; within a class a substring
/// match wins and the timepoint is read back from the trailing characters
/// of the label (labels end with their timepoint by convention), trimmed of
/// whitespace. A label matching no canonical timepoint is excluded from the
/// cohort by callers, not treated as fatal.
pub fn classify(label: &str) -> Result<(Timepoint, FlightPhase)> {
    let no_match = || TeloError::NoTimepointMatch {
        label: label.to_string(),
    };

    let stem = trim_extension(label);
    let classes: [&[Timepoint]; 3] = [&CLASS_5, &CLASS_4, &CLASS_3];
    for class in classes {
        for tp in class {
            if stem.contains(tp.as_str()) {
                let width = tp.as_str().len();
                let tail: String = stem
                    .chars()
                    .rev()
                    .take(width)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                let timepoint = Timepoint::parse(tail.trim()).ok_or_else(no_match)?;
                let phase = FlightPhase::from_label(stem).ok_or_else(no_match)?;
                return Ok((timepoint, phase));
            }
        }
    }
    Err(no_match())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_pre_flight() {
        let (tp, phase) = classify("dso5163 mphase TeloFISH L-270").unwrap();
        assert_eq!(tp, Timepoint::L270);
        assert_eq!(phase, FlightPhase::PreFlight);
    }

    #[test]
    fn test_classify_raw_file_name() {
        let (tp, phase) = classify("dso5163 mphase TeloFISH L-270.xlsx").unwrap();
        assert_eq!(tp, Timepoint::L270);
        assert_eq!(phase, FlightPhase::PreFlight);
    }

    #[test]
    fn test_classify_mid_flight() {
        let (tp, phase) = classify("dso2171 mphase TeloFISH FD45").unwrap();
        assert_eq!(tp, Timepoint::Fd45);
        assert_eq!(phase, FlightPhase::MidFlight);
    }

    #[test]
    fn test_classify_post_flight() {
        let (tp, phase) = classify("dso7673 mphase TeloFISH R+270").unwrap();
        assert_eq!(tp, Timepoint::R270);
        assert_eq!(phase, FlightPhase::PostFlight);
    }

    #[test]
    fn test_longer_class_shadows_shorter() {
        // the 5-char class must win before any 4- or 3-char candidate is
        // considered, and short timepoints still classify on their own
        let (tp, _) = classify("dso1062 mphase TeloFISH R+105").unwrap();
        assert_eq!(tp, Timepoint::R105);
        let (tp, _) = classify("x R+7").unwrap();
        assert_eq!(tp, Timepoint::R7);
    }

    #[test]
    fn test_no_match_is_error() {
        assert!(matches!(
            classify("dso5163 mphase TeloFISH"),
            Err(TeloError::NoTimepointMatch { .. })
        ));
    }

    #[test]
    fn test_canonical_order_is_rank_order() {
        for pair in CANONICAL_TIMEPOINTS.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
        assert_eq!(Timepoint::L270.rank(), 0);
        assert_eq!(Timepoint::R270.rank(), 12);
    }

    #[test]
    fn test_mid_slots() {
        assert_eq!(Timepoint::Fd45.mid_slot(), Some(MidSlot::Mid1));
        assert_eq!(Timepoint::Fd90.mid_slot(), Some(MidSlot::Mid1));
        assert_eq!(Timepoint::Fd140.mid_slot(), Some(MidSlot::Mid2));
        assert_eq!(Timepoint::Fd260.mid_slot(), Some(MidSlot::Mid2));
        assert_eq!(Timepoint::L270.mid_slot(), None);
    }

    #[test]
    fn test_phase_marker_priority() {
        // a malformed label carrying both L and R markers resolves to the
        // earlier rule
        assert_eq!(FlightPhase::from_label("L-270 R+5"), Some(FlightPhase::PreFlight));
        assert_eq!(FlightPhase::from_label("FD90 R+5"), Some(FlightPhase::MidFlight));
        assert_eq!(FlightPhase::from_label("xyz"), None);
    }
}
