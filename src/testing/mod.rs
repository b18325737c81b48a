//! Between-timepoint hypothesis testing

mod mannwhitney;

pub use mannwhitney::{mann_whitney_u, MannWhitney};

use crate::cohort::LongitudinalRecord;
use crate::data::SubjectId;
use crate::timepoint::{FlightPhase, MidSlot};

/// One pairwise between-timepoint test for a subject
#[derive(Debug, Clone)]
pub struct TimepointComparison {
    pub left: String,
    pub right: String,
    pub test: MannWhitney,
}

/// All comparisons for one subject
#[derive(Debug, Clone)]
pub struct SubjectComparisons {
    pub subject: SubjectId,
    pub comparisons: Vec<TimepointComparison>,
}

/// Pick a subject's comparison windows from its records (assumed sorted in
/// canonical order): the earliest pre-flight, one record per mid-flight
/// slot (the later canonical sub-timepoint when a subject has both), and
/// the latest post-flight.
fn windows<'a>(
    records: &'a [LongitudinalRecord],
) -> (
    Option<&'a LongitudinalRecord>,
    Option<&'a LongitudinalRecord>,
    Option<&'a LongitudinalRecord>,
    Option<&'a LongitudinalRecord>,
) {
    let mut pre = None;
    let mut mid1 = None;
    let mut mid2 = None;
    let mut post = None;
    for record in records {
        match record.phase() {
            FlightPhase::PreFlight => {
                if pre.is_none() {
                    pre = Some(record);
                }
            }
            FlightPhase::MidFlight => match record.timepoint().mid_slot() {
                Some(MidSlot::Mid1) => mid1 = Some(record),
                Some(MidSlot::Mid2) => mid2 = Some(record),
                None => {}
            },
            FlightPhase::PostFlight => post = Some(record),
        }
    }
    (pre, mid1, mid2, post)
}

fn label(record: &LongitudinalRecord) -> String {
    format!("{} {}", record.subject(), record.timepoint())
}

fn push_test(out: &mut Vec<TimepointComparison>, a: &LongitudinalRecord, b: &LongitudinalRecord) {
    let left = a.values().to_vec();
    let right = b.values().to_vec();
    match mann_whitney_u(&left, &right) {
        Ok(test) => out.push(TimepointComparison {
            left: label(a),
            right: label(b),
            test,
        }),
        Err(e) => log::warn!("skipping {} vs {}: {}", label(a), label(b), e),
    }
}

/// Pairwise comparisons across one subject's records.
///
/// With both mid-flight slots available the full grid is tested (pre/mid-1,
/// pre/mid-2, mid-1/mid-2, mid-1/post, mid-2/post, pre/post); otherwise the
/// pre/post pair alone. An empty vector means the subject lacks the windows
/// for any comparison.
pub fn compare_timepoints(records: &[LongitudinalRecord]) -> Vec<TimepointComparison> {
    let (pre, mid1, mid2, post) = windows(records);
    let mut out = Vec::new();

    match (pre, mid1, mid2, post) {
        (Some(pre), Some(mid1), Some(mid2), Some(post)) => {
            push_test(&mut out, pre, mid1);
            push_test(&mut out, pre, mid2);
            push_test(&mut out, mid1, post);
            push_test(&mut out, mid1, mid2);
            push_test(&mut out, mid2, post);
            push_test(&mut out, pre, post);
        }
        (Some(pre), _, _, Some(post)) => {
            push_test(&mut out, pre, post);
        }
        _ => {}
    }
    out
}

/// Group an assembled table by subject and run [`compare_timepoints`] on
/// each. Subjects with no testable window pair are omitted.
pub fn compare_by_subject(records: &[LongitudinalRecord]) -> Vec<SubjectComparisons> {
    let mut out: Vec<SubjectComparisons> = Vec::new();
    let mut start = 0;
    while start < records.len() {
        let subject = records[start].subject().clone();
        let end = records[start..]
            .iter()
            .position(|r| r.subject() != &subject)
            .map(|offset| start + offset)
            .unwrap_or(records.len());

        let comparisons = compare_timepoints(&records[start..end]);
        if !comparisons.is_empty() {
            out.push(SubjectComparisons { subject, comparisons });
        }
        start = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{assemble, AssemblyConfig};
    use crate::data::{CleanedSample, SubjectRoster};
    use crate::reconcile::ReconcileMode;

    fn sample(label: &str, offset: f64) -> CleanedSample {
        CleanedSample::from_values(label, (0..80).map(|i| offset + i as f64).collect()).unwrap()
    }

    fn config() -> AssemblyConfig {
        AssemblyConfig {
            cells: 8,
            measurements_per_cell: 10,
            mode: ReconcileMode::PassThrough,
            seed: Some(1),
        }
    }

    #[test]
    fn test_full_grid_when_both_mid_slots_present() {
        let samples = vec![
            sample("dso5163 mphase TeloFISH L-270", 0.0),
            sample("dso5163 mphase TeloFISH FD90", 50.0),
            sample("dso5163 mphase TeloFISH FD140", 60.0),
            sample("dso5163 mphase TeloFISH R+270", 10.0),
        ];
        let records = assemble(&samples, &SubjectRoster::astronauts(), &config()).unwrap();
        let comparisons = compare_timepoints(&records);
        assert_eq!(comparisons.len(), 6);
        assert_eq!(comparisons[0].left, "5163 L-270");
        assert_eq!(comparisons[0].right, "5163 FD90");
        assert_eq!(comparisons[5].left, "5163 L-270");
        assert_eq!(comparisons[5].right, "5163 R+270");
    }

    #[test]
    fn test_later_sub_timepoint_fills_the_slot() {
        let samples = vec![
            sample("dso5163 mphase TeloFISH L-270", 0.0),
            sample("dso5163 mphase TeloFISH FD45", 50.0),
            sample("dso5163 mphase TeloFISH FD90", 55.0),
            sample("dso5163 mphase TeloFISH FD260", 60.0),
            sample("dso5163 mphase TeloFISH R+270", 10.0),
        ];
        let records = assemble(&samples, &SubjectRoster::astronauts(), &config()).unwrap();
        let comparisons = compare_timepoints(&records);
        assert!(comparisons.iter().any(|c| c.right == "5163 FD90"));
        assert!(!comparisons.iter().any(|c| c.right == "5163 FD45"));
    }

    #[test]
    fn test_pre_post_only_without_mid_flight() {
        let samples = vec![
            sample("dso7673 mphase TeloFISH L-270", 0.0),
            sample("dso7673 mphase TeloFISH R+270", 300.0),
        ];
        let records = assemble(&samples, &SubjectRoster::astronauts(), &config()).unwrap();
        let comparisons = compare_timepoints(&records);
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].left, "7673 L-270");
        assert_eq!(comparisons[0].right, "7673 R+270");
        assert!(comparisons[0].test.p_value < 1e-6);
    }

    #[test]
    fn test_no_windows_no_comparisons() {
        let samples = vec![sample("dso5163 mphase TeloFISH L-270", 0.0)];
        let records = assemble(&samples, &SubjectRoster::astronauts(), &config()).unwrap();
        assert!(compare_timepoints(&records).is_empty());
    }

    #[test]
    fn test_compare_by_subject_groups_records() {
        let samples = vec![
            sample("dso5163 mphase TeloFISH L-270", 0.0),
            sample("dso5163 mphase TeloFISH R+270", 5.0),
            sample("dso1536 mphase TeloFISH L-180", 0.0),
            sample("dso1536 mphase TeloFISH R+180", 400.0),
            sample("dso7673 mphase TeloFISH L-60", 0.0),
        ];
        let records = assemble(&samples, &SubjectRoster::astronauts(), &config()).unwrap();
        let by_subject = compare_by_subject(&records);
        assert_eq!(by_subject.len(), 2);
        assert_eq!(by_subject[0].subject.token(), "5163");
        assert_eq!(by_subject[1].subject.token(), "1536");
        // the shifted subject is significant, the unshifted one is not
        assert!(by_subject[1].comparisons[0].test.p_value < 1e-6);
        assert!(by_subject[0].comparisons[0].test.p_value > 0.05);
    }
}
