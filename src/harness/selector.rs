//! Test selection
//!
//! Turns a milestone or an explicit list of test numbers into the ordered
//! sequence of test identifiers to run.

use std::fmt;
use std::ops::RangeInclusive;

/// Highest test identifier in the corpus
pub const MAX_TEST_ID: u32 = 41;

/// Milestone used when none is given or the given one is unknown
pub const DEFAULT_MILESTONE: u32 = 5;

/// Milestone to test range table
const MILESTONES: [(u32, RangeInclusive<u32>); 5] = [
    (1, 1..=9),
    (2, 1..=17),
    (3, 1..=29),
    (4, 1..=35),
    (5, 1..=MAX_TEST_ID),
];

/// Look up the test range for a milestone
pub fn milestone_range(milestone: u32) -> Option<RangeInclusive<u32>> {
    MILESTONES
        .iter()
        .find(|(m, _)| *m == milestone)
        .map(|(_, range)| range.clone())
}

/// A non-fatal problem with the requested selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionWarning {
    /// Explicit test number outside `1..=MAX_TEST_ID`; dropped
    InvalidTestNum(i64),
    /// Unknown milestone; the default milestone was used instead
    InvalidMilestone(i64),
}

impl fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionWarning::InvalidTestNum(n) => write!(
                f,
                "invalid test num {} -- must be between 1 and {}",
                n, MAX_TEST_ID
            ),
            SelectionWarning::InvalidMilestone(m) => {
                write!(f, "invalid milestone arg {} -- must be ", m)?;
                let count = MILESTONES.len();
                for (i, (milestone, _)) in MILESTONES.iter().enumerate() {
                    match i {
                        0 => write!(f, "{}", milestone)?,
                        i if i + 1 == count => write!(f, " or {}", milestone)?,
                        _ => write!(f, ",{}", milestone)?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Resolved selection of tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Test identifiers in execution order
    pub ids: Vec<u32>,
    /// True when the whole milestone range was selected (no valid explicit entries)
    pub full_milestone: bool,
    /// Problems found while resolving; one per offending input
    pub warnings: Vec<SelectionWarning>,
}

/// Resolve the tests to run
///
/// The valid entries of `test_nums` take precedence and keep the caller's
/// order; when there are none the milestone's range is used.
pub fn select(test_nums: &[i64], milestone: Option<i64>) -> Selection {
    let mut warnings = Vec::new();

    // An unknown milestone is reported even when an explicit list overrides it
    let requested = milestone.unwrap_or(DEFAULT_MILESTONE as i64);
    let range = u32::try_from(requested)
        .ok()
        .and_then(milestone_range)
        .unwrap_or_else(|| {
            warnings.push(SelectionWarning::InvalidMilestone(requested));
            milestone_range(DEFAULT_MILESTONE).unwrap_or(1..=MAX_TEST_ID)
        });

    let mut ids = Vec::with_capacity(test_nums.len());
    for &num in test_nums {
        match u32::try_from(num) {
            Ok(id) if (1..=MAX_TEST_ID).contains(&id) => ids.push(id),
            _ => warnings.push(SelectionWarning::InvalidTestNum(num)),
        }
    }

    // A list with nothing valid left in it behaves as if none was given
    if ids.is_empty() {
        return Selection {
            ids: range.collect(),
            full_milestone: true,
            warnings,
        };
    }

    Selection {
        ids,
        full_milestone: false,
        warnings,
    }
}
