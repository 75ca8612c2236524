//! Combinators composing other deciders.
//!
//! Both combinators own their children and evaluate them in the order
//! given. That order is observable: children carry scan state, and both
//! combinators short-circuit, so a child that is skipped for one record
//! never sees it.

use super::Decider;
use crate::backup::BackupRecord;

/// Keeps a backup unless every child agrees it should go.
///
/// Children are polled in order until one disagrees with the first child's
/// decision; a disagreement resolves to keep immediately and the remaining
/// children are not consulted for this record. A unanimous poll yields the
/// common decision. With no children every backup is kept.
pub struct AggregateAgree {
    deciders: Vec<Box<dyn Decider>>,
}

impl AggregateAgree {
    pub fn new(deciders: Vec<Box<dyn Decider>>) -> Self {
        Self { deciders }
    }
}

impl Decider for AggregateAgree {
    fn keep(&mut self, backup: &BackupRecord) -> bool {
        let mut verdict = true;
        for (i, decider) in self.deciders.iter_mut().enumerate() {
            let decision = decider.keep(backup);
            if i == 0 {
                verdict = decision;
            } else if decision != verdict {
                // Disagreement always resolves toward retention.
                return true;
            }
        }
        verdict
    }
}

/// Priority chain: returns `matches` as soon as a child decides `matches`.
///
/// With `matches = true` this keeps a backup if any rule wants it kept;
/// with `matches = false` it drops a backup if any rule wants it dropped.
/// If no child ever matches, the result is the opposite of `matches`.
pub struct FirstKeepMatch {
    matches: bool,
    deciders: Vec<Box<dyn Decider>>,
}

impl FirstKeepMatch {
    pub fn new(matches: bool, deciders: Vec<Box<dyn Decider>>) -> Self {
        Self { matches, deciders }
    }
}

impl Decider for FirstKeepMatch {
    fn keep(&mut self, backup: &BackupRecord) -> bool {
        for decider in self.deciders.iter_mut() {
            if decider.keep(backup) == self.matches {
                return self.matches;
            }
        }
        !self.matches
    }
}
