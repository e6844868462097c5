// src/engine/gate.rs

//! Parent-rule evaluation for a single node.
//!
//! The gate is fed parent signals one at a time, in whatever order they
//! arrive, and settles on whether the node runs or is skipped. It is pure
//! state with no channels, so the rules can be tested in isolation.

use crate::types::{ParentRule, TerminalStatus};

/// What a node does once all of its parents have signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Run,
    Skip,
}

/// Incremental evaluator of a node's [`ParentRule`].
#[derive(Debug, Clone)]
pub struct ParentGate {
    rule: ParentRule,
    decision: GateDecision,
    skipped_by_failure: bool,
}

impl ParentGate {
    pub fn new(rule: ParentRule) -> Self {
        Self {
            rule,
            decision: GateDecision::Run,
            skipped_by_failure: false,
        }
    }

    /// Record one parent's terminal status.
    ///
    /// Returns `true` when this signal is the one that flipped the decision
    /// to [`GateDecision::Skip`]. Later signals never flip it back.
    pub fn observe(&mut self, parent: TerminalStatus) -> bool {
        if self.decision == GateDecision::Skip {
            return false;
        }

        match (self.rule, parent) {
            (ParentRule::AllComplete, _) => false,
            (ParentRule::AllSuccess, TerminalStatus::Success) => false,
            (ParentRule::AllSuccess, TerminalStatus::Failed) => {
                self.decision = GateDecision::Skip;
                self.skipped_by_failure = true;
                true
            }
            (ParentRule::AllSuccess, TerminalStatus::Skipped) => {
                self.decision = GateDecision::Skip;
                true
            }
        }
    }

    pub fn decision(&self) -> GateDecision {
        self.decision
    }

    /// Whether the skip was triggered by a `Failed` parent (as opposed to a
    /// `Skipped` one).
    pub fn skipped_by_failure(&self) -> bool {
        self.skipped_by_failure
    }
}
