//! Confirmation port: how fuzzy/pattern suggestions get accepted
//!
//! The pipeline never talks to a terminal directly. Suggestions go through
//! this trait so a CLI prompt, a UI, or a batch policy can answer them.

/// Outcome of proposing a mapping suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Use the suggestion for this run only
    Accept,
    /// Do not use the suggestion
    Reject,
    /// Use the suggestion and persist it in the mapping store
    AcceptAndPersist,
}

/// Answers mapping suggestions
pub trait ConfirmationPort {
    /// Propose mapping `text` to `suggestion`; the port decides
    fn propose(&mut self, text: &str, suggestion: &str) -> Confirmation;
}

/// Batch policy with a fixed answer for every proposal
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm {
    answer: Confirmation,
}

impl AutoConfirm {
    pub fn accepting() -> Self {
        Self {
            answer: Confirmation::Accept,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            answer: Confirmation::Reject,
        }
    }

    pub fn persisting() -> Self {
        Self {
            answer: Confirmation::AcceptAndPersist,
        }
    }
}

impl ConfirmationPort for AutoConfirm {
    fn propose(&mut self, _text: &str, _suggestion: &str) -> Confirmation {
        self.answer
    }
}
