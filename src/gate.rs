//! Modal confirmation before destructive or state-losing actions.
//!
//! A gate holds the action it is guarding until the user answers. Nothing
//! runs while it is open; the caller receives the action back only when the
//! answer allows it.

/// A user's reply to an open gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Go ahead with a destructive action.
    Proceed,
    /// Save the outgoing edits, then continue.
    Save,
    /// Drop the outgoing edits, then continue.
    Discard,
    /// Abort the pending action.
    Cancel,
}

/// What the UI should ask while a gate is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt<'a> {
    /// Proceed / cancel question.
    Confirm(&'a str),
    /// Save / discard / cancel question about unsaved edits.
    SaveChanges,
}

/// How an answer closed the gate.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<A> {
    Proceed(A),
    Save(A),
    Discard(A),
    Cancelled,
    /// The answer does not fit the open question; the gate stays open.
    Rejected,
    /// No gate was open.
    Idle,
}

#[derive(Debug)]
enum Question {
    Confirm(String),
    SaveChanges,
}

#[derive(Debug)]
pub struct ConfirmationGate<A> {
    pending: Option<(Question, A)>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> ConfirmationGate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn prompt(&self) -> Option<Prompt<'_>> {
        self.pending.as_ref().map(|(question, _)| match question {
            Question::Confirm(message) => Prompt::Confirm(message),
            Question::SaveChanges => Prompt::SaveChanges,
        })
    }

    /// Hold `action` behind a proceed/cancel question.
    pub fn confirm(&mut self, message: impl Into<String>, action: A) {
        debug_assert!(self.pending.is_none(), "gate already open");
        self.pending = Some((Question::Confirm(message.into()), action));
    }

    /// Hold `action` behind a save/discard/cancel question.
    pub fn confirm_save(&mut self, action: A) {
        debug_assert!(self.pending.is_none(), "gate already open");
        self.pending = Some((Question::SaveChanges, action));
    }

    pub fn resolve(&mut self, answer: Answer) -> Resolution<A> {
        let accepted = match (&self.pending, answer) {
            (None, _) => return Resolution::Idle,
            (Some(_), Answer::Cancel) => true,
            (Some((Question::Confirm(_), _)), Answer::Proceed) => true,
            (Some((Question::SaveChanges, _)), Answer::Save | Answer::Discard) => true,
            _ => false,
        };
        if !accepted {
            return Resolution::Rejected;
        }
        let Some((_, action)) = self.pending.take() else {
            return Resolution::Idle;
        };
        match answer {
            Answer::Proceed => Resolution::Proceed(action),
            Answer::Save => Resolution::Save(action),
            Answer::Discard => Resolution::Discard(action),
            Answer::Cancel => Resolution::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_gate_proceed() {
        let mut gate = ConfirmationGate::new();
        gate.confirm("Delete?", 5);
        assert_eq!(gate.prompt(), Some(Prompt::Confirm("Delete?")));
        assert_eq!(gate.resolve(Answer::Proceed), Resolution::Proceed(5));
        assert!(!gate.is_open());
    }

    #[test]
    fn test_cancel_drops_action() {
        let mut gate = ConfirmationGate::new();
        gate.confirm_save("switch");
        assert_eq!(gate.resolve(Answer::Cancel), Resolution::Cancelled);
        assert!(gate.prompt().is_none());
    }

    #[test]
    fn test_mismatched_answers_keep_gate_open() {
        let mut gate = ConfirmationGate::new();
        gate.confirm("Import?", ());
        assert_eq!(gate.resolve(Answer::Save), Resolution::Rejected);
        assert_eq!(gate.resolve(Answer::Discard), Resolution::Rejected);
        assert!(gate.is_open());

        let mut gate = ConfirmationGate::new();
        gate.confirm_save(());
        assert_eq!(gate.resolve(Answer::Proceed), Resolution::Rejected);
        assert_eq!(gate.resolve(Answer::Discard), Resolution::Discard(()));
    }

    #[test]
    fn test_answer_without_gate_is_idle() {
        let mut gate: ConfirmationGate<()> = ConfirmationGate::new();
        assert_eq!(gate.resolve(Answer::Proceed), Resolution::Idle);
    }
}
