use strum_macros::Display;

/// Category shown by the status bar network indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum NetworkKind {
    #[default]
    #[strum(serialize = "IDLE")]
    Idle,
    #[strum(serialize = "LLM")]
    Llm,
    #[strum(serialize = "MCP")]
    Mcp,
}

/// Outstanding network operations across the swarm.
///
/// The indicator reports idle only once every started operation has finished. Completions are
/// counted with a saturating decrement so duplicate notifications cannot drive the count below
/// zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkActivity {
    kind: NetworkKind,
    outstanding: usize,
}

impl NetworkActivity {
    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn is_active(&self) -> bool {
        self.outstanding > 0
    }

    /// An operation of `kind` started. The most recent category wins the label.
    pub fn begin(&mut self, kind: NetworkKind) {
        if kind == NetworkKind::Idle {
            return;
        }
        self.outstanding += 1;
        self.kind = kind;
    }

    /// One operation finished.
    pub fn end(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.outstanding == 0 {
            self.kind = NetworkKind::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn idle_only_when_all_operations_finish() {
        let mut activity = NetworkActivity::default();
        activity.begin(NetworkKind::Llm);
        activity.begin(NetworkKind::Mcp);
        assert_eq!(activity.kind(), NetworkKind::Mcp);

        activity.end();
        assert_eq!(activity.outstanding(), 1);
        assert_eq!(activity.kind(), NetworkKind::Mcp);

        activity.end();
        assert_eq!(activity.kind(), NetworkKind::Idle);
        assert!(!activity.is_active());
    }

    #[test]
    fn extra_completions_clamp_at_zero() {
        let mut activity = NetworkActivity::default();
        activity.begin(NetworkKind::Llm);
        for _ in 0..5 {
            activity.end();
        }
        assert_eq!(activity.outstanding(), 0);
        activity.begin(NetworkKind::Llm);
        assert_eq!(activity.outstanding(), 1);
    }

    #[test]
    fn labels() {
        assert_eq!(NetworkKind::Llm.to_string(), "LLM");
        assert_eq!(NetworkKind::Idle.to_string(), "IDLE");
    }
}
