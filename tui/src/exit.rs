/// Summary produced when the dashboard session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppExitInfo {
    /// Myses listed when the dashboard closed.
    pub agent_count: usize,
    /// Aggregate tick at exit.
    pub tick: i64,
    pub exit_reason: ExitReason,
}

/// Why the dashboard session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The user pressed `q` or Ctrl+C.
    UserRequested,
    /// Terminal input ended (for example the controlling terminal went away).
    InputClosed,
}
