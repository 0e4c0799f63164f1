use thiserror::Error;

/// Lifecycle of one archive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    /// A stop request was honoured at a page boundary; the partial buffer
    /// was still flushed.
    StoppedEarly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal task transition {from:?} -> {to:?}")]
pub struct StateError {
    pub from: TaskState,
    pub to: TaskState,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::StoppedEarly
        )
    }

    /// Idle -> Running -> {Completed | Failed | StoppedEarly}. Nothing
    /// leaves a terminal state.
    pub fn advance(self, to: TaskState) -> Result<TaskState, StateError> {
        let allowed = match self {
            TaskState::Idle => to == TaskState::Running,
            TaskState::Running => to.is_terminal(),
            TaskState::Completed | TaskState::Failed | TaskState::StoppedEarly => false,
        };
        if allowed {
            Ok(to)
        } else {
            Err(StateError { from: self, to })
        }
    }
}
