use serde_json::Value;

use crate::analysis::events::{ProgressEvent, STATUS_COMPLETED, STATUS_ERROR};

/// Client-side view of one analysis, folded from the event stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PollState {
    #[default]
    Idle,
    InProgress {
        progress: u8,
        message: String,
    },
    Succeeded(Value),
    Failed(String),
}

impl PollState {
    /// Pure transition. Finished states absorb any further events.
    pub fn apply(self, event: &ProgressEvent) -> Self {
        if self.is_finished() {
            return self;
        }

        match event.status.as_str() {
            STATUS_ERROR => Self::Failed(event.message.clone()),
            STATUS_COMPLETED => match &event.result {
                Some(result) => Self::Succeeded(result.clone()),
                None => Self::Failed("Analysis completed without a result".to_string()),
            },
            _ => Self::InProgress {
                progress: event.progress,
                message: event.message.clone(),
            },
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

pub fn fold_events<'a, I>(events: I) -> PollState
where
    I: IntoIterator<Item = &'a ProgressEvent>,
{
    events
        .into_iter()
        .fold(PollState::Idle, |state, event| state.apply(event))
}
