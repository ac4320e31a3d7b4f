use super::error::ActionError;

/// Lifecycle of a single IOC request as it moves through the batch.
///
/// States only advance; a request that fails at any step moves to the
/// terminal Failed state and is never revisited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IocState {
    #[default]
    Pending,
    Bound,
    Instantiated,
    Cleaned,
    Failed,
}

/// Final record of one IOC request after the batch has run.
#[derive(Debug)]
pub struct IocOutcome {
    pub name: String,
    pub driver_type: String,
    pub state: IocState,
    pub error: Option<ActionError>,
}

impl IocOutcome {
    pub fn success(&self) -> bool {
        matches!(self.state, IocState::Cleaned)
    }
}

/// Progress message sent to the frontend while a batch is running.
#[derive(Debug, Clone, Default)]
pub struct BatchStatus {
    pub progress: f32,
    pub ioc_name: String,
    pub completed: usize,
    pub total: usize,
}

impl BatchStatus {
    pub fn new(progress: f32, ioc_name: &str, completed: usize, total: usize) -> Self {
        Self {
            progress,
            ioc_name: ioc_name.to_string(),
            completed,
            total,
        }
    }
}
