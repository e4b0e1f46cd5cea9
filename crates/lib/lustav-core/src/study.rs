use std::error::Error;

use crate::metrics::StepMetrics;
use crate::step::Step;

pub type StudyError = Box<dyn Error + Send + Sync>;
pub type StudyResult<T> = Result<T, StudyError>;

/// Where a study stands after one call to [`Study::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Progress {
    /// Steps completed over all runs of the study.
    pub now: Step,
    /// Index of the run the last step belonged to.
    pub run: usize,
    pub active_vehicles: u64,
    /// Metrics of the last step of the run.
    pub latest: StepMetrics,
    /// Traffic-light adaptations of the run so far.
    pub adaptations: u64,
    /// Vehicles of the run turned autonomous so far.
    pub autonomous_vehicles: u64,
    pub finished: bool,
}

/// A sequence of simulation runs driven one step at a time by the runner.
pub trait Study: Send {
    /// What the study hands back once all runs are closed.
    type Outcome: Send;

    /// Total number of steps over all runs.
    fn duration(&self) -> Step;
    fn initialize(&mut self) -> StudyResult<()>;
    fn advance(&mut self) -> StudyResult<Progress>;
    fn terminate(self) -> StudyResult<Self::Outcome>;
}
