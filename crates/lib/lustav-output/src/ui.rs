use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;

use lustav_core::study::Progress;

#[derive(Clone, Copy, Debug)]
pub enum Message {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Progress(Progress),
    Tick,
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct SimUIMetadata {
    pub scenario: String,
    pub input_file: String,
    pub output_path: String,
    pub log_path: String,
    /// Penetration rate labels in run order.
    pub rates: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running,
    Done,
}

/// What the UI knows about the run of one penetration rate.
#[derive(Debug, Clone)]
pub struct RunState {
    pub label: String,
    pub status: RunStatus,
    pub steps_done: u64,
    pub adaptations: u64,
    pub autonomous_vehicles: u64,
}

impl RunState {
    fn pending(label: &str) -> Self {
        Self {
            label: label.to_string(),
            status: RunStatus::Pending,
            steps_done: 0,
            adaptations: 0,
            autonomous_vehicles: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct SimContent {
    pub running: bool,
    pub total_steps: u64,
    pub steps_per_run: u64,
    pub metadata: SimUIMetadata,
    pub progress: Progress,
    pub runs: Vec<RunState>,
}

impl SimContent {
    pub fn new(total_steps: u64, metadata: SimUIMetadata) -> Self {
        let runs = metadata
            .rates
            .iter()
            .map(|label| RunState::pending(label))
            .collect::<Vec<_>>();
        Self {
            total_steps,
            steps_per_run: total_steps / runs.len().max(1) as u64,
            running: true,
            runs,
            metadata,
            ..Self::default()
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Records the latest progress. Runs before the current one are complete.
    pub fn update(&mut self, progress: Progress) {
        self.progress = progress;
        let run_start = progress.run as u64 * self.steps_per_run;
        let steps_per_run = self.steps_per_run;
        for (index, state) in self.runs.iter_mut().enumerate() {
            if index < progress.run {
                state.status = RunStatus::Done;
                state.steps_done = steps_per_run;
            } else if index == progress.run {
                state.steps_done = progress.now.as_u64().saturating_sub(run_start).min(steps_per_run);
                state.adaptations = progress.adaptations;
                state.autonomous_vehicles = progress.autonomous_vehicles;
                state.status = match progress.finished || state.steps_done == steps_per_run {
                    true => RunStatus::Done,
                    false => RunStatus::Running,
                };
            }
        }
    }

    pub fn completion(&self) -> f64 {
        if self.total_steps == 0 {
            return 1.0;
        }
        (self.progress.now.as_u64() as f64 / self.total_steps as f64).min(1.0)
    }

    pub fn run_completion(&self, state: &RunState) -> f64 {
        if self.steps_per_run == 0 {
            return 1.0;
        }
        state.steps_done as f64 / self.steps_per_run as f64
    }

    /// Label of the rate being simulated, e.g. `AV rate 50% (2/3)`.
    pub fn current_rate(&self) -> String {
        match self.runs.get(self.progress.run) {
            Some(state) => format!(
                "AV rate {} ({}/{})",
                state.label,
                self.progress.run + 1,
                self.runs.len()
            ),
            None => "-".to_string(),
        }
    }
}

pub trait Renderer: Send {
    fn render_sim_ui(&self, content: &SimContent, frame: &mut Frame);
}
