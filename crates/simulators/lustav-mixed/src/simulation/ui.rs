use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Gauge, Paragraph, Row, Table};
use ratatui::Frame;

use lustav_core::metrics::MetricKind;
use lustav_output::ui::{Renderer, RunState, RunStatus, SimContent};

/// Draws the sweep: one row per penetration rate, the last metrics of the current run and
/// the overall progress.
#[derive(Default)]
pub struct SimRenderer {}

impl SimRenderer {
    pub fn new() -> Self {
        Self {}
    }

    fn header(content: &SimContent) -> Paragraph<'_> {
        Paragraph::new(vec![
            Line::from(format!("Scenario {}", content.metadata.scenario)),
            Line::from(content.current_rate()),
        ])
        .block(
            Block::bordered()
                .title(" lustav ")
                .border_type(BorderType::Rounded),
        )
        .style(Style::default().fg(Color::Green))
    }

    fn rate_row<'a>(content: &SimContent, state: &'a RunState) -> Row<'a> {
        let (status, color) = match state.status {
            RunStatus::Pending => ("pending", Color::DarkGray),
            RunStatus::Running => ("running", Color::Yellow),
            RunStatus::Done => ("done", Color::Green),
        };
        Row::new(vec![
            state.label.clone(),
            status.to_string(),
            format!("{:.1}%", content.run_completion(state) * 100.0),
            state.adaptations.to_string(),
            state.autonomous_vehicles.to_string(),
        ])
        .style(Style::default().fg(color))
    }

    fn rates(content: &SimContent) -> Table<'_> {
        let rows = content
            .runs
            .iter()
            .map(|state| Self::rate_row(content, state))
            .collect::<Vec<_>>();
        Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Length(8),
            ],
        )
        .header(
            Row::new(vec!["Rate", "Status", "Done", "Adaptations", "AVs"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::bordered().title(" Penetration rates "))
    }

    fn metrics(content: &SimContent) -> Table<'_> {
        let latest = content.progress.latest;
        let mut rows = MetricKind::ALL
            .iter()
            .map(|kind| Row::new(vec![kind.label().to_string(), format!("{:.2}", latest.get(*kind))]))
            .collect::<Vec<_>>();
        rows.push(Row::new(vec![
            "Expected Vehicles".to_string(),
            content.progress.active_vehicles.to_string(),
        ]));
        Table::new(rows, [Constraint::Percentage(70), Constraint::Percentage(30)])
            .block(Block::bordered().title(" Last step "))
    }

    fn progress(content: &SimContent) -> Gauge<'_> {
        Gauge::default()
            .gauge_style(Style::default().fg(Color::LightBlue))
            .label(format!(
                "{} / {} steps, {:.1}%",
                content.progress.now,
                content.total_steps,
                content.completion() * 100.0
            ))
            .ratio(content.completion())
            .use_unicode(true)
            .block(Block::bordered().title(" Study "))
    }

    fn footer(content: &SimContent) -> Paragraph<'_> {
        Paragraph::new(vec![
            Line::from(format!("Input {}", content.metadata.input_file)),
            Line::from(format!(
                "Output {}  Log {}",
                content.metadata.output_path, content.metadata.log_path
            )),
            Line::from("q stops the study and writes what was measured"),
        ])
        .style(Style::default().fg(Color::Gray))
    }
}

impl Renderer for SimRenderer {
    fn render_sim_ui(&self, content: &SimContent, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());
        let middle: [Rect; 2] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .areas(rows[1]);

        frame.render_widget(Self::header(content), rows[0]);
        frame.render_widget(Self::rates(content), middle[0]);
        frame.render_widget(Self::metrics(content), middle[1]);
        frame.render_widget(Self::progress(content), rows[2]);
        frame.render_widget(Self::footer(content), rows[3]);
    }
}
