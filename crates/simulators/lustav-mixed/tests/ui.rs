use ratatui::backend::TestBackend;
use ratatui::Terminal;

use lustav_core::metrics::{MetricKind, StepMetrics};
use lustav_core::step::Step;
use lustav_core::study::Progress;
use lustav_mixed::simulation::ui::SimRenderer;
use lustav_output::ui::{Renderer, SimContent, SimUIMetadata};

fn screen(content: &SimContent) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    let renderer = SimRenderer::new();
    terminal
        .draw(|frame| renderer.render_sim_ui(content, frame))
        .unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_screen_shows_rates_and_last_metrics() {
    let metadata = SimUIMetadata {
        scenario: "lust".to_string(),
        rates: vec!["0%".to_string(), "50%".to_string(), "100%".to_string()],
        ..SimUIMetadata::default()
    };
    let mut content = SimContent::new(300, metadata);
    content.update(Progress {
        now: Step(150),
        run: 1,
        active_vehicles: 12,
        latest: StepMetrics::empty().with(MetricKind::MeanSpeed, 8.25),
        adaptations: 4,
        autonomous_vehicles: 9,
        finished: false,
    });

    let screen = screen(&content);
    assert!(screen.contains("AV rate 50% (2/3)"), "{}", screen);
    assert!(screen.contains("done"));
    assert!(screen.contains("running"));
    assert!(screen.contains("pending"));
    assert!(screen.contains("Mean Speed (m/s)"));
    assert!(screen.contains("8.25"));
    assert!(screen.contains("150 / 300 steps"));
}
