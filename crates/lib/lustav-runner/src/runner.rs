use std::io;
use std::sync::mpsc;
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use log::{error, info, warn};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use lustav_core::study::{Study, StudyResult};
use lustav_output::terminal::{handle_sim_key_events, TerminalUI};
use lustav_output::ui::{Message, Renderer, SimContent, SimUIMetadata};
use lustav_output::OutputResult;

/// Steps between two progress lines in the log when no UI is shown.
const LOG_INTERVAL: u64 = 500;

/// Runs the study to completion, with or without the terminal UI, and returns its outcome.
pub fn run_study<S, R>(
    study: S,
    metadata: SimUIMetadata,
    renderer: R,
    show_ui: bool,
) -> StudyResult<S::Outcome>
where
    S: Study,
    R: Renderer,
{
    match show_ui {
        true => run_with_ui(study, metadata, renderer),
        false => run_headless(study),
    }
}

pub fn run_headless<S: Study>(mut study: S) -> StudyResult<S::Outcome> {
    let duration = study.duration().as_u64();
    study.initialize()?;
    loop {
        let progress = study.advance()?;
        if progress.now.as_u64() % LOG_INTERVAL == 0 {
            info!(
                "Step {} of {} in run {}, {} vehicles",
                progress.now, duration, progress.run, progress.active_vehicles
            );
        }
        if progress.finished {
            break;
        }
    }
    study.terminate()
}

pub fn run_with_ui<S, R>(
    study: S,
    metadata: SimUIMetadata,
    renderer: R,
) -> StudyResult<S::Outcome>
where
    S: Study,
    R: Renderer,
{
    let (sender_ui, receiver_ui) = mpsc::sync_channel(0);
    let poller_sender = sender_ui.clone();
    let duration = study.duration().as_u64();

    thread::scope(|s| {
        s.spawn(move || {
            if let Err(e) = add_event_listener(receiver_ui, duration, metadata, renderer) {
                error!("Terminal UI stopped: {}", e);
            }
        });
        s.spawn(move || add_event_poller(&poller_sender));

        let study_thread = s.spawn(move || {
            let outcome = drive_study(study, &sender_ui);
            let _ = sender_ui.send(Message::Quit);
            outcome
        });

        match study_thread.join() {
            Ok(outcome) => outcome,
            Err(_) => Err("study thread panicked".into()),
        }
    })
}

/// Steps the study and reports every step to the UI. A closed UI stops the study early.
fn drive_study<S: Study>(mut study: S, sender_ui: &SyncSender<Message>) -> StudyResult<S::Outcome> {
    study.initialize()?;
    loop {
        let progress = study.advance()?;
        if sender_ui.send(Message::Progress(progress)).is_err() {
            break;
        }
        if progress.finished {
            return study.terminate();
        }
    }
    warn!("Study stopped from the terminal before it finished");
    study.terminate()
}

pub fn add_event_listener<R: Renderer>(
    receiver_ui: Receiver<Message>,
    duration: u64,
    metadata: SimUIMetadata,
    renderer: R,
) -> OutputResult<()> {
    let mut ui_content = SimContent::new(duration, metadata);
    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;
    let mut tui = TerminalUI::new(terminal);
    tui.init()?;

    while ui_content.running {
        tui.draw_sim(&renderer, &ui_content)?;
        match receiver_ui.recv() {
            Ok(message) => handle_message(message, &mut ui_content),
            Err(_) => ui_content.quit(),
        }
    }
    tui.exit()
}

pub fn handle_message(message: Message, content: &mut SimContent) {
    match message {
        Message::Progress(progress) => content.update(progress),
        Message::Quit => content.quit(),
        Message::Key(key_event) => handle_sim_key_events(key_event, content),
        Message::Mouse(_) | Message::Resize(_, _) | Message::Tick => {}
    }
}

/// Forwards terminal events until the UI stops listening. A tick is sent when nothing
/// happened so the UI redraws.
pub fn add_event_poller(sender: &SyncSender<Message>) {
    let tick_rate = Duration::from_millis(500);
    loop {
        let message = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(CrosstermEvent::Key(e)) => Message::Key(e),
                Ok(CrosstermEvent::Mouse(e)) => Message::Mouse(e),
                Ok(CrosstermEvent::Resize(w, h)) => Message::Resize(w, h),
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to read terminal event: {}", e);
                    return;
                }
            },
            Ok(false) => Message::Tick,
            Err(e) => {
                warn!("Failed to poll terminal events: {}", e);
                return;
            }
        };
        if sender.send(message).is_err() {
            return;
        }
    }
}
