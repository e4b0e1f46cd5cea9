use std::io;
use std::panic;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use log::debug;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use crate::plots::MetricPlot;
use crate::ui::{Renderer, SimContent};
use crate::OutputResult;

/// Representation of a terminal user interface.
///
/// It is responsible for setting up the terminal,
/// initializing the interface and handling the draw events.
#[derive(Debug)]
pub struct TerminalUI<B: Backend> {
    /// Interface to the Terminal.
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalUI<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self { terminal }
    }

    /// Initializes the terminal interface.
    ///
    /// It enables the raw mode and sets terminal properties.
    pub fn init(&mut self) -> OutputResult<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

        // Restore the terminal before the default hook prints the panic.
        let panic_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic| {
            let _ = reset_terminal();
            panic_hook(panic);
        }));

        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw_sim<R: Renderer>(&mut self, renderer: &R, content: &SimContent) -> OutputResult<()> {
        self.terminal
            .draw(|frame| renderer.render_sim_ui(content, frame))?;
        Ok(())
    }

    pub fn draw_plot(&mut self, browser: &PlotBrowser) -> OutputResult<()> {
        self.terminal.draw(|frame| {
            if let Some(plot) = browser.current() {
                frame.render_widget(plot.chart(), frame.area());
            }
        })?;
        Ok(())
    }

    /// Exits the terminal interface.
    ///
    /// It disables the raw mode and reverts back the terminal properties.
    pub fn exit(&mut self) -> OutputResult<()> {
        reset_terminal()?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

fn reset_terminal() -> OutputResult<()> {
    terminal::disable_raw_mode()?;
    crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Handles the key events and updates the state of [`SimContent`].
pub fn handle_sim_key_events(key_event: KeyEvent, content: &mut SimContent) {
    match key_event.code {
        KeyCode::Esc | KeyCode::Char('q') => content.quit(),
        _ => {}
    }
}

/// Pages through the metric charts of a finished study.
#[derive(Debug)]
pub struct PlotBrowser {
    plots: Vec<MetricPlot>,
    index: usize,
    pub running: bool,
}

impl PlotBrowser {
    pub fn new(plots: Vec<MetricPlot>) -> Self {
        Self {
            running: !plots.is_empty(),
            plots,
            index: 0,
        }
    }

    pub fn current(&self) -> Option<&MetricPlot> {
        self.plots.get(self.index)
    }

    pub fn next(&mut self) {
        if !self.plots.is_empty() {
            self.index = (self.index + 1) % self.plots.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.plots.is_empty() {
            self.index = (self.index + self.plots.len() - 1) % self.plots.len();
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}

pub fn handle_plot_key_events(key_event: KeyEvent, browser: &mut PlotBrowser) {
    match key_event.code {
        KeyCode::Esc | KeyCode::Char('q') => browser.quit(),
        KeyCode::Right | KeyCode::Char('l') => browser.next(),
        KeyCode::Left | KeyCode::Char('h') => browser.previous(),
        _ => {}
    }
}

/// Shows the charts full screen until the user quits.
pub fn browse_plots(plots: Vec<MetricPlot>) -> OutputResult<()> {
    let mut browser = PlotBrowser::new(plots);
    if !browser.running {
        return Ok(());
    }
    let terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;
    let mut tui = TerminalUI::new(terminal);
    tui.init()?;

    let result = browse_loop(&mut tui, &mut browser);
    tui.exit()?;
    result
}

fn browse_loop<B: Backend>(tui: &mut TerminalUI<B>, browser: &mut PlotBrowser) -> OutputResult<()> {
    while browser.running {
        tui.draw_plot(browser)?;
        if let Event::Key(key_event) = event::read()? {
            handle_plot_key_events(key_event, browser);
            if let Some(plot) = browser.current() {
                debug!("Showing plot of {}", plot.metric);
            }
        }
    }
    Ok(())
}
