//! Main chat event loop
//!
//! Owns the terminal, the view state and the chat session. Terminal input,
//! session updates and the activity pulse are multiplexed on one task, so the
//! session is never shared.

mod keybindings;

use self::keybindings::{handle_key_event, handle_paste, KeyLoopAction};

use crate::core::session::{ChatSession, SessionOptions};
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::ui::view::ChatView;
use crate::utils::logging::LoggingState;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use std::{error::Error, io, path::PathBuf, time::Duration};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::info;

type ChatTerminal = Terminal<CrosstermBackend<io::Stdout>>;

const PULSE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

pub struct ChatSettings {
    pub endpoint: String,
    pub probe_message: Option<String>,
    pub log_file: Option<PathBuf>,
    pub show_timestamps: bool,
}

pub async fn run_chat(settings: ChatSettings) -> Result<(), Box<dyn Error>> {
    let ChatSettings {
        endpoint,
        probe_message,
        log_file,
        show_timestamps,
    } = settings;

    let logging = LoggingState::new(log_file)?;
    info!(%endpoint, "opening chat session");
    let mut session = ChatSession::open(
        endpoint,
        SessionOptions {
            probe_message,
            logging: Some(logging),
        },
    );
    let mut view = ChatView::new(Theme::dark_default(), show_timestamps);

    // Setup terminal only after the session exists
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();

    // Spawn async event reader task
    let event_reader_handle = tokio::spawn(async move {
        loop {
            // Use a short timeout to prevent blocking
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    });

    let result = drive(&mut terminal, &mut view, &mut session, &mut event_rx).await;

    event_reader_handle.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    session.shutdown().await;
    info!("chat session closed");

    result
}

async fn drive(
    terminal: &mut ChatTerminal,
    view: &mut ChatView,
    session: &mut ChatSession,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    let mut pulse = tokio::time::interval(PULSE_INTERVAL);
    pulse.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut connection_live = true;

    loop {
        terminal.draw(|f| ui(f, view, session))?;

        let awaiting = session.transcript().is_awaiting_response();
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    return Ok(());
                };
                if process_ui_event(event, view, session) == KeyLoopAction::Break {
                    return Ok(());
                }
                // Drain whatever else queued up before redrawing
                while let Ok(event) = event_rx.try_recv() {
                    if process_ui_event(event, view, session) == KeyLoopAction::Break {
                        return Ok(());
                    }
                }
            }
            update = session.next_update(), if connection_live => {
                match update {
                    Some(update) => view.record_update(&update, session.transcript()),
                    None => connection_live = false,
                }
            }
            _ = pulse.tick(), if awaiting => {}
        }
    }
}

fn process_ui_event(event: UiEvent, view: &mut ChatView, session: &mut ChatSession) -> KeyLoopAction {
    match event {
        UiEvent::Crossterm(Event::Key(key)) => handle_key_event(&key, view, session),
        UiEvent::Crossterm(Event::Paste(text)) => {
            handle_paste(&text, view, session);
            KeyLoopAction::Continue
        }
        UiEvent::Crossterm(_) => KeyLoopAction::Continue,
    }
}
