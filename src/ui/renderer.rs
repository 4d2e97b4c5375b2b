use crate::core::connection::ConnectionState;
use crate::core::session::ChatSession;
use crate::ui::title::build_main_title;
use crate::ui::view::{ChatView, StatusKind};
use crate::utils::scroll::ScrollCalculator;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const INPUT_HINT: &str = "Type your message (Alt+Enter for new line, Ctrl+C to quit)";

pub fn ui(f: &mut Frame, view: &mut ChatView, session: &ChatSession) {
    let input_area_height = view.input_area_height();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(input_area_height + 2), // +2 for borders
        ])
        .split(f.area());

    let lines = ScrollCalculator::build_display_lines(
        session.transcript().entries(),
        &view.theme,
        view.show_timestamps,
    );

    let available_height = chunks[0].height.saturating_sub(1); // Account for title
    let max_offset = ScrollCalculator::max_scroll_offset(&lines, chunks[0].width, available_height);
    let scroll_offset = view.sync_scroll(max_offset, available_height);

    let title = build_main_title(session, chunks[0].width);
    let messages_paragraph = Paragraph::new(lines)
        .block(Block::default().title(Span::styled(title, view.theme.title_style)))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));

    f.render_widget(messages_paragraph, chunks[0]);

    let enabled = session.accepts_input();
    let awaiting = session.transcript().is_awaiting_response();
    let (input_title, title_style) = input_title(view, session);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(view.theme.input_border_style)
        .title(Span::styled(input_title, title_style));
    if awaiting {
        block = block.title_top(
            Line::from(Span::styled(
                format!(" {} ", pulse_symbol(view)),
                view.theme.waiting_indicator_style,
            ))
            .right_aligned(),
        );
    }

    let (text_style, cursor_style) = if enabled {
        (view.theme.input_text_style, view.theme.input_cursor_style)
    } else {
        (view.theme.input_disabled_style, Style::default())
    };
    let textarea = view.textarea_mut();
    textarea.set_block(block);
    textarea.set_style(text_style);
    textarea.set_cursor_style(cursor_style);

    f.render_widget(view.textarea(), chunks[1]);
}

fn input_title(view: &ChatView, session: &ChatSession) -> (String, Style) {
    if session.transcript().is_awaiting_response() {
        return (
            "Waiting for reply…".to_string(),
            view.theme.input_title_style,
        );
    }

    if let Some(status) = &view.status {
        if status.kind == StatusKind::Error || session.connection_state() != ConnectionState::Open {
            let style = match status.kind {
                StatusKind::Info => view.theme.notice_info_style,
                StatusKind::Error => view.theme.notice_error_style,
            };
            return (format!("{} (Ctrl+C to quit)", status.text), style);
        }
    }

    let text = match session.connection_state() {
        ConnectionState::Connecting => "Connecting… (Ctrl+C to quit)".to_string(),
        ConnectionState::Open => INPUT_HINT.to_string(),
        ConnectionState::Closed | ConnectionState::Errored => {
            "Disconnected (Ctrl+C to quit)".to_string()
        }
    };
    (text, view.theme.input_title_style)
}

/// Pulsing activity symbol, two cycles per second.
fn pulse_symbol(view: &ChatView) -> &'static str {
    let elapsed = view.pulse_start.elapsed().as_millis() as f32 / 1000.0;
    let pulse_phase = (elapsed * 2.0) % 2.0;
    let pulse_intensity = if pulse_phase < 1.0 {
        pulse_phase
    } else {
        2.0 - pulse_phase
    };

    if pulse_intensity < 0.33 {
        "○"
    } else if pulse_intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}
