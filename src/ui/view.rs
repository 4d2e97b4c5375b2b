use crate::core::session::{SessionUpdate, SubmitError};
use crate::core::transcript::{RejectReason, Transcript, TranscriptError};
use crate::ui::theme::Theme;
use std::time::Instant;
use tui_textarea::TextArea;

/// Maximum rows the input box grows to before it scrolls internally.
const MAX_INPUT_ROWS: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// Presentation state for the chat screen: input buffer, scroll position,
/// and the most recent diagnostic.
pub struct ChatView {
    textarea: TextArea<'static>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub show_timestamps: bool,
    pub status: Option<Status>,
    pub pulse_start: Instant,
    pub theme: Theme,
    page_height: u16,
    seen_entries: usize,
}

impl ChatView {
    pub fn new(theme: Theme, show_timestamps: bool) -> Self {
        let mut view = Self {
            textarea: TextArea::default(),
            scroll_offset: 0,
            auto_scroll: true,
            show_timestamps,
            status: None,
            pulse_start: Instant::now(),
            theme,
            page_height: 0,
            seen_entries: 0,
        };
        view.configure_textarea();
        view
    }

    pub(crate) fn configure_textarea(&mut self) {
        self.textarea.set_style(self.theme.input_text_style);
        self.textarea
            .set_cursor_style(self.theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(self.theme.input_cursor_line_style);
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn textarea_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.textarea
    }

    pub fn get_input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn clear_input(&mut self) {
        self.textarea = TextArea::default();
        self.configure_textarea();
    }

    pub fn insert_newline(&mut self) {
        self.textarea.insert_newline();
    }

    /// Insert pasted text at the cursor. Carriage returns are normalized and
    /// tabs expanded so the input box stays aligned.
    pub fn insert_paste(&mut self, text: &str) {
        let sanitized = text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', "    ");
        for (index, line) in sanitized.split('\n').enumerate() {
            if index > 0 {
                self.textarea.insert_newline();
            }
            self.textarea.insert_str(line);
        }
    }

    /// Rows the input box needs, not counting its border.
    pub fn input_area_height(&self) -> u16 {
        (self.textarea.lines().len() as u16).clamp(1, MAX_INPUT_ROWS)
    }

    pub fn set_status<S: Into<String>>(&mut self, kind: StatusKind, text: S) {
        self.status = Some(Status {
            kind,
            text: text.into(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.auto_scroll = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        self.auto_scroll = false;
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_height.max(1));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }

    /// Reconcile the scroll position with the latest layout and return the
    /// offset to render with. Scrolling back down to the end re-enables
    /// following new entries.
    pub fn sync_scroll(&mut self, max_offset: u16, page_height: u16) -> u16 {
        self.page_height = page_height;
        if self.auto_scroll || self.scroll_offset >= max_offset {
            self.scroll_offset = max_offset;
            self.auto_scroll = true;
        }
        self.scroll_offset
    }

    /// React to the outcome of a submission attempt.
    pub fn record_submit(&mut self, result: Result<(), SubmitError>) {
        match result {
            Ok(()) => {
                self.clear_input();
                self.clear_status();
                self.auto_scroll = true;
            }
            Err(SubmitError::Rejected(TranscriptError::Rejected(RejectReason::Blank))) => {}
            Err(err) => self.set_status(StatusKind::Info, err.to_string()),
        }
    }

    /// React to a session update, following the transcript whenever it grew.
    pub fn record_update(&mut self, update: &SessionUpdate, transcript: &Transcript) {
        match update {
            SessionUpdate::Connected { .. } => self.set_status(StatusKind::Info, "Connected"),
            SessionUpdate::Reply(_) => self.clear_status(),
            SessionUpdate::DroppedFrame(frame) => {
                self.set_status(StatusKind::Error, format!("Ignored reply: {frame}"))
            }
            SessionUpdate::Failed(cause) => self.set_status(StatusKind::Error, cause.to_string()),
            SessionUpdate::Closed { code, reason } => {
                let kind = if *code == 1000 {
                    StatusKind::Info
                } else {
                    StatusKind::Error
                };
                let text = if reason.is_empty() {
                    format!("Connection closed (code {code})")
                } else {
                    format!("Connection closed (code {code}: {reason})")
                };
                self.set_status(kind, text);
            }
        }

        if transcript.len() > self.seen_entries {
            self.seen_entries = transcript.len();
            self.auto_scroll = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connection::{SendError, TransportError};

    fn view() -> ChatView {
        ChatView::new(Theme::default(), false)
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let mut view = view();
        view.insert_paste("first\r\nsecond\tcol");

        assert_eq!(view.get_input_text(), "first\nsecond    col");
        assert_eq!(view.input_area_height(), 2);
    }

    #[test]
    fn input_height_is_capped() {
        let mut view = view();
        view.insert_paste(&"line\n".repeat(20));

        assert_eq!(view.input_area_height(), MAX_INPUT_ROWS);
    }

    #[test]
    fn manual_scroll_suspends_following_until_bottom_is_reached() {
        let mut view = view();
        assert_eq!(view.sync_scroll(10, 5), 10);

        view.scroll_up(3);
        assert!(!view.auto_scroll);
        assert_eq!(view.sync_scroll(12, 5), 7);

        view.scroll_down(10);
        assert_eq!(view.sync_scroll(12, 5), 12);
        assert!(view.auto_scroll);
    }

    #[test]
    fn page_keys_move_by_viewport_height() {
        let mut view = view();
        view.sync_scroll(20, 8);

        view.page_up();
        assert_eq!(view.scroll_offset, 12);
        view.page_down();
        assert_eq!(view.sync_scroll(20, 8), 20);
    }

    #[test]
    fn growth_resumes_following() {
        let mut view = view();
        view.sync_scroll(10, 5);
        view.scroll_up(4);

        let mut transcript = Transcript::new();
        transcript.append_user("Hello").unwrap();
        view.record_update(&SessionUpdate::Reply(transcript.entries()[0].id()), &transcript);

        assert!(view.auto_scroll);
    }

    #[test]
    fn successful_submit_clears_input() {
        let mut view = view();
        view.insert_paste("Hello");

        view.record_submit(Ok(()));

        assert_eq!(view.get_input_text(), "");
        assert!(view.status.is_none());
    }

    #[test]
    fn refused_submit_keeps_input_and_reports() {
        let mut view = view();
        view.insert_paste("Hello");

        view.record_submit(Err(SubmitError::Send(SendError::NotConnected)));

        assert_eq!(view.get_input_text(), "Hello");
        assert_eq!(
            view.status.as_ref().map(|status| status.kind),
            Some(StatusKind::Info)
        );
    }

    #[test]
    fn failures_are_reported_as_errors() {
        let mut view = view();
        let transcript = Transcript::new();

        view.record_update(
            &SessionUpdate::Failed(TransportError::Read("reset".to_string())),
            &transcript,
        );
        let status = view.status.clone().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("reset"));

        view.record_update(
            &SessionUpdate::Closed {
                code: 1000,
                reason: String::new(),
            },
            &transcript,
        );
        assert_eq!(
            view.status.as_ref().map(|status| status.text.as_str()),
            Some("Connection closed (code 1000)")
        );
    }
}
