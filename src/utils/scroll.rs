use crate::core::message::ChatEntry;
use crate::ui::theme::Theme;
use chrono::Local;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Handles all scroll-related calculations and line building
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Build display lines for all entries
    pub fn build_display_lines(
        entries: &[ChatEntry],
        theme: &Theme,
        show_timestamps: bool,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for entry in entries {
            Self::add_entry_lines(&mut lines, entry, theme, show_timestamps);
        }

        lines
    }

    fn add_entry_lines(
        lines: &mut Vec<Line<'static>>,
        entry: &ChatEntry,
        theme: &Theme,
        show_timestamps: bool,
    ) {
        let stamp = show_timestamps.then(|| {
            Span::styled(
                format!(
                    "[{}] ",
                    entry.created_at().with_timezone(&Local).format("%H:%M:%S")
                ),
                theme.timestamp_style,
            )
        });

        if entry.is_user() {
            let mut content_lines = entry.content().lines();
            let mut first = Vec::new();
            first.extend(stamp);
            first.push(Span::styled("You: ", theme.user_prefix_style));
            first.push(Span::styled(
                content_lines.next().unwrap_or_default().to_string(),
                theme.user_text_style,
            ));
            lines.push(Line::from(first));
            for content_line in content_lines {
                lines.push(Line::from(Span::styled(
                    content_line.to_string(),
                    theme.user_text_style,
                )));
            }
        } else {
            if let Some(stamp) = stamp {
                lines.push(Line::from(stamp));
            }
            for content_line in entry.content().lines() {
                lines.push(Line::from(Span::styled(
                    content_line.to_string(),
                    theme.assistant_text_style,
                )));
            }
        }

        lines.push(Line::from("")); // Empty line for spacing
    }

    /// Calculate how many wrapped lines the given lines will take
    pub fn calculate_wrapped_line_count(lines: &[Line], terminal_width: u16) -> u16 {
        let mut total_wrapped_lines = 0u16;

        for line in lines {
            let line_text = line.to_string();
            // Trim whitespace to match ratatui's Wrap { trim: true } behavior
            let trimmed_text = line_text.trim();

            if trimmed_text.is_empty() || terminal_width == 0 {
                total_wrapped_lines = total_wrapped_lines.saturating_add(1);
            } else {
                let wrapped_count = Self::calculate_word_wrapped_lines(trimmed_text, terminal_width);
                total_wrapped_lines = total_wrapped_lines.saturating_add(wrapped_count);
            }
        }

        total_wrapped_lines
    }

    /// Calculate how many lines a single text string will wrap to
    fn calculate_word_wrapped_lines(text: &str, terminal_width: u16) -> u16 {
        let width = terminal_width as usize;
        let mut current_line_len = 0;
        let mut line_count = 1u16;

        for word in text.split_whitespace() {
            let word_len = UnicodeWidthStr::width(word);

            if current_line_len > 0 && current_line_len + 1 + word_len > width {
                line_count = line_count.saturating_add(1);
                current_line_len = 0;
            } else if current_line_len > 0 {
                current_line_len += 1; // Add space
            }

            // Words longer than the line are broken across rows
            if word_len > width {
                let extra_rows = (word_len - 1) / width;
                line_count = line_count.saturating_add(extra_rows as u16);
                current_line_len = word_len - extra_rows * width;
            } else {
                current_line_len += word_len;
            }
        }

        line_count
    }

    /// Largest useful scroll offset: the one that shows the last line at the
    /// bottom of the viewport.
    pub fn max_scroll_offset(lines: &[Line], terminal_width: u16, available_height: u16) -> u16 {
        Self::calculate_wrapped_line_count(lines, terminal_width).saturating_sub(available_height)
    }
}
