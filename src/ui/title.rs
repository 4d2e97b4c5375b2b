use crate::core::connection::ConnectionState;
use crate::core::session::ChatSession;
use unicode_width::UnicodeWidthStr;

const SEPARATOR: &str = " • ";

#[derive(Debug, Clone)]
struct FieldVariant {
    text: String,
    width: usize,
}

impl FieldVariant {
    fn new(text: String) -> Self {
        let width = UnicodeWidthStr::width(text.as_str());
        Self { text, width }
    }
}

/// Progressively shorter renderings of `value`, longest first.
fn build_variants(value: &str) -> Vec<FieldVariant> {
    let mut variants = vec![FieldVariant::new(value.to_string())];

    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 3 {
        for keep in (3..chars.len()).rev() {
            let mut truncated: String = chars[..keep].iter().collect();
            truncated.push('…');
            variants.push(FieldVariant::new(truncated));
        }
    }

    variants
}

pub fn build_main_title(session: &ChatSession, available_width: u16) -> String {
    let logging_status = session
        .logging()
        .map(|logging| logging.get_status_string())
        .unwrap_or_else(|| "disabled".to_string());

    compose_title(
        session.connection_state(),
        session.endpoint(),
        &logging_status,
        available_width,
    )
}

fn compose_title(
    state: ConnectionState,
    endpoint: &str,
    logging_status: &str,
    available_width: u16,
) -> String {
    let available_width = available_width as usize;
    let base_text = format!("Deskchat v{} - {}", env!("CARGO_PKG_VERSION"), state);
    let logging_text = format!("Logging: {logging_status}");
    let separator_width = UnicodeWidthStr::width(SEPARATOR);
    let fixed_width = UnicodeWidthStr::width(base_text.as_str())
        + UnicodeWidthStr::width(logging_text.as_str())
        + separator_width * 2;

    build_variants(endpoint)
        .into_iter()
        .find(|variant| fixed_width + variant.width <= available_width)
        .map(|variant| [base_text.as_str(), &variant.text, &logging_text].join(SEPARATOR))
        .unwrap_or_else(|| [base_text.as_str(), &logging_text].join(SEPARATOR))
}
