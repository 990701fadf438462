//! View builders
//!
//! Pure functions turning a [`MarketSnapshot`](crate::market::MarketSnapshot)
//! into panel content. Content is plain text split into toned spans; the
//! display backend decides what a tone looks like.

pub mod chart;
pub mod orderbook;
pub mod status;
pub mod trades;

/// Visual role of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Bid,
    Ask,
    Buy,
    Sell,
    Emphasis,
    Muted,
    Warning,
}

/// A run of text sharing one tone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

/// One line of panel content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentLine {
    pub spans: Vec<Span>,
}

impl ContentLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::toned(text, Tone::Plain)
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self::new().push(text, tone)
    }

    /// Append a span
    pub fn push(mut self, text: impl Into<String>, tone: Tone) -> Self {
        self.spans.push(Span {
            text: text.into(),
            tone,
        });
        self
    }

    /// Text of the line without tones
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Formatted content for one panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelContent {
    pub lines: Vec<ContentLine>,
}

impl PanelContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single muted line shown before any data has arrived
    pub fn placeholder(message: &str) -> Self {
        Self {
            lines: vec![ContentLine::toned(message, Tone::Muted)],
        }
    }

    pub fn push(&mut self, line: ContentLine) {
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.lines.push(ContentLine::new());
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = ContentLine>) {
        self.lines.extend(lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All lines joined with `\n`, tones dropped
    pub fn to_plain_text(&self) -> String {
        self.lines
            .iter()
            .map(ContentLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format an optional decimal for display, `-` when absent
pub(crate) fn display_or_dash(value: Option<rust_decimal::Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.normalize().to_string())
}
