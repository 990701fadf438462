//! Terminal panel sink backed by ratatui and crossterm

use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::warn;

use super::{Panel, PanelSink};
use crate::error::Result;
use crate::view::{ContentLine, PanelContent, Tone};

/// Latest content of one panel
#[derive(Debug, Clone, Default)]
struct PanelView {
    content: PanelContent,
    follow_tail: bool,
}

/// Screen layout: market and feed status on top, book and trades below
#[derive(Debug, Clone, Default)]
pub struct Screen {
    panels: [PanelView; 4],
}

impl Screen {
    pub fn set_content(&mut self, panel: Panel, content: PanelContent) {
        self.panels[panel.index()].content = content;
    }

    pub fn scroll_to_end(&mut self, panel: Panel) {
        self.panels[panel.index()].follow_tail = true;
    }

    /// Draw every panel into the frame
    pub fn draw(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(frame.area());

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);

        self.draw_panel(frame, Panel::Market, top[0]);
        self.draw_panel(frame, Panel::Feeds, top[1]);
        self.draw_panel(frame, Panel::OrderBook, bottom[0]);
        self.draw_panel(frame, Panel::Trades, bottom[1]);
    }

    fn draw_panel(&self, frame: &mut Frame, panel: Panel, area: Rect) {
        let view = &self.panels[panel.index()];
        let color = border_color(panel);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                format!(" {} ", panel.title()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        let visible = block.inner(area).height as usize;

        let lines: Vec<Line> = view.content.lines.iter().map(to_line).collect();
        let offset = if view.follow_tail {
            lines.len().saturating_sub(visible)
        } else {
            0
        };

        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
        frame.render_widget(paragraph, area);
    }
}

fn border_color(panel: Panel) -> Color {
    match panel {
        Panel::Market => Color::Cyan,
        Panel::Feeds => Color::White,
        Panel::OrderBook => Color::Red,
        Panel::Trades => Color::Yellow,
    }
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Plain => Style::default(),
        Tone::Bid => Style::default().fg(Color::Green),
        Tone::Ask => Style::default().fg(Color::Red),
        Tone::Buy => Style::default().fg(Color::White).bg(Color::Green),
        Tone::Sell => Style::default().fg(Color::White).bg(Color::Red),
        Tone::Emphasis => Style::default().add_modifier(Modifier::BOLD),
        Tone::Muted => Style::default().fg(Color::DarkGray),
        Tone::Warning => Style::default().fg(Color::Yellow),
    }
}

fn to_line(line: &ContentLine) -> Line<'static> {
    Line::from(
        line.spans
            .iter()
            .map(|span| Span::styled(span.text.clone(), tone_style(span.tone)))
            .collect::<Vec<_>>(),
    )
}

/// Panel sink that paints a [`Screen`] on every flush
pub struct TerminalSink<B: Backend> {
    terminal: Terminal<B>,
    screen: Screen,
    owns_tty: bool,
}

impl TerminalSink<CrosstermBackend<Stdout>> {
    /// Switch stdout to raw mode on the alternate screen
    ///
    /// The terminal is restored when the sink is dropped.
    pub fn enter(title: &str) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, SetTitle(title))?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            screen: Screen::default(),
            owns_tty: true,
        })
    }
}

impl<B: Backend> TerminalSink<B> {
    /// Paint through an arbitrary backend without touching the process terminal
    pub fn with_backend(backend: B) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            screen: Screen::default(),
            owns_tty: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl<B: Backend> PanelSink for TerminalSink<B> {
    fn set_content(&mut self, panel: Panel, content: PanelContent) {
        self.screen.set_content(panel, content);
    }

    fn scroll_to_end(&mut self, panel: Panel) {
        self.screen.scroll_to_end(panel);
    }

    fn flush(&mut self) -> Result<()> {
        let screen = &self.screen;
        self.terminal.draw(|frame| screen.draw(frame))?;
        Ok(())
    }
}

impl<B: Backend> Drop for TerminalSink<B> {
    fn drop(&mut self) {
        if self.owns_tty {
            if let Err(e) = self.restore() {
                warn!(error = %e, "Failed to restore terminal");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn rendered_text(sink: &TerminalSink<TestBackend>) -> String {
        sink.backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_flush_paints_all_panels() {
        let mut sink = TerminalSink::with_backend(TestBackend::new(120, 40)).unwrap();
        sink.set_content(Panel::OrderBook, PanelContent::placeholder("book here"));
        sink.flush().unwrap();

        let text = rendered_text(&sink);
        for panel in Panel::ALL {
            assert!(text.contains(panel.title()), "missing {}", panel.title());
        }
        assert!(text.contains("book here"));
    }

    #[test]
    fn test_scroll_to_end_shows_newest_line() {
        let mut sink = TerminalSink::with_backend(TestBackend::new(120, 20)).unwrap();
        let mut content = PanelContent::new();
        for i in 0..50 {
            content.push(ContentLine::plain(format!("trade-{:02}", i)));
        }
        sink.set_content(Panel::Trades, content);
        sink.scroll_to_end(Panel::Trades);
        sink.flush().unwrap();

        let text = rendered_text(&sink);
        assert!(text.contains("trade-49"));
        assert!(!text.contains("trade-00"));
    }
}
