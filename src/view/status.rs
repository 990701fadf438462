//! Feed connection status

use super::{ContentLine, PanelContent, Tone};
use crate::metrics::FeedStatus;
use crate::websocket::ConnectionState;

pub fn build(feeds: &[FeedStatus], render_cycles: u64) -> PanelContent {
    if feeds.is_empty() {
        return PanelContent::placeholder("no subscriptions");
    }

    let mut content = PanelContent::new();
    for feed in feeds {
        let state_tone = match feed.state {
            ConnectionState::Connected => Tone::Buy,
            ConnectionState::Connecting => Tone::Warning,
            ConnectionState::PendingRetry => Tone::Sell,
        };

        content.push(
            ContentLine::toned(format!("{:<7}", feed.kind.as_str()), Tone::Emphasis)
                .push(format!("{:<14}", feed.state.label()), state_tone)
                .push(feed.stream.clone(), Tone::Muted),
        );
        content.push(ContentLine::plain(format!(
            "       msgs {}  bad {}  skipped {}  reconnects {}",
            feed.counts.messages,
            feed.counts.decode_failures,
            feed.counts.skipped_updates,
            feed.counts.reconnects
        )));
    }

    content.blank();
    content.push(ContentLine::toned(
        format!("renders {}   q/esc to quit", render_cycles),
        Tone::Muted,
    ));
    content
}
