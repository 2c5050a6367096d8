//! `tracing` output routed to the browser console.

use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut line = ConsoleLine::default();
        event.record(&mut line);

        let metadata = event.metadata();
        let text = line.render(metadata.target());
        match *metadata.level() {
            Level::ERROR => gloo_console::error!(text),
            Level::WARN => gloo_console::warn!(text),
            Level::INFO => gloo_console::info!(text),
            _ => gloo_console::debug!(text),
        }
    }
}

#[derive(Default)]
struct ConsoleLine {
    message: String,
    fields: String,
}

impl ConsoleLine {
    fn render(&self, target: &str) -> String {
        format!("[{target}] {}{}", self.message, self.fields)
    }
}

impl Visit for ConsoleLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Install the console subscriber. Safe to call more than once.
pub fn init() {
    let subscriber = tracing_subscriber::registry().with(ConsoleLayer.with_filter(LevelFilter::DEBUG));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        gloo_console::warn!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_message_before_fields() {
        let line = ConsoleLine {
            message: "tree minted".to_owned(),
            fields: " tx_hash=0xabc account=0x1111".to_owned(),
        };
        assert_eq!(
            line.render("tn_registry::workflow"),
            "[tn_registry::workflow] tree minted tx_hash=0xabc account=0x1111"
        );
    }
}
