//! Where finished orders are reported.

use std::fmt::Display;
use std::io::Write;
use std::sync::Mutex;

/// Receives the items of each placed order.
///
/// One call per order; implementations must keep the lines of one call
/// together even when consumers finish at the same time.
pub trait PurchaseSink<P>: Send + Sync {
    fn record(&self, consumer: &str, items: &[P]);
}

/// Prints `"<consumer> bought <product>"` lines to stdout.
///
/// Holds the stdout lock for the whole order.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl<P: Display> PurchaseSink<P> for StdoutSink {
    fn record(&self, consumer: &str, items: &[P]) {
        let mut out = std::io::stdout().lock();
        for item in items {
            // A closed stdout (e.g. `| head`) must not take the worker down.
            let _ = writeln!(out, "{consumer} bought {item}");
        }
        let _ = out.flush();
    }
}

/// Collects purchase lines in memory (tests, embedding).
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl<P: Display> PurchaseSink<P> for MemorySink {
    fn record(&self, consumer: &str, items: &[P]) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.extend(items.iter().map(|item| format!("{consumer} bought {item}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_formats_lines() {
        let sink = MemorySink::new();
        sink.record("cons1", &["tea", "coffee"][..]);
        sink.record("cons2", &[] as &[&str]);
        assert_eq!(sink.lines(), vec!["cons1 bought tea", "cons1 bought coffee"]);
    }
}
