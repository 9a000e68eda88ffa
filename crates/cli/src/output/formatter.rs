//! Human and JSON rendering
//!
//! Results go to stdout. Errors, warnings and prompts go to stderr so that
//! `--json` output can be piped straight into another tool.

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Cell, ContentArrangement, Table};
use console::Style;
use serde::Serialize;

use super::OutputConfig;

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Renders command results according to the global output flags
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    /// Colors are off under `--no-color` and always in JSON mode
    pub fn colors_enabled(&self) -> bool {
        !(self.config.no_color || self.config.json)
    }

    /// Human-only chatter is dropped under `--quiet` and `--json`
    fn chatty(&self) -> bool {
        !(self.config.quiet || self.config.json)
    }

    fn status(&self, stream: Stream, marker: &str, paint: Style, message: &str) {
        let marker = if self.colors_enabled() {
            paint.apply_to(marker).to_string()
        } else {
            marker.to_string()
        };
        match stream {
            Stream::Stdout => println!("{marker} {message}"),
            Stream::Stderr => eprintln!("{marker} {message}"),
        }
    }

    pub fn success(&self, message: &str) {
        if self.chatty() {
            self.status(Stream::Stdout, "✓", Style::new().green(), message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.chatty() {
            self.status(Stream::Stderr, "⚠", Style::new().yellow(), message);
        }
    }

    /// Errors are never silenced; in JSON mode they become `{"error": ...}`
    pub fn error(&self, message: &str) {
        if self.config.json {
            let body = serde_json::json!({ "error": message });
            eprintln!("{body}");
        } else {
            self.status(Stream::Stderr, "✗", Style::new().red(), message);
        }
    }

    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{text}"),
            Err(e) => self.error(&format!("Cannot render JSON output: {e}")),
        }
    }

    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }

    pub fn table(&self, table: &Table) {
        if !self.config.quiet {
            println!("{table}");
        }
    }

    /// An empty table with the given header row
    pub fn new_table<I, S>(&self, header: I) -> Table
    where
        I: IntoIterator<Item = S>,
        S: Into<Cell>,
    {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(header);
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(config: OutputConfig) -> Formatter {
        Formatter::new(config)
    }

    #[test]
    fn test_plain_defaults() {
        let f = Formatter::default();
        assert!(!f.is_json() && !f.is_quiet());
        assert!(f.colors_enabled());
        assert!(f.chatty());
    }

    #[test]
    fn test_json_mode_disables_color_and_chatter() {
        let f = formatter(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(!f.colors_enabled());
        assert!(!f.chatty());
    }

    #[test]
    fn test_quiet_keeps_color_but_drops_chatter() {
        let f = formatter(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        assert!(f.colors_enabled());
        assert!(!f.chatty());
    }

    #[test]
    fn test_table_renders_header_and_rows() {
        let f = formatter(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        let mut table = f.new_table(["#", "Bucket"]);
        table.add_row(vec!["1", "archive"]);

        let rendered = table.to_string();
        assert!(rendered.contains("Bucket"));
        assert!(rendered.contains("archive"));
    }
}
