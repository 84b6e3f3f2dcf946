use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::jtf::EventBinding;
use super::loader::Metadata;

/// Why a symbol had to be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Requirement {
    Lifecycle,
    Metadata,
    Config,
    Event {
        owner: Option<String>,
        event: String,
    },
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Lifecycle => write!(f, "lifecycle"),
            Requirement::Metadata => write!(f, "metadata"),
            Requirement::Config => write!(f, "config"),
            Requirement::Event {
                owner: Some(owner),
                event,
            } => write!(f, "{event} on {owner}"),
            Requirement::Event { owner: None, event } => write!(f, "{event}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingSymbol {
    pub symbol: String,
    pub required_by: Requirement,
}

/// Outcome of `xante-plugin check`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub metadata: Option<Metadata>,
    pub missing_symbols: Vec<MissingSymbol>,
    /// Bindings whose event name the toolkit does not know. Reported but
    /// not fatal.
    pub unknown_events: Vec<EventBinding>,
    /// Failures while calling into the plugin.
    pub errors: Vec<String>,
}

impl CheckReport {
    pub fn new(path: PathBuf) -> Self {
        CheckReport {
            path,
            ..Default::default()
        }
    }

    pub fn passed(&self) -> bool {
        self.missing_symbols.is_empty() && self.errors.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "plugin: {}", self.path.display());

        if let Some(metadata) = &self.metadata {
            out.push_str(&render_metadata(metadata));
        }

        if !self.missing_symbols.is_empty() {
            out.push_str("\nmissing symbols:\n");
            for missing in &self.missing_symbols {
                let _ = writeln!(out, "  {} ({})", missing.symbol, missing.required_by);
            }
        }

        if !self.errors.is_empty() {
            out.push_str("\nerrors:\n");
            for error in &self.errors {
                let _ = writeln!(out, "  {error}");
            }
        }

        if !self.unknown_events.is_empty() {
            out.push_str("\nwarnings:\n");
            for binding in &self.unknown_events {
                let _ = writeln!(
                    out,
                    "  unknown event '{}' bound to '{}'{}",
                    binding.event,
                    binding.function,
                    binding
                        .owner
                        .as_deref()
                        .map(|owner| format!(" on {owner}"))
                        .unwrap_or_default()
                );
            }
        }

        let _ = writeln!(
            out,
            "\nresult: {}",
            if self.passed() { "ok" } else { "FAILED" }
        );
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `key: value` lines for the metadata strings, `(null)` for absent ones.
pub fn render_metadata(metadata: &Metadata) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "(null)".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "  name:        {}", field(&metadata.name));
    let _ = writeln!(out, "  version:     {}", field(&metadata.version));
    let _ = writeln!(out, "  author:      {}", field(&metadata.author));
    let _ = writeln!(out, "  description: {}", field(&metadata.description));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn failing_report() -> CheckReport {
        let mut report = CheckReport::new(PathBuf::from("libdemo.so"));
        report.missing_symbols.push(MissingSymbol {
            symbol: "foo_custom".to_string(),
            required_by: Requirement::Event {
                owner: Some("input_string".to_string()),
                event: "custom-event".to_string(),
            },
        });
        report
    }

    #[test]
    fn test_empty_report_passes() {
        let report = CheckReport::new(PathBuf::from("libdemo.so"));
        assert!(report.passed());
        assert!(report.render_text().ends_with("result: ok\n"));
    }

    #[test]
    fn test_text_lists_missing_symbols() {
        let report = failing_report();
        assert!(!report.passed());

        let text = report.render_text();
        assert!(text.contains("  foo_custom (custom-event on input_string)\n"));
        assert!(text.ends_with("result: FAILED\n"));
    }

    #[test]
    fn test_errors_fail_the_check() {
        let mut report = CheckReport::new(PathBuf::from("libdemo.so"));
        report.errors.push("xapl_init returned -1".to_string());
        assert!(!report.passed());
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&failing_report().render_json().unwrap()).unwrap();

        assert_eq!(json["path"], "libdemo.so");
        assert_eq!(json["missing_symbols"][0]["symbol"], "foo_custom");
        assert_eq!(json["missing_symbols"][0]["required_by"]["kind"], "event");
        assert_eq!(json["metadata"], serde_json::Value::Null);
    }

    #[test]
    fn test_metadata_nulls() {
        let metadata = Metadata {
            name: Some("demo".to_string()),
            ..Default::default()
        };
        let text = render_metadata(&metadata);
        assert!(text.contains("name:        demo"));
        assert!(text.contains("author:      (null)"));
    }
}
