//! Off-line plugin inspection.
//!
//! Reproduces the checks the toolkit runs when it loads a plugin: the
//! lifecycle functions must be exported, and so must every plugin function
//! the application's JTF binds to an event.

pub mod jtf;
pub mod loader;
pub mod report;

pub use jtf::{EventBinding, JtfError, load_bindings, parse_bindings, plugin_functions};
pub use loader::{InspectError, InspectErrorKind, Metadata, PluginLibrary};
pub use report::{CheckReport, MissingSymbol, Requirement, render_metadata};

use std::collections::HashSet;
use xante_plugin_interface::{FunctionReference, MANDATORY_FUNCTIONS, METADATA_FUNCTIONS};

/// What a plugin must provide.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions<'a> {
    pub require_lifecycle: bool,
    pub extra_symbols: &'a [String],
    pub bindings: &'a [EventBinding],
    pub call_init: bool,
}

/// Every required symbol `exports` reports absent, each listed once under the
/// first requirement that named it.
pub fn missing_symbols(
    exports: impl Fn(&str) -> bool,
    options: &CheckOptions<'_>,
) -> Vec<MissingSymbol> {
    let mut required: Vec<(&str, Requirement)> = Vec::new();

    if options.require_lifecycle {
        required.extend(MANDATORY_FUNCTIONS.iter().map(|s| (*s, Requirement::Lifecycle)));
    }
    required.extend(METADATA_FUNCTIONS.iter().map(|s| (*s, Requirement::Metadata)));
    required.extend(
        options
            .extra_symbols
            .iter()
            .map(|s| (s.as_str(), Requirement::Config)),
    );
    for binding in options.bindings {
        if let FunctionReference::Plugin(function) = binding.reference()
            && !function.is_empty()
        {
            required.push((
                function,
                Requirement::Event {
                    owner: binding.owner.clone(),
                    event: binding.event.clone(),
                },
            ));
        }
    }

    let mut seen = HashSet::new();
    required
        .into_iter()
        .filter(|(symbol, _)| seen.insert(*symbol))
        .filter(|(symbol, _)| !exports(symbol))
        .map(|(symbol, required_by)| MissingSymbol {
            symbol: symbol.to_string(),
            required_by,
        })
        .collect()
}

/// Run every check against an opened library.
pub fn check(library: &PluginLibrary, options: &CheckOptions<'_>) -> CheckReport {
    let mut report = CheckReport::new(library.path().to_path_buf());

    report.missing_symbols = missing_symbols(|symbol| library.has_symbol(symbol), options);
    report.unknown_events = options
        .bindings
        .iter()
        .filter(|binding| !binding.is_known_event())
        .cloned()
        .collect();

    let metadata_missing = report
        .missing_symbols
        .iter()
        .any(|missing| missing.required_by == Requirement::Metadata);
    if !metadata_missing {
        match library.metadata() {
            Ok(metadata) => report.metadata = Some(metadata),
            Err(err) => report.errors.push(err.message),
        }
    }

    if options.call_init
        && let Err(err) = library.call_init()
    {
        report.errors.push(err.message);
    }

    tracing::debug!(
        path = %report.path.display(),
        missing = report.missing_symbols.len(),
        errors = report.errors.len(),
        "check finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exports(symbols: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |symbol: &str| {
            symbols.contains(&symbol)
                || MANDATORY_FUNCTIONS.contains(&symbol)
                || METADATA_FUNCTIONS.contains(&symbol)
        }
    }

    #[test]
    fn test_complete_plugin_has_nothing_missing() {
        let options = CheckOptions {
            require_lifecycle: true,
            ..Default::default()
        };
        assert!(missing_symbols(exports(&[]), &options).is_empty());
    }

    #[test]
    fn test_lifecycle_is_optional() {
        let options = CheckOptions::default();
        let missing = missing_symbols(|s| METADATA_FUNCTIONS.contains(&s), &options);
        assert!(missing.is_empty());

        let options = CheckOptions {
            require_lifecycle: true,
            ..Default::default()
        };
        let missing = missing_symbols(|s| METADATA_FUNCTIONS.contains(&s), &options);
        assert_eq!(missing.len(), MANDATORY_FUNCTIONS.len());
        assert!(missing.iter().all(|m| m.required_by == Requirement::Lifecycle));
    }

    #[test]
    fn test_extra_and_event_symbols() {
        let extra = vec!["foo_custom".to_string(), "sync_data".to_string()];
        let bindings = parse_bindings(
            r#"{"items": [
                {"name": "a", "events": {"custom-event": "foo_custom"}},
                {"name": "b", "events": {"item-value-confirm": "validate_input"}},
                {"name": "c", "events": {"item-exit": "xante:internal_exit"}}
            ]}"#,
        )
        .unwrap();
        let options = CheckOptions {
            require_lifecycle: true,
            extra_symbols: &extra,
            bindings: &bindings,
            call_init: false,
        };

        let missing = missing_symbols(exports(&["foo_custom"]), &options);
        assert_eq!(
            missing,
            vec![
                MissingSymbol {
                    symbol: "sync_data".to_string(),
                    required_by: Requirement::Config,
                },
                MissingSymbol {
                    symbol: "validate_input".to_string(),
                    required_by: Requirement::Event {
                        owner: Some("b".to_string()),
                        event: "item-value-confirm".to_string(),
                    },
                },
            ]
        );
    }

    #[test]
    fn test_symbols_are_reported_once() {
        let extra = vec!["validate_input".to_string()];
        let bindings = parse_bindings(
            r#"{"events": {
                "item-value-confirm": "validate_input",
                "value-check": "validate_input"
            }}"#,
        )
        .unwrap();
        let options = CheckOptions {
            extra_symbols: &extra,
            bindings: &bindings,
            ..Default::default()
        };

        let missing = missing_symbols(exports(&[]), &options);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].required_by, Requirement::Config);
    }
}
