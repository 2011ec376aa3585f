//! Property tests: translation is total, deterministic and stable.

use gtkdoc_rst::{Unresolved, translate};
use proptest::prelude::*;

/// Text biased towards gtk-doc syntax.
fn gtkdoc_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex(
        "([a-zA-Z_ ]{1,6}|[`*_#%@\\[\\]()!<>|:\\\\&;.-]|```|\\|\\[|\\]\\||\n|\n\n|- |1\\. |> |\\| |[a-z]@[a-zA-Z.:]{1,6}\\]|<kbd>|</kbd>|é){0,40}",
    )
    .expect("valid regex")
}

proptest! {
    #[test]
    fn never_panics(input in gtkdoc_text()) {
        let _ = translate(input.as_str(), &Unresolved, "Gtk", "https://docs.example.org");
    }

    #[test]
    fn never_panics_on_arbitrary_unicode(input in "\\PC{0,200}") {
        let _ = translate(input.as_str(), &Unresolved, "", "");
    }

    #[test]
    fn is_deterministic(input in gtkdoc_text()) {
        let first = translate(input.as_str(), &Unresolved, "Gtk", "");
        let second = translate(input.as_str(), &Unresolved, "Gtk", "");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn output_has_no_trailing_whitespace(input in gtkdoc_text()) {
        let output = translate(input.as_str(), &Unresolved, "", "");
        prop_assert_eq!(output.trim_end(), output.as_str());
        for line in output.lines() {
            prop_assert_eq!(line.trim_end(), line);
        }
    }

    #[test]
    fn double_backticks_are_not_rewrapped(
        before in "[a-z ]{0,10}",
        code in "[a-z][a-z_]{0,10}",
        after in "[a-z ]{0,10}",
    ) {
        let input = format!("{before} ``{code}`` {after}");
        let output = translate(input.as_str(), &Unresolved, "", "");
        let expected = format!("``{code}``");
        prop_assert!(output.contains(&expected));
        prop_assert!(!output.contains("````"));
    }

    #[test]
    fn code_span_translation_is_stable(code in "[a-zA-Z][a-zA-Z0-9_ ]{0,12}[a-zA-Z0-9]") {
        let once = translate(format!("`{code}`").as_str(), &Unresolved, "", "");
        let twice = translate(once.as_str(), &Unresolved, "", "");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn table_borders_match_rows(
        rows in prop::collection::vec(prop::collection::vec("[a-z]{0,8}", 1..5), 1..6),
    ) {
        let input: Vec<String> = rows
            .iter()
            .map(|cells| format!("| {} |", cells.join(" | ")))
            .collect();
        let output = translate(input.join("\n").as_str(), &Unresolved, "", "");

        let widths: Vec<usize> = output.lines().map(|line| line.chars().count()).collect();
        prop_assert!(!widths.is_empty());
        prop_assert!(widths.iter().all(|&w| w == widths[0]), "ragged grid:\n{}", output);
        prop_assert!(output.lines().all(|line| line.starts_with('+') || line.starts_with('|')));
    }
}
