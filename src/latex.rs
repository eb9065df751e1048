use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::entry::{Entry, Piece, Value};

/// Unicode characters with a LaTeX spelling, generated from
/// build/latex_data.json. Mapped letters use the braced single-token form,
/// so mapping "ö" and flattening "{\"{o}}" converge on the same text.
static UNICODE_TO_LATEX: phf::Map<char, &'static str> =
    include!(concat!(env!("OUT_DIR"), "/unicode_to_latex.rs"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Accents written with a bracketed argument, like {\"{o}}.
static BRACKETED_ACCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{\\([=~^."'])\{([a-zA-Z])\}\}"#).unwrap());

/// Rewrite field text into single-line, LaTeX-escaped form.
pub(crate) fn clean_text(text: &str) -> String {
    let mut mapped = String::with_capacity(text.len());
    for c in text.nfc() {
        match UNICODE_TO_LATEX.get(&c) {
            Some(latex) => mapped.push_str(latex),
            None => mapped.push(c),
        }
    }
    let collapsed = WHITESPACE_RUN.replace_all(&mapped, " ");
    BRACKETED_ACCENT
        .replace_all(&collapsed, r"{\${1}${2}}")
        .into_owned()
}

/// Clean every field of an entry. Page ranges additionally drop the
/// doubled dash, so "123--456" becomes "123-456".
pub(crate) fn cleanup_entry(entry: &mut Entry) {
    for (name, value) in &mut entry.fields {
        clean_value(value);
        if name == "pages" {
            if let Value::Text(text) = value {
                *text = text.replace("--", "-");
            }
        }
    }
}

fn clean_value(value: &mut Value) {
    match value {
        Value::Text(text) => *text = clean_text(text),
        Value::Expression(pieces) => {
            for piece in pieces {
                if let Piece::Text(text) = piece {
                    *text = clean_text(text);
                }
            }
        }
    }
}
