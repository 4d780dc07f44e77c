// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Free-text sanitization.
//!
//! Strips markup brackets, `javascript:` and inline event-handler prefixes
//! (`onclick=`, `onerror=` ...) from visitor input. This is a second layer
//! for display contexts that do not escape output; it does not replace
//! encoding at render time.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref JAVASCRIPT_SCHEME: Regex = Regex::new(r"(?i)javascript:").unwrap();
    static ref SCRIPT_BLOCK: Regex = Regex::new(r"(?is)<script\b.*?</script>").unwrap();
    static ref QUOTED_EVENT_HANDLER: Regex =
        Regex::new(r#"(?i)on[A-Za-z0-9_]+\s*=\s*["'][^"']*["']"#).unwrap();
}

const JAVASCRIPT: &str = "javascript";

/// A character kept in the output, with the start of the leftmost `on`
/// inside the run of word characters that ends at it.
struct Kept {
    ch: char,
    on_start: Option<usize>,
}

/// Remove dangerous substrings from a free-text field and trim it.
///
/// Drops `<` and `>`, `javascript:` and event-handler prefixes matching
/// `on[A-Za-z0-9_]+=` (ASCII case-insensitive). Removing one occurrence can
/// splice its neighbours into a new one (`javajavascript:script:`), so the
/// input is scanned once into an output buffer and every deletion is checked
/// against the buffer tail only. The output never contains a pattern, which
/// makes sanitizing twice a no-op. Runs in linear time.
pub fn sanitize_input(input: &str) -> String {
    let mut kept: Vec<Kept> = Vec::with_capacity(input.len());

    for ch in input.chars() {
        match ch {
            '<' | '>' => continue,
            ':' if ends_with_javascript(&kept) => {
                kept.truncate(kept.len() - JAVASCRIPT.len());
                continue;
            }
            '=' => {
                // Needs at least one word character between `on` and `=`
                if let Some(start) = kept.last().and_then(|k| k.on_start) {
                    if start + 2 < kept.len() {
                        kept.truncate(start);
                        continue;
                    }
                }
            }
            _ => {}
        }

        let on_start = match kept.last() {
            Some(prev) if is_word(ch) && is_word(prev.ch) => prev.on_start.or_else(|| {
                (prev.ch.eq_ignore_ascii_case(&'o') && ch.eq_ignore_ascii_case(&'n'))
                    .then(|| kept.len() - 1)
            }),
            _ => None,
        };
        kept.push(Kept { ch, on_start });
    }

    let cleaned: String = kept.into_iter().map(|k| k.ch).collect();
    cleaned.trim().to_string()
}

fn is_word(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn ends_with_javascript(kept: &[Kept]) -> bool {
    kept.len() >= JAVASCRIPT.len()
        && kept[kept.len() - JAVASCRIPT.len()..]
            .iter()
            .zip(JAVASCRIPT.chars())
            .all(|(k, expected)| k.ch.eq_ignore_ascii_case(&expected))
}

fn replace_cow<'a>(text: Cow<'a, str>, pattern: &Regex) -> Cow<'a, str> {
    let replaced = match pattern.replace_all(&text, "") {
        Cow::Owned(replaced) => Some(replaced),
        Cow::Borrowed(_) => None,
    };
    match replaced {
        Some(replaced) => Cow::Owned(replaced),
        None => text,
    }
}

/// Strip `<script>` blocks, quoted inline event handlers and `javascript:`
/// from an HTML fragment, keeping the remaining markup.
pub fn sanitize_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let html = SCRIPT_BLOCK.replace_all(html, "");
    let html = replace_cow(html, &QUOTED_EVENT_HANDLER);
    let html = replace_cow(html, &JAVASCRIPT_SCHEME);
    html.trim().to_string()
}
