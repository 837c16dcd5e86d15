// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Backslash escapes in string literals: resolving them when
//! reading, producing them when writing.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt::Write;
use std::sync::OnceLock;

fn escape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Alternatives are tried in order; the surrogate pair has to
        // come before the plain 4 digit form.
        Regex::new(
            r#"(?x)
              \\u(?P<hi>[dD][89abAB][0-9a-fA-F]{2})\\u(?P<lo>[dD][c-fC-F][0-9a-fA-F]{2})
            | \\U(?P<hex8>[0-9a-fA-F]{8})
            | \\u(?P<hex4>[0-9a-fA-F]{4})
            | \\x(?P<hex2>[0-9a-fA-F]{2})
            | \\(?P<oct>[0-7]{1,3})
            | \\N\{(?P<name>[^}]+)\}
            | \\(?P<single>[\\'"abfnrtv])
            "#
        ).expect("escape pattern is valid")
    })
}

fn hex(s: &str) -> Option<u32> {
    u32::from_str_radix(s, 16).ok()
}

fn single(c: &str) -> char {
    match c {
        "a" => '\x07',
        "b" => '\x08',
        "f" => '\x0C',
        "n" => '\n',
        "r" => '\r',
        "t" => '\t',
        "v" => '\x0B',
        // backslash and both quotes stand for themselves
        _ => c.chars().next().unwrap_or('\\'),
    }
}

fn resolve_one(caps: &Captures) -> Option<char> {
    if let (Some(hi), Some(lo)) = (caps.name("hi"), caps.name("lo")) {
        let hi = hex(hi.as_str())?;
        let lo = hex(lo.as_str())?;
        return char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00))
    }
    if let Some(m) = caps.name("hex8").or(caps.name("hex4")).or(caps.name("hex2")) {
        return char::from_u32(hex(m.as_str())?)
    }
    if let Some(m) = caps.name("oct") {
        return char::from_u32(u32::from_str_radix(m.as_str(), 8).ok()?)
    }
    if let Some(m) = caps.name("name") {
        return unicode_names2::character(m.as_str())
    }
    caps.name("single").map(|m| single(m.as_str()))
}

/// Rewrite the recognized backslash escapes in the raw body of a
/// string literal. Anything else, including a backslash that does not
/// start a recognized escape or an escape naming an impossible code
/// point, is kept verbatim.
pub fn resolve_escapes(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw)
    }
    escape_regex().replace_all(raw, |caps: &Captures| {
        match resolve_one(caps) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Append `s` as a double-quoted literal that only contains ASCII:
/// quotes, backslashes and control characters get short escapes,
/// everything outside ASCII becomes `\uXXXX` (UTF-16 units, so
/// astral characters turn into a surrogate pair).
pub fn write_quoted(out: &mut impl Write, s: &str) -> std::fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\x08' => out.write_str("\\b")?,
            '\x0C' => out.write_str("\\f")?,
            ' '..='~' => out.write_char(c)?,
            _ => {
                let mut units = [0u16; 2];
                for u in c.encode_utf16(&mut units) {
                    write!(out, "\\u{:04x}", u)?;
                }
            }
        }
    }
    out.write_char('"')
}

/// Displays as the quoted literal of the wrapped string.
pub struct Quoted<'t>(pub &'t str);

impl std::fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_quoted(f, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(s: &str) -> String {
        Quoted(s).to_string()
    }

    #[test]
    fn single_char_escapes() {
        assert_eq!(resolve_escapes(r#"a\nb\tc\\d\"e\'f"#), "a\nb\tc\\d\"e'f");
        assert_eq!(resolve_escapes(r"\a\b\f\v\r"), "\x07\x08\x0C\x0B\r");
    }

    #[test]
    fn numeric_escapes() {
        assert_eq!(resolve_escapes(r"\x41\u00e9\U0001F600"), "Aé😀");
        assert_eq!(resolve_escapes(r"\101\0"), "A\0");
        assert_eq!(resolve_escapes(r"\1018"), "A8");
        assert_eq!(resolve_escapes(r"\ud83d\ude00"), "😀");
    }

    #[test]
    fn named_escapes() {
        assert_eq!(resolve_escapes(r"\N{GREEK SMALL LETTER ALPHA}"), "α");
        assert_eq!(resolve_escapes(r"\N{NO SUCH THING}"), r"\N{NO SUCH THING}");
    }

    #[test]
    fn unknown_escapes_pass_through() {
        assert_eq!(resolve_escapes(r"C:\path\zz"), r"C:\path\zz");
        assert_eq!(resolve_escapes(r"\xZZ"), r"\xZZ");
        assert_eq!(resolve_escapes(r"\ud800x"), r"\ud800x");
        assert_eq!(resolve_escapes(r"\UFFFFFFFF"), r"\UFFFFFFFF");
        assert!(matches!(resolve_escapes("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn quoting_is_ascii_only() {
        assert_eq!(quoted("hi"), r#""hi""#);
        assert_eq!(quoted("say \"x\"\\"), r#""say \"x\"\\""#);
        assert_eq!(quoted("é\n"), r#""\u00e9\n""#);
        assert_eq!(quoted("😀"), r#""\ud83d\ude00""#);
        assert_eq!(quoted("\x01"), r#""\u0001""#);
    }

    #[test]
    fn quoting_then_resolving_is_identity() {
        for s in ["", "a\"b", "tab\there", "ünïcødé 😀", "back\\slash", "\x7f"] {
            let q = quoted(s);
            assert_eq!(resolve_escapes(&q[1..q.len() - 1]), s);
        }
    }
}
