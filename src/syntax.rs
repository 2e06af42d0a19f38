//! The citation grammar shared by the reference map builder, the inline rewriter and the
//! footnote definition renderer.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `[^n]` or `[^n,m,...]`; group 1 is the raw number list.
static CITATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\^(\d+(?:,\d+)*)\]").expect("CITATION_MARKER: hardcoded regex is valid")
});

/// `[^n]: [link text](http(s)://...)`; groups are number, link text and url.
static DEFINITION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\^(\d+)\]:\s*\[(.*?)\]\((https?://[^)]+)\)")
        .expect("DEFINITION_LINE: hardcoded regex is valid")
});

pub(crate) fn citation_marker() -> &'static Regex {
    &CITATION_MARKER
}

pub(crate) fn definition_line() -> &'static Regex {
    &DEFINITION_LINE
}

/// True for `http://` and `https://` URLs with a non-empty, whitespace-free remainder.
pub fn is_http_url(url: &str) -> bool {
    let rest = strip_prefix_ignore_ascii_case(url, "https://")
        .or_else(|| strip_prefix_ignore_ascii_case(url, "http://"));
    match rest {
        Some(rest) => !rest.is_empty() && !rest.chars().any(char::is_whitespace),
        None => false,
    }
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

pub fn footnote_anchor_id(prefix: &str, number: &str) -> String {
    let mut id = String::with_capacity(prefix.len() + number.len());
    id.push_str(prefix);
    id.push_str(number);
    id
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FenceOpen {
    fence_char: u8,
    fence_len: usize,
}

pub(crate) fn strip_up_to_three_leading_spaces(line: &str) -> &str {
    let mut s = line;
    let mut spaces = 0usize;
    while spaces < 3 && s.starts_with(' ') {
        s = &s[1..];
        spaces += 1;
    }
    s
}

/// Level of an ATX heading line (`#` through `######`), if `line` is one.
pub fn atx_heading_level(line: &str) -> Option<usize> {
    let s = strip_up_to_three_leading_spaces(line);
    let level = s.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    match s.as_bytes().get(level) {
        None | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => Some(level),
        Some(_) => None,
    }
}

fn fence_open(line: &str) -> Option<FenceOpen> {
    let bytes = strip_up_to_three_leading_spaces(line).as_bytes();
    let first = *bytes.first()?;
    if first != b'`' && first != b'~' {
        return None;
    }
    let fence_len = bytes.iter().take_while(|&&b| b == first).count();
    if fence_len < 3 {
        return None;
    }
    Some(FenceOpen {
        fence_char: first,
        fence_len,
    })
}

fn closes_fence(line: &str, open: FenceOpen) -> bool {
    let trimmed = strip_up_to_three_leading_spaces(line).trim_end();
    !trimmed.is_empty()
        && trimmed.bytes().all(|b| b == open.fence_char)
        && trimmed.len() >= open.fence_len
}

/// Report source prepared for an external Markdown converter.
///
/// Every `[^<digit>` outside code gets a backslash in front of it, so the converter sees literal
/// text instead of a link label or a link reference definition. Offsets reported by the converter
/// for the escaped text can be mapped back to the original document.
#[derive(Debug, Clone)]
pub struct EscapedSource<'a> {
    original: &'a str,
    escaped: Cow<'a, str>,
    /// Offsets (in escaped text) of inserted backslashes, ascending.
    insertions: Vec<usize>,
}

impl<'a> EscapedSource<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut insertions = Vec::new();
        let mut escaped = String::new();
        let mut copied = 0usize;
        let mut fence: Option<FenceOpen> = None;
        let mut line_start = 0usize;

        for line in original.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if let Some(open) = fence {
                if closes_fence(content, open) {
                    fence = None;
                }
                line_start += line.len();
                continue;
            }
            if let Some(open) = fence_open(content) {
                fence = Some(open);
                line_start += line.len();
                continue;
            }
            for rel in marker_starts_outside_code(content) {
                let at = line_start + rel;
                escaped.push_str(&original[copied..at]);
                insertions.push(escaped.len());
                escaped.push('\\');
                copied = at;
            }
            line_start += line.len();
        }

        if insertions.is_empty() {
            return Self {
                original,
                escaped: Cow::Borrowed(original),
                insertions,
            };
        }
        escaped.push_str(&original[copied..]);
        Self {
            original,
            escaped: Cow::Owned(escaped),
            insertions,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.escaped
    }

    pub fn to_original_offset(&self, escaped_offset: usize) -> usize {
        let inserted_before = self.insertions.partition_point(|&p| p < escaped_offset);
        escaped_offset - inserted_before
    }

    pub fn original_range(&self, escaped: Range<usize>) -> Range<usize> {
        self.to_original_offset(escaped.start)..self.to_original_offset(escaped.end)
    }

    pub fn original_slice(&self, escaped: Range<usize>) -> &'a str {
        let range = self.original_range(escaped);
        self.original.get(range).unwrap_or("")
    }

    /// `text` as the converter reported it for `escaped`, minus the backslashes inserted by the
    /// escape. Needed wherever the converter keeps backslashes literally (code, raw HTML).
    pub fn unescape<'t>(&self, escaped: Range<usize>, text: &'t str) -> Cow<'t, str> {
        let first = self.insertions.partition_point(|&p| p < escaped.start);
        let last = self.insertions.partition_point(|&p| p < escaped.end);
        if first == last {
            return Cow::Borrowed(text);
        }
        if self.escaped.get(escaped.clone()) == Some(text) {
            return Cow::Owned(self.original_slice(escaped).to_string());
        }
        // The converter reshaped the span (code span delimiters, tabs); drop one backslash per
        // insertion, in order.
        let mut remaining = last - first;
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while remaining > 0 {
            let Some(at) = rest.find("\\[^") else {
                break;
            };
            out.push_str(&rest[..at]);
            rest = &rest[at + 1..];
            remaining -= 1;
        }
        out.push_str(rest);
        Cow::Owned(out)
    }
}

/// Byte offsets of `[^<digit>` openers in `line` that are not inside inline code and not
/// already escaped.
fn marker_starts_outside_code(line: &str) -> Vec<usize> {
    let bytes = line.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'`' => {
                let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                match find_backtick_run(bytes, i + run, run) {
                    Some(close) => i = close + run,
                    None => i += run,
                }
            }
            b'\\' => i += 2,
            b'[' if bytes.get(i + 1) == Some(&b'^')
                && bytes.get(i + 2).is_some_and(u8::is_ascii_digit) =>
            {
                out.push(i);
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

fn find_backtick_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
        if run == len {
            return Some(i);
        }
        i += run;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_url_requires_scheme_and_host() {
        assert!(is_http_url("https://x/y"));
        assert!(is_http_url("HTTP://example.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
        assert!(!is_http_url("https://a b"));
    }

    #[test]
    fn atx_heading_levels() {
        assert_eq!(atx_heading_level("## References"), Some(2));
        assert_eq!(atx_heading_level("   # Title"), Some(1));
        assert_eq!(atx_heading_level("#"), Some(1));
        assert_eq!(atx_heading_level("#hashtag"), None);
        assert_eq!(atx_heading_level("####### seven"), None);
        assert_eq!(atx_heading_level("    # indented code"), None);
    }

    #[test]
    fn escapes_markers_outside_code() {
        let src = "See [^1] and `[^2]`.\n```\n[^3]\n```\n[^4]: [A](https://a.com)\n";
        let escaped = EscapedSource::new(src);
        assert_eq!(
            escaped.as_str(),
            "See \\[^1] and `[^2]`.\n```\n[^3]\n```\n\\[^4]: [A](https://a.com)\n"
        );
    }

    #[test]
    fn maps_escaped_offsets_back() {
        let src = "a [^1] b [^2]";
        let escaped = EscapedSource::new(src);
        assert_eq!(escaped.as_str(), "a \\[^1] b \\[^2]");
        // The inserted backslash maps onto the bracket it precedes.
        assert_eq!(escaped.to_original_offset(2), 2);
        assert_eq!(escaped.to_original_offset(3), 2);
        assert_eq!(escaped.to_original_offset(11), 9);
        assert_eq!(escaped.original_slice(2..7), "[^1]");
    }

    #[test]
    fn unescape_restores_literal_text() {
        let src = "Intro.\n\n    let x = arr[^1];\n\n<div>see [^2]</div>\n";
        let escaped = EscapedSource::new(src);
        let code_start = escaped.as_str().find("let").unwrap();
        let code_end = escaped.as_str().find(";\n").unwrap() + 2;
        let code = &escaped.as_str()[code_start..code_end];
        assert_eq!(code, "let x = arr\\[^1];\n");
        assert_eq!(escaped.unescape(code_start..code_end, code), "let x = arr[^1];\n");

        let html_start = escaped.as_str().find("<div>").unwrap();
        let html = &escaped.as_str()[html_start..];
        let len = escaped.as_str().len();
        assert_eq!(escaped.unescape(html_start..len, html), "<div>see [^2]</div>\n");

        // Text that no longer matches its range still loses exactly the inserted backslash.
        assert_eq!(escaped.unescape(code_start..code_end, "arr\\[^1]"), "arr[^1]");
        assert!(matches!(escaped.unescape(0..6, "Intro."), Cow::Borrowed(_)));
    }

    #[test]
    fn leaves_text_without_markers_borrowed() {
        let escaped = EscapedSource::new("plain [link](https://x) [^note]");
        assert!(matches!(escaped.escaped, Cow::Borrowed(_)));
    }
}
