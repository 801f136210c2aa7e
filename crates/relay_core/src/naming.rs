//! Pure naming rules for downloaded images.
//!
//! The engine combines these with a directory check and a clock to produce
//! collision-free paths.

use url::Url;

const MAX_NAME_LEN: usize = 200;

/// Derives a file name from the last non-empty path segment of `url`.
///
/// Query and fragment are ignored, the segment is percent-decoded and
/// characters that are not allowed in file names become `_`. Returns `None`
/// when the URL does not parse or has no usable segment.
pub fn candidate_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let segment = parsed
        .path_segments()?
        .rfind(|segment| !segment.is_empty())?;
    let decoded = urlencoding::decode(segment)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let sanitized = sanitize(&decoded);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        None
    } else {
        Some(sanitized)
    }
}

/// Inserts `_{stamp}` before the text after the last `.` of `name`, or appends
/// it if there is no `.` at all. A dotfile such as `.hidden` becomes `_{stamp}.hidden`.
pub fn disambiguate(name: &str, stamp: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{stamp}.{ext}"),
        None => format!("{name}_{stamp}"),
    }
}

/// Cuts `text` to at most `max_chars` characters for log lines.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn sanitize(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    if cleaned.len() > MAX_NAME_LEN {
        let mut end = MAX_NAME_LEN;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' | '\0'..='\u{1F}'
    )
}
