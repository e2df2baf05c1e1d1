//! Name handling for qualified paths.
//!
//! KerML names are either *basic* names (identifier-like) or *unrestricted*
//! names written between single quotes (`'my part'`). Qualified names join
//! segments with `::`, quoting every segment that is not a basic name.

use std::borrow::Cow;

use smol_str::SmolStr;

/// Path separator used in qualified names.
pub const SEPARATOR: &str = "::";

/// Check whether a name can be written without quotes.
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
pub fn is_basic_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}

/// Render a single name segment, quoting it if it is not a basic name.
///
/// ```
/// use syster_model::base::quote_segment;
///
/// assert_eq!(quote_segment("Vehicle"), "Vehicle");
/// assert_eq!(quote_segment("front wheel"), "'front wheel'");
/// ```
pub fn quote_segment(name: &str) -> Cow<'_, str> {
    if is_basic_name(name) {
        return Cow::Borrowed(name);
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('\'');
    for c in name.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}

/// Join name segments into a qualified name, quoting where needed.
pub fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(&quote_segment(segment));
    }
    out
}

/// Split a qualified path into unquoted segments.
///
/// Separators inside quoted names are not split on. Wildcard segments
/// (`*`, `**`) are returned verbatim. Returns `None` for malformed input:
/// an empty path, an empty segment, or an unterminated quote.
///
/// ```
/// use syster_model::base::split_qualified;
///
/// let parts = split_qualified("Base::'my things'::x").unwrap();
/// assert_eq!(parts, ["Base", "my things", "x"]);
/// ```
pub fn split_qualified(path: &str) -> Option<Vec<SmolStr>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.trim().chars().peekable();
    let mut quoted = false;
    let mut was_quoted = false;

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '\\' => current.push(chars.next()?),
                '\'' => quoted = false,
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '\'' if current.is_empty() && !was_quoted => {
                quoted = true;
                was_quoted = true;
            }
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                if current.is_empty() && !was_quoted {
                    return None;
                }
                segments.push(finish_segment(&current, was_quoted));
                current.clear();
                was_quoted = false;
            }
            _ => current.push(c),
        }
    }

    if quoted || (current.trim().is_empty() && !was_quoted) {
        return None;
    }
    segments.push(finish_segment(&current, was_quoted));
    Some(segments)
}

fn finish_segment(raw: &str, quoted: bool) -> SmolStr {
    if quoted {
        SmolStr::from(raw)
    } else {
        SmolStr::from(raw.trim())
    }
}
