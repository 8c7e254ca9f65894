//! Identifier helpers shared by slot allocation and artifact naming.

/// Words the target script treats specially; never usable as a bare identifier.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
    "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
    "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
    "NaN", "Infinity",
];

/// Device names some file systems refuse regardless of extension.
const RESERVED_FILE_NAMES: &[&str] = &["con", "prn", "aux", "nul"];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

pub fn is_reserved_file_name(name: &str) -> bool {
    RESERVED_FILE_NAMES.contains(&name.to_ascii_lowercase().as_str())
}

/// Whether `name` can appear as a bare identifier or property name in the target script.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Short, lower-cased, identifier-safe rendering of a human name.
///
/// Only the last path segment is kept and a generic arity suffix (`` `2 ``) is
/// dropped. Returns `None` when nothing usable remains or the result is reserved.
///
/// ```
/// use strata_core::utils::friendly_identifier;
///
/// assert_eq!(friendly_identifier("System.Collections.List`1", 15), Some("list".into()));
/// assert_eq!(friendly_identifier("Int32 get_Length()", 15), Some("int32_get_lengt".into()));
/// ```
pub fn friendly_identifier(name: &str, max_len: usize) -> Option<String> {
    let segment = last_segment(name);
    let segment = match segment.find('`') {
        Some(tick) => &segment[..tick],
        None => segment,
    };

    let mapped: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = mapped.trim_start_matches(|c: char| c.is_ascii_digit() || c == '_');
    let truncated: String = trimmed.chars().take(max_len).collect();
    let truncated = truncated.trim_end_matches('_');

    if truncated.is_empty() || is_reserved_word(truncated) {
        return None;
    }
    Some(truncated.to_owned())
}

/// Last segment of a dotted/nested type path. Signatures (containing `(`) are kept whole.
fn last_segment(name: &str) -> &str {
    if name.contains('(') {
        return name;
    }
    name.rsplit(['.', '+', '/']).next().unwrap_or(name)
}

/// File stem for an assembly artifact: identifier-safe, never a reserved device name.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() || is_reserved_file_name(&stem) {
        return format!("_{stem}");
    }
    stem
}
