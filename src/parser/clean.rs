//! Comment text normalization shared by all doc-carrying declarations.

/// Strip comment delimiters, continuation markers and surrounding whitespace.
///
/// `"// Y coordinate"` → `"Y coordinate"`, `" * @since 4.1"` → `"@since 4.1"`,
/// `"/**"` and `"*/"` → `""`.
pub fn clean_line(line: &str) -> String {
    let mut s = line.trim();
    if let Some(rest) = s.strip_prefix("//") {
        s = rest.trim_start_matches('/');
    }
    if let Some(rest) = s.strip_prefix("/*") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("*/") {
        s = rest;
    }
    s.trim().trim_start_matches('*').trim().to_string()
}

/// Clean every line, collapse runs of blank lines into one and drop leading
/// and trailing blanks.
pub fn clean_description<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let cleaned = clean_line(line.as_ref());
        if cleaned.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(cleaned);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out
}
