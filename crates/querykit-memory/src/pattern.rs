//! Wildcard patterns used by `LIKE`.

use regex::Regex;

/// Compiles a `LIKE` pattern into an anchored regex.
///
/// `*` matches any run of characters, `?` matches exactly one, and every
/// other character matches itself.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("(?s)^");
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    Regex::new(&source)
}
