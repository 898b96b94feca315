//! A tiny token scanner shared by datum-literal parsing and, via
//! [`scan_token`], by the argument grammar in `rowctl-core`.
//!
//! A token is either a bare word (runs until whitespace or one of the
//! caller-supplied terminator characters) or a double-quoted string with
//! JSON-style escapes (`\"`, `\\`, `\n`, `\t`, `\r`, `\uXXXX`).

use crate::error::DatumError;

/// Scan one token from the start of `s`, returning the decoded token text
/// and the remainder of `s` immediately following it (leading whitespace in
/// the remainder is not consumed).
pub fn scan_token(s: &str) -> Result<(String, &str), DatumError> {
    let trimmed = s.trim_start();
    if trimmed.starts_with('"') {
        scan_quoted(trimmed)
    } else {
        scan_bare(trimmed, &[])
    }
}

/// Scan one bare-or-quoted token, stopping the bare-word case at the first
/// occurrence of any character in `terminators` (in addition to whitespace).
pub fn scan_token_until<'a>(
    s: &'a str,
    terminators: &[char],
) -> Result<(String, &'a str), DatumError> {
    let trimmed = s.trim_start();
    if trimmed.starts_with('"') {
        scan_quoted(trimmed)
    } else {
        scan_bare(trimmed, terminators)
    }
}

fn scan_bare<'a>(s: &'a str, terminators: &[char]) -> Result<(String, &'a str), DatumError> {
    let end = s
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || terminators.contains(c))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    Ok((s[..end].to_string(), &s[end..]))
}

fn scan_quoted(s: &str) -> Result<(String, &str), DatumError> {
    debug_assert!(s.starts_with('"'));
    let mut chars = s.char_indices().skip(1);
    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &s[i + 1..])),
            '\\' => {
                let (_, esc) = chars.next().ok_or(DatumError::UnterminatedString)?;
                out.push(match esc {
                    '"' => '"',
                    '\\' => '\\',
                    '/' => '/',
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    'u' => {
                        let hex: String = (0..4)
                            .map(|_| chars.next().map(|(_, c)| c))
                            .collect::<Option<String>>()
                            .ok_or(DatumError::UnterminatedString)?;
                        let code = u32::from_str_radix(&hex, 16)
                            .map_err(|_| DatumError::BadEscape('u'))?;
                        char::from_u32(code).ok_or(DatumError::BadEscape('u'))?
                    }
                    other => return Err(DatumError::BadEscape(other)),
                });
            }
            other => out.push(other),
        }
    }
    Err(DatumError::UnterminatedString)
}

/// Split `s` on top-level occurrences of `sep`, skipping separators that
/// fall inside a double-quoted span. Used to split set/map literals on `,`
/// without breaking quoted string elements that happen to contain a comma.
pub fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c == sep && !in_quotes => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_token_stops_at_whitespace() {
        let (tok, rest) = scan_token("eth0 tag=10").unwrap();
        assert_eq!(tok, "eth0");
        assert_eq!(rest, " tag=10");
    }

    #[test]
    fn quoted_token_decodes_escapes() {
        let (tok, rest) = scan_token(r#""a\"b\n" trailing"#).unwrap();
        assert_eq!(tok, "a\"b\n");
        assert_eq!(rest, " trailing");
    }

    #[test]
    fn unterminated_string_errors() {
        assert!(matches!(
            scan_token("\"oops"),
            Err(DatumError::UnterminatedString)
        ));
    }

    #[test]
    fn split_top_level_respects_quotes() {
        let parts = split_top_level(r#"a,"b,c",d"#, ',');
        assert_eq!(parts, vec!["a", "\"b,c\"", "d"]);
    }

    #[test]
    fn scan_token_until_stops_at_terminator() {
        let (tok, rest) = scan_token_until("col:key=val", &[':', '=']).unwrap();
        assert_eq!(tok, "col");
        assert_eq!(rest, ":key=val");
    }
}
