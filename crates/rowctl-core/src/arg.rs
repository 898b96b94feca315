//! `COLUMN[:KEY][OP VALUE]` argument grammar (spec.md §4.B).

use rowctl_datum::lexer;
use rowctl_idl::{Column, TableClass};

use crate::error::CtlError;
use crate::names;

/// The parsed shape of one argument, before the value has been parsed
/// against the column's type (that's the evaluator's job, component E).
#[derive(Debug, Clone)]
pub struct ParsedArg<'a> {
    pub column: &'a Column,
    pub key: Option<String>,
    pub op_index: Option<usize>,
    pub value: Option<String>,
}

/// Default operator set when the caller wants a value but didn't specify
/// one: `["="]` (spec.md §4.B).
pub const DEFAULT_OPS: &[&str] = &["="];

/// Parse one `COLUMN[:KEY][OP VALUE]` argument against `table`'s columns.
///
/// `allowed_ops` is scanned for the *longest* match that is followed by at
/// least one character of `VALUE`, per spec.md §4.B. `want_value` controls
/// whether an operator (and therefore a value) is required at all.
pub fn parse_column_key_value<'a>(
    arg: &str,
    table: &'a TableClass,
    allowed_ops: &[&str],
    want_value: bool,
) -> Result<ParsedArg<'a>, CtlError> {
    let allowed_ops = if want_value && allowed_ops.is_empty() {
        DEFAULT_OPS
    } else {
        allowed_ops
    };
    // Column and key names are identifiers; they never contain the
    // characters that can start a key separator or a relational/set
    // operator, so a fixed terminator set bounds both scans regardless of
    // which operators this particular argument allows.
    const STRUCTURAL: &[char] = &[':', '=', '<', '>', '!', '{', '}'];

    let (column_tok, rest) = lexer::scan_token_until(arg, STRUCTURAL).map_err(|e| {
        CtlError::usage(format!("invalid column name in \"{arg}\": {e}"))
    })?;

    let column_names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    let matched = names::best_match(column_names.iter().copied(), &column_tok).map_err(|amb| {
        CtlError::schema(format!(
            "{} contains more than one column whose name matches \"{}\"",
            table.name, amb.query
        ))
    })?;
    let column_name = matched.ok_or_else(|| {
        CtlError::schema(format!(
            "{} does not contain a column whose name matches \"{}\"",
            table.name, column_tok
        ))
    })?;
    let column = table.column(column_name).expect("best_match picked a real column");

    let mut rest = rest;
    let key = if let Some(stripped) = rest.strip_prefix(':') {
        let (key_tok, after_key) = lexer::scan_token_until(stripped, STRUCTURAL)
            .map_err(|e| CtlError::usage(format!("invalid key in \"{arg}\": {e}")))?;
        rest = after_key;
        Some(key_tok)
    } else {
        None
    };

    if !want_value {
        if !rest.trim().is_empty() {
            return Err(CtlError::usage(format!(
                "trailing garbage in argument \"{arg}\""
            )));
        }
        return Ok(ParsedArg {
            column,
            key,
            op_index: None,
            value: None,
        });
    }

    let (op_index, value) = scan_longest_op(rest, allowed_ops).ok_or_else(|| {
        let quoted: Vec<String> = allowed_ops.iter().map(|o| format!("\"{o}\"")).collect();
        CtlError::usage(format!(
            "argument \"{arg}\" does not end in {} or one of those followed by a value",
            quoted.join(", ")
        ))
    })?;

    Ok(ParsedArg {
        column,
        key,
        op_index: Some(op_index),
        value: Some(value.to_string()),
    })
}

/// Find the longest operator in `allowed_ops` that `rest` *begins with* and
/// that has at least one trailing character, returning its index into
/// `allowed_ops` and the remainder text (the `VALUE`). Anchored at offset 0
/// rather than searched anywhere in `rest`, so an operator-looking
/// substring inside the `VALUE` itself (e.g. a literal containing `{<=}`)
/// can never be mistaken for the condition's own operator.
fn scan_longest_op<'a>(rest: &'a str, allowed_ops: &[&str]) -> Option<(usize, &'a str)> {
    let mut best: Option<(usize, usize, &'a str)> = None; // (op_len, op_index, value)
    for (idx, op) in allowed_ops.iter().enumerate() {
        if !rest.starts_with(op) {
            continue;
        }
        let value_start = op.len();
        if value_start >= rest.len() {
            continue; // must be followed by at least one character
        }
        let op_len = op.len();
        let is_better = match best {
            None => true,
            Some((best_len, _, _)) => op_len > best_len,
        };
        if is_better {
            best = Some((op_len, idx, &rest[value_start..]));
        }
    }
    best.map(|(_, idx, value)| (idx, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowctl_datum::{AtomicType, ColumnType};

    fn port_table() -> TableClass {
        TableClass::new(
            "Port",
            vec![
                Column::new("external_ids", ColumnType::map(AtomicType::String, AtomicType::String, 0, rowctl_datum::UNBOUNDED)),
                Column::new("external_mac", ColumnType::optional_scalar(AtomicType::String)),
                Column::new("tag", ColumnType::optional_scalar(AtomicType::Integer)),
            ],
            false,
        )
    }

    #[test]
    fn parses_column_key_op_value() {
        let table = port_table();
        let parsed = parse_column_key_value("external_ids:color=red", &table, &["="], true).unwrap();
        assert_eq!(parsed.column.name, "external_ids");
        assert_eq!(parsed.key.as_deref(), Some("color"));
        assert_eq!(parsed.value.as_deref(), Some("red"));
    }

    #[test]
    fn ambiguous_prefix_is_an_error() {
        let table = port_table();
        let err = parse_column_key_value("external", &table, &[], false).unwrap_err();
        assert!(matches!(err, CtlError::Schema(_)));
    }

    #[test]
    fn missing_value_is_usage_error() {
        let table = port_table();
        let err = parse_column_key_value("tag", &table, &["="], true).unwrap_err();
        assert!(matches!(err, CtlError::Usage(_)));
    }

    #[test]
    fn trailing_garbage_without_value_wanted_errors() {
        let table = port_table();
        let err = parse_column_key_value("tag=10", &table, &[], false).unwrap_err();
        assert!(matches!(err, CtlError::Usage(_)));
    }

    #[test]
    fn longest_operator_wins() {
        let table = port_table();
        let parsed =
            parse_column_key_value("tag<=10", &table, &["<", "<="], true).unwrap();
        assert_eq!(parsed.value.as_deref(), Some("10"));
    }
}
