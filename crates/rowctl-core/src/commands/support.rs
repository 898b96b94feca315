//! Helpers shared by the verb implementations in this module: table/row
//! lookup against `CtlContext`, pre-pass column declaration, and `@symbol`
//! substitution inside datum literals.

use rowctl_idl::Row;

use crate::context::CtlContext;
use crate::error::CtlError;
use crate::names;
use crate::schema::CtlTableClass;
use crate::symtab::SymbolTable;

/// Spellings the pseudo-column that prints a row's UUID is recognized
/// under (spec.md §4.F's `get`).
pub fn is_uuid_pseudo_column(token: &str) -> bool {
    token == "_uuid" || token == "-uuid"
}

/// Resolve `name` against the embedder's declared table classes using the
/// same fuzzy matcher as columns (spec.md §4.A: "reused for both table
/// names ... and column names").
pub fn require_table<'a>(ctx: &CtlContext<'a>, name: &str) -> Result<CtlTableClass, CtlError> {
    let table_names: Vec<&str> = ctx.tables.iter().map(|t| t.name()).collect();
    let matched = names::best_match(table_names.iter().copied(), name).map_err(|amb| {
        CtlError::schema(format!(
            "more than one table's name matches \"{}\"",
            amb.query
        ))
    })?;
    let matched = matched.ok_or_else(|| CtlError::schema(format!("no table named {name}")))?;
    Ok(ctx
        .table(matched)
        .cloned()
        .expect("best_match picked a real table"))
}

pub fn resolve_row(
    ctx: &mut CtlContext,
    table: &CtlTableClass,
    record: &str,
    must_exist: bool,
) -> Result<Option<Row>, CtlError> {
    crate::resolver::get_row(ctx.idl, ctx.txn, table, record, must_exist)
}

/// Parse one `COLUMN[:KEY] OP VALUE` condition argument and evaluate it
/// against `row`'s current datum for that column (spec.md §4.E). Shared by
/// `find`'s AND'd condition list and `wait-until`'s condition list.
pub fn eval_condition(
    ctx: &mut CtlContext,
    table: &CtlTableClass,
    row: &Row,
    cond: &str,
    op_tokens: &[&str],
) -> Result<bool, CtlError> {
    let parsed = crate::arg::parse_column_key_value(cond, &table.class, op_tokens, true)?;
    let op = crate::eval::Op::from_index(op_tokens, parsed.op_index.expect("want_value=true"))
        .expect("op_index always resolves to a known Op");
    if parsed.key.is_some() && !parsed.column.ty.is_map() {
        return Err(CtlError::type_error(format!(
            "cannot specify key to {} for non-map column",
            parsed.column.name
        )));
    }
    let literal_ty = crate::eval::literal_type(&parsed.column.ty, parsed.key.is_some());
    let literal = crate::eval::parse_literal(parsed.value.as_deref().unwrap_or(""), &literal_ty)?;
    let key_atom = match &parsed.key {
        Some(k) => Some(rowctl_datum::Atom::parse(k, parsed.column.ty.key_type)?),
        None => None,
    };
    let datum = ctx.idl.read(ctx.txn, row, &parsed.column.name)?;
    Ok(crate::eval::eval(op, &datum, key_atom.as_ref(), &literal))
}

/// Declare the columns a row-id path traverses: the referrer's
/// `name_column`/`uuid_column`, so `get_row` can read them during the
/// execution pass (spec.md invariant 5).
pub fn declare_resolution_columns(ctx: &mut CtlContext, table: &CtlTableClass) -> Result<(), CtlError> {
    for rid in &table.row_ids {
        if let Some(name_col) = &rid.name_column {
            ctx.idl.declare_column(&rid.table, name_col)?;
        }
        if let Some(uuid_col) = &rid.uuid_column {
            ctx.idl.declare_column(&rid.table, uuid_col)?;
        }
    }
    Ok(())
}

pub fn declare_all_columns(ctx: &mut CtlContext, table: &CtlTableClass) -> Result<(), CtlError> {
    for col in &table.class.columns {
        ctx.idl.declare_column(table.name(), &col.name)?;
    }
    Ok(())
}

/// Replace every top-level `@name` token inside a datum literal with its
/// resolved UUID text, marking the symbol as strongly referenced. Leaves
/// non-symbol tokens untouched. This is the value-position half of
/// spec.md §4.D's forward-referenced row identities: `Datum::parse` never
/// needs to know symbols exist.
pub fn substitute_symbols(literal: &str, symtab: &mut SymbolTable) -> Result<String, CtlError> {
    let trimmed = literal.trim();
    let wrap = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some(o @ '['), Some(c @ ']')) if trimmed.len() >= 2 => Some((o, c)),
        (Some(o @ '{'), Some(c @ '}')) if trimmed.len() >= 2 => Some((o, c)),
        _ => None,
    };
    let inner = if wrap.is_some() {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let parts: Vec<String> = rowctl_datum::lexer::split_top_level(inner, ',')
        .into_iter()
        .map(|part| substitute_part(&part, symtab))
        .collect::<Result<_, _>>()?;
    let joined = parts.join(",");
    Ok(match wrap {
        Some((o, c)) => format!("{o}{joined}{c}"),
        None => joined,
    })
}

fn substitute_part(part: &str, symtab: &mut SymbolTable) -> Result<String, CtlError> {
    let part = part.trim();
    if part.is_empty() {
        return Ok(String::new());
    }
    match part.find('=') {
        Some(eq) => {
            let (key, value) = (&part[..eq], part[eq + 1..].trim());
            Ok(format!("{key}={}", substitute_token(value, symtab)?))
        }
        None => substitute_token(part, symtab),
    }
}

fn substitute_token(token: &str, symtab: &mut SymbolTable) -> Result<String, CtlError> {
    if let Some(name) = token.strip_prefix('@') {
        let full = format!("@{name}");
        let sym = symtab
            .lookup(&full)
            .ok_or_else(|| CtlError::resolution(format!("unknown symbol \"{full}\"")))?;
        let uuid = sym.uuid;
        symtab.mark_strong_ref(&full);
        Ok(uuid.to_string())
    } else {
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn substitutes_bare_symbol() {
        let mut symtab = SymbolTable::new();
        let uuid = Uuid::new_v4();
        symtab.create_symbol("@p", uuid).unwrap();
        let out = substitute_symbols("@p", &mut symtab).unwrap();
        assert_eq!(out, uuid.to_string());
    }

    #[test]
    fn substitutes_symbol_inside_set_literal() {
        let mut symtab = SymbolTable::new();
        let uuid = Uuid::new_v4();
        symtab.create_symbol("@p", uuid).unwrap();
        let out = substitute_symbols("[@p]", &mut symtab).unwrap();
        assert_eq!(out, format!("[{uuid}]"));
    }

    #[test]
    fn substitutes_symbol_as_map_value() {
        let mut symtab = SymbolTable::new();
        let uuid = Uuid::new_v4();
        symtab.create_symbol("@p", uuid).unwrap();
        let out = substitute_symbols("color=@p", &mut symtab).unwrap();
        assert_eq!(out, format!("color={uuid}"));
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let mut symtab = SymbolTable::new();
        assert!(substitute_symbols("@nope", &mut symtab).is_err());
    }
}
