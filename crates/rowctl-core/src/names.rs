//! Fuzzy, prefix-insensitive, case-insensitive one-to-one name matching
//! (spec.md §4.A).

/// Score `query` against `candidate`: `u32::MAX` on an exact (normalized)
/// match, `u32::MAX - 1` if `query` is a proper normalized prefix of
/// `candidate`, otherwise the number of matching leading characters, or
/// `0` if `query` is not a normalized prefix of `candidate` at all.
///
/// Normalization: lowercase, and `-`/`_` are equivalent separators — both
/// are dropped entirely, so `"foo_bar"`, `"foo-bar"` and `"FooBar"` all
/// normalize to the same key.
pub fn score(candidate: &str, query: &str) -> u32 {
    let norm = |s: &str| -> String {
        s.chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect()
    };
    let candidate = norm(candidate);
    let query = norm(query);

    if candidate == query {
        return u32::MAX;
    }
    if !candidate.starts_with(&query) {
        return 0;
    }
    if query.len() < candidate.len() {
        return u32::MAX - 1;
    }
    query.len() as u32
}

/// An ambiguous match: two or more candidates tied at the (non-zero)
/// global maximum score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguous {
    pub query: String,
    pub candidates: Vec<String>,
}

/// Select the strictly-maximum scorer across `candidates` for `query`.
/// Returns `Ok(None)` if every candidate scores zero, `Ok(Some(name))` on a
/// unique maximum, `Err(Ambiguous)` if two or more candidates tie at the
/// non-zero maximum (spec.md §8 law 1: "never silently pick").
pub fn best_match<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    query: &str,
) -> Result<Option<&'a str>, Ambiguous> {
    let mut best: Option<(u32, &'a str)> = None;
    let mut ties: Vec<&'a str> = Vec::new();

    for candidate in candidates {
        let s = score(candidate, query);
        if s == 0 {
            continue;
        }
        match best {
            None => {
                best = Some((s, candidate));
                ties = vec![candidate];
            }
            Some((bs, _)) if s > bs => {
                best = Some((s, candidate));
                ties = vec![candidate];
            }
            Some((bs, _)) if s == bs => {
                ties.push(candidate);
            }
            _ => {}
        }
    }

    match best {
        None => Ok(None),
        Some((_, winner)) if ties.len() == 1 => Ok(Some(winner)),
        Some(_) => Err(Ambiguous {
            query: query.to_string(),
            candidates: ties.into_iter().map(str::to_string).collect(),
        }),
    }
}
