//! Bash-completion line format (spec.md §6): `[--opt]… ,name, <annotated-args>`.

use crate::interpreter::Interpreter;

/// One line per registered command, in registration order, each of form
/// `[--opt]… ,name, <annotated-args>` (spec.md §6).
pub fn print_completions(interpreter: &Interpreter) -> String {
    let mut out = String::new();
    for command in interpreter.commands() {
        out.push_str(&completion_line(command.name, command.options_spec, command.syntax_text));
        out.push('\n');
    }
    out
}

fn completion_line(name: &str, options_spec: &str, syntax_text: &str) -> String {
    let options = options_spec
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|opt| format!("[{opt}]"))
        .collect::<Vec<_>>()
        .join(" ");

    let args = syntax_text
        .split_whitespace()
        .skip(1) // first token is the verb itself, already in the ",name," slot
        .map(annotate)
        .collect::<Vec<_>>()
        .join(" ");

    if options.is_empty() {
        format!(",{name}, {args}")
    } else {
        format!("{options} ,{name}, {args}")
    }
}

/// Annotate one `syntax_text` argument token with its leading sigil,
/// derived by reverse-scanning for a trailing `...` (one-or-more /
/// zero-or-more) and an outermost `[ ]` wrap (optional), per spec.md §6.
fn annotate(token: &str) -> String {
    let (body, repeated) = match token.strip_suffix("...") {
        Some(stripped) => (stripped, true),
        None => (token, false),
    };

    let (display, optional) = if is_fully_bracketed(body) {
        (&body[1..body.len() - 1], true)
    } else {
        (body, false)
    };

    let sigil = match (optional, repeated) {
        (true, true) => '*',
        (false, true) => '+',
        (true, false) => '?',
        (false, false) => '!',
    };
    format!("{sigil}{display}")
}

/// Whether `s` is wrapped in one matching outermost pair of `[` `]` — i.e.
/// the bracket opened at index 0 is also the one that closes at the last
/// index, not an earlier sibling pair.
fn is_fully_bracketed(s: &str) -> bool {
    if !(s.starts_with('[') && s.ends_with(']')) || s.len() < 2 {
        return false;
    }
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return i == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_token_gets_bang() {
        assert_eq!(annotate("TABLE"), "!TABLE");
    }

    #[test]
    fn optional_token_gets_question_mark() {
        assert_eq!(annotate("[RECORD]"), "?RECORD");
    }

    #[test]
    fn repeated_required_token_gets_plus() {
        assert_eq!(annotate("VALUE..."), "+VALUE");
    }

    #[test]
    fn repeated_optional_token_gets_star() {
        assert_eq!(annotate("[COLUMN[:KEY]]..."), "*COLUMN[:KEY]");
    }

    #[test]
    fn line_includes_options_and_verb_slot() {
        let line = completion_line("get", "--if-exists,--id=", "get TABLE RECORD [COLUMN[:KEY]]...");
        assert_eq!(line, "[--if-exists] [--id=] ,get, !TABLE !RECORD *COLUMN[:KEY]");
    }

    #[test]
    fn line_with_no_options_omits_the_bracket_group() {
        let line = completion_line("show", "", "show");
        assert_eq!(line, ",show, ");
    }
}
