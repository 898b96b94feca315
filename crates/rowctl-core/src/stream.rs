//! Component G: splits one process argv into a sequence of commands
//! separated by `--`, attaching per-command options (spec.md §4.G).

use std::collections::HashMap;

use crate::command::Command;
use crate::error::CtlError;

/// One `{ options, verb, args }` segment of a command stream, resolved
/// against the registered verb but not yet executed.
#[derive(Debug, Clone)]
pub struct ParsedCommand {
    pub command_name: String,
    pub options: HashMap<String, Option<String>>,
    pub argv: Vec<String>,
}

/// Split `tokens` on `--` into commands, validate each against `commands`,
/// and merge `local_options` into the first command's option map (spec.md
/// §4.G: "Local (stream-wide) options arrive via `local_options`").
pub fn parse_stream(
    tokens: &[String],
    local_options: HashMap<String, Option<String>>,
    commands: &[Command],
) -> Result<Vec<ParsedCommand>, CtlError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    let segments = split_on_separator(tokens);
    let mut parsed = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        let mut cmd = parse_segment(segment, commands)?;
        if index == 0 {
            for (name, value) in &local_options {
                if cmd.options.contains_key(name) {
                    return Err(CtlError::usage(format!(
                        "duplicate option \"--{name}\" on the first command of the stream"
                    )));
                }
                cmd.options.insert(name.clone(), value.clone());
            }
        }
        parsed.push(cmd);
    }
    Ok(parsed)
}

fn split_on_separator(tokens: &[String]) -> Vec<&[String]> {
    tokens.split(|t| t == "--").collect()
}

fn parse_segment(segment: &[String], commands: &[Command]) -> Result<ParsedCommand, CtlError> {
    if segment.is_empty() {
        return Err(CtlError::usage(
            "empty command between \"--\" separators",
        ));
    }

    let mut index = 0;
    let mut options: HashMap<String, Option<String>> = HashMap::new();
    while index < segment.len() && is_option_token(&segment[index]) {
        let (name, value) = split_option(&segment[index]);
        if options.contains_key(&name) {
            return Err(CtlError::usage(format!(
                "duplicate option \"--{name}\" for this command"
            )));
        }
        options.insert(name, value);
        index += 1;
    }

    if index >= segment.len() {
        return Err(CtlError::usage("command has options but no verb"));
    }
    let verb = &segment[index];
    let command = commands
        .iter()
        .find(|c| c.name == verb)
        .ok_or_else(|| CtlError::usage(format!("unknown command \"{verb}\"")))?;

    validate_options(&options, command)?;

    let argv: Vec<String> = segment[index + 1..].to_vec();
    check_arg_count(&argv, command)?;

    Ok(ParsedCommand {
        command_name: command.name.to_string(),
        options,
        argv,
    })
}

fn is_option_token(token: &str) -> bool {
    token.starts_with('-') && token != "-"
}

fn split_option(token: &str) -> (String, Option<String>) {
    let trimmed = token.trim_start_matches('-');
    match trimmed.find('=') {
        Some(eq) => (trimmed[..eq].to_string(), Some(trimmed[eq + 1..].to_string())),
        None => (trimmed.to_string(), None),
    }
}

/// Whether `spec` (comma-delimited `--name` / `--name=` entries) declares
/// `name`, and if so whether it takes a value. Implemented as a substring
/// search accepting the terminators `=`, `,`, ` `, end-of-string — the
/// exact legacy behavior spec.md §9 calls out for preservation, not a
/// parsed `HashSet<OptionDecl>`.
fn option_allows_value(spec: &str, name: &str) -> Option<bool> {
    let needle = format!("--{name}");
    let mut start = 0;
    while let Some(pos) = spec.get(start..).and_then(|s| s.find(&needle)) {
        let abs = start + pos;
        let after = abs + needle.len();
        match spec[after..].chars().next() {
            None => return Some(false),
            Some('=') => return Some(true),
            Some(',') | Some(' ') => return Some(false),
            _ => {
                start = abs + 1;
                continue;
            }
        }
    }
    None
}

fn validate_options(options: &HashMap<String, Option<String>>, command: &Command) -> Result<(), CtlError> {
    for (name, value) in options {
        match option_allows_value(command.options_spec, name) {
            None => {
                return Err(CtlError::usage(format!(
                    "{} does not accept the option \"--{name}\"",
                    command.name
                )))
            }
            Some(true) if value.is_none() => {
                return Err(CtlError::usage(format!(
                    "option \"--{name}\" for {} requires a value",
                    command.name
                )))
            }
            Some(false) if value.is_some() => {
                return Err(CtlError::usage(format!(
                    "option \"--{name}\" for {} does not take a value",
                    command.name
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_arg_count(argv: &[String], command: &Command) -> Result<(), CtlError> {
    if argv.len() < command.min_args {
        return Err(CtlError::usage(format!(
            "\"{}\" requires at least {} argument(s): {}",
            command.name, command.min_args, command.syntax_text
        )));
    }
    if argv.len() > command.max_args {
        let looks_like_stray_option = argv
            .get(command.max_args)
            .map(|a| a.starts_with('-'))
            .unwrap_or(false);
        let hint = if looks_like_stray_option {
            " (options must precede the verb, not follow it)"
        } else {
            ""
        };
        return Err(CtlError::usage(format!(
            "\"{}\" accepts at most {} argument(s){hint}: {}",
            command.name, command.max_args, command.syntax_text
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{noop, Mode, UNBOUNDED_ARGS};

    fn demo_commands() -> Vec<Command> {
        vec![
            Command {
                name: "create",
                min_args: 1,
                max_args: UNBOUNDED_ARGS,
                syntax_text: "create TABLE COLUMN=VALUE...",
                options_spec: "--id=",
                mode: Mode::Rw,
                pre: noop,
                run: noop,
                post: None,
            },
            Command {
                name: "get",
                min_args: 2,
                max_args: UNBOUNDED_ARGS,
                syntax_text: "get TABLE RECORD [COLUMN]...",
                options_spec: "--if-exists,--id=",
                mode: Mode::Ro,
                pre: noop,
                run: noop,
                post: None,
            },
        ]
    }

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn splits_on_double_dash_and_resolves_verbs() {
        let stream = toks("--id=@p create Port name=eth0 -- create Bridge name=br0 ports=@p");
        let parsed = parse_stream(&stream, HashMap::new(), &demo_commands()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].command_name, "create");
        assert_eq!(parsed[0].options.get("id").unwrap().as_deref(), Some("@p"));
        assert_eq!(parsed[0].argv, vec!["Port", "name=eth0"]);
        assert_eq!(parsed[1].argv, vec!["Bridge", "name=br0", "ports=@p"]);
    }

    #[test]
    fn unknown_verb_is_an_error() {
        let stream = toks("frobnicate Port eth0");
        assert!(parse_stream(&stream, HashMap::new(), &demo_commands()).is_err());
    }

    #[test]
    fn duplicate_option_is_fatal() {
        let stream = toks("--id=@a --id=@b create Port name=eth0");
        assert!(parse_stream(&stream, HashMap::new(), &demo_commands()).is_err());
    }

    #[test]
    fn unsupported_option_is_fatal() {
        let stream = toks("--bogus create Port name=eth0");
        assert!(parse_stream(&stream, HashMap::new(), &demo_commands()).is_err());
    }

    #[test]
    fn too_few_args_is_fatal() {
        let stream = toks("get Port");
        assert!(parse_stream(&stream, HashMap::new(), &demo_commands()).is_err());
    }

    #[test]
    fn local_options_merge_into_first_command_only() {
        let stream = toks("create Port name=eth0 -- create Bridge name=br0");
        let mut local = HashMap::new();
        local.insert("id".to_string(), Some("@p".to_string()));
        let parsed = parse_stream(&stream, local, &demo_commands()).unwrap();
        assert_eq!(parsed[0].options.get("id").unwrap().as_deref(), Some("@p"));
        assert!(parsed[1].options.is_empty());
    }

    #[test]
    fn flag_option_rejects_an_attached_value() {
        let stream = toks("--if-exists=true get Port eth0");
        assert!(parse_stream(&stream, HashMap::new(), &demo_commands()).is_err());
    }
}
