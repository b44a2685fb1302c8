//! Splitting an Ex command line into range, name, bang and argument.

use vim_value::EvalError;

use crate::range::{parse_range, RangeSpec};

/// One command line, before the name is looked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub range: Option<RangeSpec>,
    /// As typed, possibly abbreviated. Empty for a bare range (`:5`).
    pub name: String,
    pub bang: bool,
    /// Text after the name (and bang), leading blanks removed.
    pub argument: String,
}

impl ParsedCommand {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.range.is_none()
    }
}

/// Parse one command line. Blank lines and `"` comments give a command
/// with no name and no range.
pub fn parse_command_line(text: &str) -> Result<ParsedCommand, EvalError> {
    let text = text.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    if text.starts_with('"') {
        return Ok(empty());
    }
    let (range, rest) = parse_range(text)?;
    let rest = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());

    let name_len = command_name_len(rest);
    let (name, rest) = rest.split_at(name_len);

    // `!!` is the filter command repeated; the second `!` is its bang.
    let (bang, rest) = match rest.strip_prefix('!') {
        Some(after) if name != "@" => (true, after),
        _ => (false, rest),
    };

    Ok(ParsedCommand {
        range,
        name: name.to_owned(),
        bang,
        argument: rest.trim_start().to_owned(),
    })
}

fn empty() -> ParsedCommand {
    ParsedCommand {
        range: None,
        name: String::new(),
        bang: false,
        argument: String::new(),
    }
}

/// Length of the command name at the start of `text`: a run of letters,
/// a single `!` or `@`, or a user command (capitalised, may hold digits).
fn command_name_len(text: &str) -> usize {
    let Some(first) = text.chars().next() else {
        return 0;
    };
    match first {
        '!' | '@' => 1,
        c if c.is_ascii_uppercase() => text
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(text.len()),
        c if c.is_ascii_alphabetic() => text
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(text.len()),
        _ => 0,
    }
}
