//! Parsed commands.

use std::cell::Cell;
use std::rc::Rc;

use vim_value::{argument_required, no_bang_allowed, no_range_allowed, trailing_characters};
use vim_value::{invalid_range, unknown_command, EvalError};

use crate::parse::parse_command_line;
use crate::range::RangeSpec;
use crate::table::{self, ArgumentRule, CommandDef, CommandFlags, RangeRule};

/// One command line, looked up and checked against its definition.
///
/// Immutable once built, apart from `last_register`, which `:@@`
/// remembers across repeated runs of the same instance.
#[derive(Debug)]
pub struct Command {
    pub def: &'static CommandDef,
    /// Full built-in name, or the alias name for user commands.
    pub name: Rc<str>,
    pub range: Option<RangeSpec>,
    pub bang: bool,
    pub argument: Rc<str>,
    /// The line as typed, for history.
    pub text: Rc<str>,
    pub last_register: Cell<Option<char>>,
}

impl Command {
    /// Parse `text` and check its range, argument and bang against the
    /// command table. `is_alias` reports whether a capitalised name is a
    /// defined user command.
    ///
    /// Returns `None` for blank lines and comments.
    pub fn parse(text: &str, is_alias: impl Fn(&str) -> bool) -> Result<Option<Command>, EvalError> {
        let parsed = parse_command_line(text)?;
        if parsed.is_empty() {
            return Ok(None);
        }

        let (def, name): (&'static CommandDef, Rc<str>) = if parsed.name.is_empty() {
            (&table::GOTO_LINE, Rc::from(""))
        } else if parsed.name.starts_with(|c: char| c.is_ascii_uppercase()) {
            if !is_alias(&parsed.name) {
                return Err(unknown_command(&parsed.name));
            }
            (&table::USER_COMMAND, Rc::from(parsed.name.as_str()))
        } else {
            let def = table::lookup(&parsed.name).ok_or_else(|| unknown_command(&parsed.name))?;
            (def, Rc::from(def.name))
        };

        let command = Command {
            def,
            name,
            range: parsed.range,
            bang: parsed.bang,
            argument: Rc::from(parsed.argument.as_str()),
            text: Rc::from(text.trim()),
            last_register: Cell::new(None),
        };
        command.validate()?;
        Ok(Some(command))
    }

    /// Range, argument and bang rules. Runs before any side effect.
    fn validate(&self) -> Result<(), EvalError> {
        match (self.def.range, &self.range) {
            (RangeRule::Forbidden, Some(_)) => return Err(no_range_allowed()),
            (RangeRule::Required, None) => return Err(invalid_range()),
            _ => {}
        }
        match self.def.argument {
            ArgumentRule::Forbidden if !self.argument.is_empty() => {
                return Err(trailing_characters(&self.argument));
            }
            ArgumentRule::Required if self.argument.is_empty() => {
                return Err(argument_required());
            }
            _ => {}
        }
        if self.bang && !self.def.flags.contains(CommandFlags::BANG) {
            return Err(no_bang_allowed());
        }
        Ok(())
    }

    pub fn has_flag(&self, flag: CommandFlags) -> bool {
        self.def.flags.contains(flag)
    }
}
