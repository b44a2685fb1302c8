//! The command table: each command's range and argument rules, buffer
//! access, flags and handler.
//!
//! Names resolve by unique-prefix abbreviation with a per-command
//! minimum, the way `:d` means `:delete` and `:ec` means `:echo`. The
//! table is ordered so that the first match wins where Vim gives one
//! command priority over another (`:j` is `:join`, not `:jumps`).

use bitflags::bitflags;

use crate::commands::{self, Handler};

/// What the command accepts in front of its name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RangeRule {
    Required,
    Optional,
    Forbidden,
    /// The range is a count (`:3sleep`); missing means 1.
    IsCount,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgumentRule {
    Required,
    Optional,
    Forbidden,
}

/// How the command touches the buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WritesBuffer,
    /// The handler decides (`:global` runs other commands).
    SelfManaged,
}

/// Whether the handler runs once or once per caret.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Single,
    PerCursor,
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct CommandFlags: u8 {
        /// Never recorded in command-line history.
        const SKIP_HISTORY = 1 << 0;
        /// Runs without leaving Visual mode first.
        const KEEP_VISUAL = 1 << 1;
        /// Accepts `!` after the name.
        const BANG = 1 << 2;
        /// Line 0 is a valid address (`:0put`).
        const ZERO_LINE = 1 << 3;
    }
}

pub struct CommandDef {
    pub name: &'static str,
    /// Shortest accepted abbreviation.
    pub min_len: usize,
    pub range: RangeRule,
    pub argument: ArgumentRule,
    pub access: Access,
    pub strategy: ExecutionStrategy,
    pub flags: CommandFlags,
    pub handler: Handler,
}

impl std::fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDef")
            .field("name", &self.name)
            .field("range", &self.range)
            .field("argument", &self.argument)
            .field("access", &self.access)
            .field("strategy", &self.strategy)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[expect(clippy::too_many_arguments, reason = "one argument per table column")]
const fn def(
    name: &'static str,
    min_len: usize,
    range: RangeRule,
    argument: ArgumentRule,
    access: Access,
    strategy: ExecutionStrategy,
    flags: CommandFlags,
    handler: Handler,
) -> CommandDef {
    CommandDef {
        name,
        min_len,
        range,
        argument,
        access,
        strategy,
        flags,
        handler,
    }
}

use Access::{ReadOnly, SelfManaged, WritesBuffer};
use ArgumentRule as Arg;
use ExecutionStrategy::{PerCursor, Single};
use RangeRule::{Forbidden, IsCount, Optional};

const NONE: CommandFlags = CommandFlags::empty();
const BANG: CommandFlags = CommandFlags::BANG;
const QUIET: CommandFlags = CommandFlags::KEEP_VISUAL;

/// Every built-in command, in lookup priority order.
#[rustfmt::skip]
pub static COMMANDS: &[CommandDef] = &[
    def("!", 1, Optional, Arg::Optional, SelfManaged, Single, BANG, commands::filter::bang),
    def("@", 1, Optional, Arg::Optional, SelfManaged, Single, QUIET, commands::session::at),
    def("call", 3, Forbidden, Arg::Required, SelfManaged, Single, NONE, commands::echo::call),
    def("command", 3, Forbidden, Arg::Optional, ReadOnly, Single, BANG, commands::alias::command),
    def("delete", 1, Optional, Arg::Optional, WritesBuffer, PerCursor, NONE, commands::edit::delete),
    def("delcommand", 4, Forbidden, Arg::Required, ReadOnly, Single, NONE, commands::alias::delcommand),
    def("echo", 2, Forbidden, Arg::Optional, ReadOnly, Single, QUIET, commands::echo::echo),
    def("echoerr", 5, Forbidden, Arg::Optional, ReadOnly, Single, QUIET, commands::echo::echoerr),
    def("echomsg", 5, Forbidden, Arg::Optional, ReadOnly, Single, QUIET, commands::echo::echo),
    def("execute", 3, Forbidden, Arg::Optional, SelfManaged, Single, NONE, commands::echo::execute),
    def("global", 1, Optional, Arg::Required, SelfManaged, Single, BANG, commands::global::global),
    def("goto", 2, IsCount, Arg::Optional, ReadOnly, PerCursor, NONE, commands::goto::goto_byte),
    def("history", 3, Forbidden, Arg::Optional, ReadOnly, Single, SKIP_QUIET, commands::session::history),
    def("join", 1, Optional, Arg::Optional, WritesBuffer, PerCursor, BANG, commands::edit::join),
    def("let", 3, Forbidden, Arg::Optional, ReadOnly, Single, NONE, commands::variables::let_),
    def("lockvar", 5, Forbidden, Arg::Required, ReadOnly, Single, BANG, commands::variables::lockvar),
    def("number", 2, Optional, Arg::Optional, ReadOnly, PerCursor, QUIET, commands::edit::print_numbered),
    def("print", 1, Optional, Arg::Optional, ReadOnly, PerCursor, QUIET, commands::edit::print),
    def("put", 2, Optional, Arg::Optional, WritesBuffer, PerCursor, BANG_ZERO, commands::edit::put),
    def("redraw", 4, Forbidden, Arg::Forbidden, ReadOnly, Single, BANG_QUIET, commands::session::redraw),
    def("registers", 3, Forbidden, Arg::Optional, ReadOnly, Single, QUIET, commands::session::registers),
    def("sleep", 2, IsCount, Arg::Optional, ReadOnly, Single, NONE, commands::session::sleep),
    def("unlet", 3, Forbidden, Arg::Required, ReadOnly, Single, BANG, commands::variables::unlet),
    def("unlockvar", 4, Forbidden, Arg::Required, ReadOnly, Single, BANG, commands::variables::unlockvar),
    def("vglobal", 1, Optional, Arg::Required, SelfManaged, Single, NONE, commands::global::vglobal),
    def("yank", 1, Optional, Arg::Optional, ReadOnly, PerCursor, NONE, commands::edit::yank),
];

const SKIP_QUIET: CommandFlags = CommandFlags::SKIP_HISTORY.union(CommandFlags::KEEP_VISUAL);
const BANG_ZERO: CommandFlags = CommandFlags::BANG.union(CommandFlags::ZERO_LINE);
const BANG_QUIET: CommandFlags = CommandFlags::BANG.union(CommandFlags::KEEP_VISUAL);

/// `:5` with no name moves the caret.
pub static GOTO_LINE: CommandDef = def(
    "",
    0,
    RangeRule::Required,
    Arg::Forbidden,
    ReadOnly,
    Single,
    NONE,
    commands::goto::goto_line,
);

/// A `:command` alias; the handler expands and runs the replacement.
pub static USER_COMMAND: CommandDef = def(
    "",
    0,
    Optional,
    Arg::Optional,
    SelfManaged,
    Single,
    BANG,
    commands::alias::run_alias,
);

/// Look up a built-in command by name or abbreviation.
pub fn lookup(name: &str) -> Option<&'static CommandDef> {
    COMMANDS
        .iter()
        .find(|def| name.len() >= def.min_len && def.name.starts_with(name))
}
