//! Error types for evaluation and command execution.
//!
//! `EvalErrorKind` is the typed taxonomy; its `Display` renders the message
//! Vim shows for the condition, error number included. Factory functions
//! (e.g. `undefined_variable()`) are the public way to build errors; they
//! fill both `kind` and `message`.

use std::fmt;

use vim_syntax::pattern::PatternError;
use vim_syntax::{Span, SyntaxError};

use crate::value::{Value, ValueType};

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Which implicit conversion was refused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CoercionKind {
    ListAsNumber,
    DictAsNumber,
    FloatAsNumber,
    FuncrefAsNumber,
    BlobAsNumber,
    ListAsString,
    DictAsString,
    FloatAsString,
    FuncrefAsString,
    BlobAsString,
    StringAsFloat,
    ListAsFloat,
    DictAsFloat,
    FuncrefAsFloat,
    BlobAsFloat,
}

impl CoercionKind {
    /// Vim error number for this conversion.
    pub const fn code(self) -> u16 {
        match self {
            CoercionKind::ListAsNumber => 745,
            CoercionKind::DictAsNumber => 728,
            CoercionKind::FloatAsNumber => 805,
            CoercionKind::FuncrefAsNumber => 703,
            CoercionKind::BlobAsNumber => 974,
            CoercionKind::ListAsString => 730,
            CoercionKind::DictAsString => 731,
            CoercionKind::FloatAsString => 806,
            CoercionKind::FuncrefAsString => 729,
            CoercionKind::BlobAsString => 976,
            CoercionKind::StringAsFloat => 892,
            CoercionKind::ListAsFloat => 893,
            CoercionKind::DictAsFloat => 894,
            CoercionKind::FuncrefAsFloat => 891,
            CoercionKind::BlobAsFloat => 975,
        }
    }

    /// The refused conversion of `source` into a Number, if it is refused.
    pub const fn to_number(source: ValueType) -> Option<Self> {
        match source {
            ValueType::List => Some(CoercionKind::ListAsNumber),
            ValueType::Dict => Some(CoercionKind::DictAsNumber),
            ValueType::Float => Some(CoercionKind::FloatAsNumber),
            ValueType::Funcref => Some(CoercionKind::FuncrefAsNumber),
            ValueType::Blob => Some(CoercionKind::BlobAsNumber),
            ValueType::Number | ValueType::String => None,
        }
    }

    pub const fn to_string(source: ValueType) -> Option<Self> {
        match source {
            ValueType::List => Some(CoercionKind::ListAsString),
            ValueType::Dict => Some(CoercionKind::DictAsString),
            ValueType::Float => Some(CoercionKind::FloatAsString),
            ValueType::Funcref => Some(CoercionKind::FuncrefAsString),
            ValueType::Blob => Some(CoercionKind::BlobAsString),
            ValueType::Number | ValueType::String => None,
        }
    }

    pub const fn to_float(source: ValueType) -> Option<Self> {
        match source {
            ValueType::String => Some(CoercionKind::StringAsFloat),
            ValueType::List => Some(CoercionKind::ListAsFloat),
            ValueType::Dict => Some(CoercionKind::DictAsFloat),
            ValueType::Funcref => Some(CoercionKind::FuncrefAsFloat),
            ValueType::Blob => Some(CoercionKind::BlobAsFloat),
            ValueType::Number | ValueType::Float => None,
        }
    }

    fn description(self) -> &'static str {
        match self {
            CoercionKind::ListAsNumber => "Using a List as a Number",
            CoercionKind::DictAsNumber => "Using a Dictionary as a Number",
            CoercionKind::FloatAsNumber => "Using a Float as a Number",
            CoercionKind::FuncrefAsNumber => "Using a Funcref as a Number",
            CoercionKind::BlobAsNumber => "Using a Blob as a Number",
            CoercionKind::ListAsString => "Using a List as a String",
            CoercionKind::DictAsString => "Using a Dictionary as a String",
            CoercionKind::FloatAsString => "Using a Float as a String",
            CoercionKind::FuncrefAsString => "Using a Funcref as a String",
            CoercionKind::BlobAsString => "Using a Blob as a String",
            CoercionKind::StringAsFloat => "Using a String as a Float",
            CoercionKind::ListAsFloat => "Using a List as a Float",
            CoercionKind::DictAsFloat => "Using a Dictionary as a Float",
            CoercionKind::FuncrefAsFloat => "Using a Funcref as a Float",
            CoercionKind::BlobAsFloat => "Using a Blob as a Float",
        }
    }
}

impl fmt::Display for CoercionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}: {}", self.code(), self.description())
    }
}

/// Typed error category.
///
/// Callers match on the kind, never on the message text. In particular
/// `ReadOnlyVariable` (rebinding a locked or read-only name) and
/// `LockedValue` (mutating a locked container or item) stay distinct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Variables
    UndefinedVariable {
        name: String,
    },
    ReadOnlyVariable {
        name: String,
    },
    LockedValue {
        name: String,
    },
    NoSuchVariable {
        name: String,
    },

    // Coercion and operators
    TypeCoercion(CoercionKind),
    CannotCompare {
        type_name: ValueType,
    },
    InvalidOperation {
        type_name: ValueType,
    },
    FloatModulo,
    NegativeShift,
    ShiftRequiresNumber,

    // Access
    InvalidRange,
    IndexOutOfRange {
        index: i64,
    },
    BlobIndexOutOfRange {
        index: i64,
    },
    KeyNotPresent {
        key: String,
    },
    KeyAlreadyExists {
        key: String,
    },
    CannotIndexFuncref,
    CannotSliceDict,
    TooManyListItems,
    NotEnoughListItems,
    FewerTargetsThanItems,
    MoreTargetsThanItems,

    // Functions
    TooFewArguments {
        function: String,
    },
    TooManyArguments {
        function: String,
    },
    InvalidArgument {
        detail: String,
    },
    InvalidArgumentType {
        function: String,
        expected: String,
    },
    ListRequired,
    DictRequired,
    UnknownFunction {
        name: String,
    },
    NotCallable {
        type_name: ValueType,
    },
    DictFunctionWithoutDict {
        name: String,
    },
    RecursionLimit,
    Syntax {
        message: String,
    },

    // Commands
    UnknownCommand {
        command: String,
    },
    AliasRecursion,
    ProcessTerminated,
    ProcessFailed {
        message: String,
    },
    NoRangeAllowed,
    ArgumentRequired,
    TrailingCharacters {
        text: String,
    },
    NoBangAllowed,
    GlobalRecursive,
    NoPreviousCommand,
    EmptyRegister {
        register: char,
    },
    MarkNotSet {
        mark: char,
    },

    /// Message-only error (`:echoerr`, host failures).
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Variables
            Self::UndefinedVariable { name } => write!(f, "E121: Undefined variable: {name}"),
            Self::ReadOnlyVariable { name } => {
                write!(f, "E46: Cannot change read-only variable \"{name}\"")
            }
            Self::LockedValue { name } => write!(f, "E741: Value is locked: {name}"),
            Self::NoSuchVariable { name } => write!(f, "E108: No such variable: \"{name}\""),

            // Coercion and operators
            Self::TypeCoercion(kind) => write!(f, "{kind}"),
            Self::CannotCompare { type_name } => match type_name {
                ValueType::Dict => write!(f, "E735: Can only compare Dictionary with Dictionary"),
                ValueType::Blob => write!(f, "E977: Can only compare Blob with Blob"),
                _ => write!(f, "E691: Can only compare List with List"),
            },
            Self::InvalidOperation { type_name } => match type_name {
                ValueType::Dict => write!(f, "E736: Invalid operation for Dictionary"),
                ValueType::Funcref => write!(f, "E694: Invalid operation for Funcrefs"),
                ValueType::Blob => write!(f, "E978: Invalid operation for Blob"),
                _ => write!(f, "E692: Invalid operation for List"),
            },
            Self::FloatModulo => write!(f, "E804: Cannot use '%' with Float"),
            Self::NegativeShift => write!(f, "E1283: Bitshift amount must be a positive number"),
            Self::ShiftRequiresNumber => write!(f, "E1282: Bitshift operands must be numbers"),

            // Access
            Self::InvalidRange => write!(f, "E16: Invalid range"),
            Self::IndexOutOfRange { index } => write!(f, "E684: List index out of range: {index}"),
            Self::BlobIndexOutOfRange { index } => {
                write!(f, "E979: Blob index out of range: {index}")
            }
            Self::KeyNotPresent { key } => {
                write!(f, "E716: Key not present in Dictionary: \"{key}\"")
            }
            Self::KeyAlreadyExists { key } => write!(f, "E737: Key already exists: {key}"),
            Self::CannotIndexFuncref => write!(f, "E695: Cannot index a Funcref"),
            Self::CannotSliceDict => write!(f, "E719: Cannot slice a Dictionary"),
            Self::TooManyListItems => write!(f, "E710: List value has too many items"),
            Self::NotEnoughListItems => write!(f, "E711: List value has not enough items"),
            Self::FewerTargetsThanItems => write!(f, "E687: Less targets than List items"),
            Self::MoreTargetsThanItems => write!(f, "E688: More targets than List items"),

            // Functions
            Self::TooFewArguments { function } => {
                write!(f, "E119: Not enough arguments for function: {function}")
            }
            Self::TooManyArguments { function } => {
                write!(f, "E118: Too many arguments for function: {function}")
            }
            Self::InvalidArgument { detail } => write!(f, "E475: Invalid argument: {detail}"),
            Self::InvalidArgumentType { function, expected } => {
                write!(f, "E712: Argument of {function} must be a {expected}")
            }
            Self::ListRequired => write!(f, "E714: List required"),
            Self::DictRequired => write!(f, "E715: Dictionary required"),
            Self::UnknownFunction { name } => write!(f, "E117: Unknown function: {name}"),
            Self::NotCallable { type_name } => {
                write!(f, "E1085: Not a callable type: {}", type_name.name())
            }
            Self::DictFunctionWithoutDict { name } => {
                write!(f, "E725: Calling dict function without Dictionary: {name}")
            }
            Self::RecursionLimit => {
                write!(f, "E132: Function call depth is higher than 'maxfuncdepth'")
            }
            Self::Syntax { message } => write!(f, "{message}"),

            // Commands
            Self::UnknownCommand { command } => {
                write!(f, "E492: Not an editor command: {command}")
            }
            Self::AliasRecursion => write!(f, "E169: Command too recursive"),
            Self::ProcessTerminated => write!(f, "Command terminated"),
            Self::ProcessFailed { message } => write!(f, "E485: Shell command failed: {message}"),
            Self::NoRangeAllowed => write!(f, "E481: No range allowed"),
            Self::ArgumentRequired => write!(f, "E471: Argument required"),
            Self::TrailingCharacters { text } => write!(f, "E488: Trailing characters: {text}"),
            Self::NoBangAllowed => write!(f, "E477: No ! allowed"),
            Self::GlobalRecursive => write!(f, "E147: Cannot do :global recursive"),
            Self::NoPreviousCommand => write!(f, "E34: No previous command"),
            Self::EmptyRegister { register } => write!(f, "E353: Nothing in register {register}"),
            Self::MarkNotSet { mark } => write!(f, "E20: Mark not set: {mark}"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    /// Structured category, for matching.
    pub kind: EvalErrorKind,
    /// Rendered message; equals `kind.to_string()` for factory errors.
    pub message: String,
    /// Source location within the expression, when known.
    pub span: Option<Span>,
}

impl EvalError {
    /// Message-only error.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a source span unless one is already present.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Whether this is one of the lock-related kinds.
    pub fn is_lock_error(&self) -> bool {
        matches!(
            self.kind,
            EvalErrorKind::LockedValue { .. } | EvalErrorKind::ReadOnlyVariable { .. }
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

impl From<SyntaxError> for EvalError {
    fn from(err: SyntaxError) -> Self {
        let span = err.span;
        EvalError::from_kind(EvalErrorKind::Syntax {
            message: err.to_string(),
        })
        .with_span(span)
    }
}

impl From<PatternError> for EvalError {
    fn from(err: PatternError) -> Self {
        EvalError::from_kind(EvalErrorKind::Syntax {
            message: err.to_string(),
        })
    }
}

// Variables

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

/// Rebinding a locked variable or writing a read-only one (`a:`, `v:val`).
#[cold]
pub fn read_only_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyVariable {
        name: name.to_string(),
    })
}

/// Mutating a locked container or a locked item slot.
#[cold]
pub fn locked_value(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LockedValue {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_such_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchVariable {
        name: name.to_string(),
    })
}

// Coercion and operators

#[cold]
pub fn coercion(kind: CoercionKind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeCoercion(kind))
}

#[cold]
pub fn cannot_compare(type_name: ValueType) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotCompare { type_name })
}

#[cold]
pub fn invalid_operation(type_name: ValueType) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperation { type_name })
}

#[cold]
pub fn float_modulo() -> EvalError {
    EvalError::from_kind(EvalErrorKind::FloatModulo)
}

#[cold]
pub fn negative_shift() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NegativeShift)
}

#[cold]
pub fn shift_requires_number() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ShiftRequiresNumber)
}

// Access

#[cold]
pub fn invalid_range() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidRange)
}

#[cold]
pub fn index_out_of_range(index: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index })
}

#[cold]
pub fn blob_index_out_of_range(index: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BlobIndexOutOfRange { index })
}

#[cold]
pub fn key_not_present(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotPresent {
        key: key.to_string(),
    })
}

#[cold]
pub fn key_already_exists(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyAlreadyExists {
        key: key.to_string(),
    })
}

#[cold]
pub fn cannot_index_funcref() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotIndexFuncref)
}

#[cold]
pub fn cannot_slice_dict() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotSliceDict)
}

/// Slice assignment given more values than the slice holds.
#[cold]
pub fn too_many_list_items() -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyListItems)
}

#[cold]
pub fn not_enough_list_items() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotEnoughListItems)
}

/// `:let [a, b] = list` with more items than targets.
#[cold]
pub fn fewer_targets_than_items() -> EvalError {
    EvalError::from_kind(EvalErrorKind::FewerTargetsThanItems)
}

#[cold]
pub fn more_targets_than_items() -> EvalError {
    EvalError::from_kind(EvalErrorKind::MoreTargetsThanItems)
}

// Functions

#[cold]
pub fn too_few_arguments(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooFewArguments {
        function: function.to_string(),
    })
}

#[cold]
pub fn too_many_arguments(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyArguments {
        function: function.to_string(),
    })
}

#[cold]
pub fn invalid_argument(detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgument {
        detail: detail.into(),
    })
}

/// `function` is rendered as written, e.g. `"filter()"`.
#[cold]
pub fn invalid_argument_type(function: &str, expected: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgumentType {
        function: function.to_string(),
        expected: expected.to_string(),
    })
}

#[cold]
pub fn list_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ListRequired)
}

#[cold]
pub fn dict_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DictRequired)
}

#[cold]
pub fn unknown_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: ValueType) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { type_name })
}

#[cold]
pub fn dict_function_without_dict(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DictFunctionWithoutDict {
        name: name.to_string(),
    })
}

#[cold]
pub fn recursion_limit() -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit)
}

// Commands

#[cold]
pub fn unknown_command(command: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownCommand {
        command: command.to_string(),
    })
}

#[cold]
pub fn alias_recursion() -> EvalError {
    EvalError::from_kind(EvalErrorKind::AliasRecursion)
}

#[cold]
pub fn process_terminated() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ProcessTerminated)
}

#[cold]
pub fn process_failed(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ProcessFailed {
        message: message.into(),
    })
}

#[cold]
pub fn no_range_allowed() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoRangeAllowed)
}

#[cold]
pub fn argument_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentRequired)
}

#[cold]
pub fn trailing_characters(text: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TrailingCharacters {
        text: text.to_string(),
    })
}

#[cold]
pub fn no_bang_allowed() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoBangAllowed)
}

#[cold]
pub fn global_recursive() -> EvalError {
    EvalError::from_kind(EvalErrorKind::GlobalRecursive)
}

#[cold]
pub fn no_previous_command() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoPreviousCommand)
}

#[cold]
pub fn empty_register(register: char) -> EvalError {
    EvalError::from_kind(EvalErrorKind::EmptyRegister { register })
}

#[cold]
pub fn mark_not_set(mark: char) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MarkNotSet { mark })
}
