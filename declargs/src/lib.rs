//! Declarative command-line argument parsing.
//!
//! Describe the accepted input as a tree of [`Command`]s holding [`Arg`]s,
//! then validate process arguments against it and query typed values.
//!
//! ```no_run
//! use declargs::{Arg, Command, NumType};
//!
//! fn main() -> Result<(), declargs::Error> {
//!     let mut cmd = Command::new("iotime")
//!         .usage("iotime --file PATH [--bufsize N]")
//!         .arg(Arg::required().long_name("file")?.short_name('f')?)?
//!         .arg(
//!             Arg::optional()
//!                 .long_name("bufsize")?
//!                 .range(NumType::Uint, "1", "1048576")?
//!                 .default_value("4096")?,
//!         )?;
//!     cmd.process(std::env::args())?;
//!     let file: &str = cmd.get_one("file")?;
//!     let bufsize: u64 = cmd.get_one("bufsize")?;
//!     println!("{} {}", file, bufsize);
//!     Ok(())
//! }
//! ```
use std::error::Error as StdError;

mod arg;
mod check;
mod command;
mod parse;
mod scan;
mod value;

pub use arg::{Arg, ArgKind};
pub use check::{NumLimit, NumType};
pub use command::{ArgName, Command};
pub use value::Value;

/// Outcome of a successful call to [`Command::parse`].
#[derive(Debug, PartialEq, Eq)]
pub enum Parse {
    Success,
    Help(HelpInfo),
}

/// Usage text of the command on which `--help` was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpInfo(pub String);

impl std::fmt::Display for HelpInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error)]
pub enum Error {
    // Declaration errors.
    #[error("`{0}` is reserved: --help and -h are added automatically")]
    ReservedName(String),
    #[error("The long name `{0}` must be at least 2 characters long")]
    LongNameTooShort(String),
    #[error("The name `{0}` cannot start with -- or -")]
    LeadingDash(String),
    #[error("The long name `{0}` cannot contain spaces")]
    LongNameSpace(String),
    #[error("The long name `{0}` cannot contain `=`")]
    LongNameEquals(String),
    #[error("`{0}` is not a valid short name")]
    InvalidShortName(char),
    #[error("A position argument cannot have a long or short name")]
    NamedPositional,
    #[error("The argument should have a long name or a short name")]
    Unnamed,
    #[error("{command}: the name `{name}` is already in use")]
    DuplicateName { command: String, name: String },
    #[error("Only optional and flag arguments can conflict with all other arguments")]
    ConflictsWithAllKind,
    #[error("Only optional arguments can have default values")]
    DefaultOnNonOptional,
    #[error("The default values cannot be empty")]
    EmptyDefaults,
    #[error("A flag argument cannot have a {0}")]
    ConstraintOnFlag(&'static str),
    #[error("An argument cannot have both a range and a set of choices")]
    RangeAndChoices,
    #[error("The choices cannot be empty")]
    EmptyChoices,
    #[error("The default value `{value}` is not within {expected}")]
    InvalidDefault { value: String, expected: String },

    // Scan errors.
    #[error("{command}: unrecognized option `{option}`")]
    UnknownOption { command: String, option: String },
    #[error("{command}: option `{option}` requires a value")]
    ExpectedValue { command: String, option: String },
    #[error("{command}: option `{option}` does not take a value")]
    UnexpectedValue { command: String, option: String },

    // Validation errors.
    #[error("{command}: Missing required option: {arg}")]
    MissingRequired { command: String, arg: String },
    #[error("{command}: Missing required position arguments: expected {expected}, found {found}")]
    MissingPositional {
        command: String,
        expected: usize,
        found: usize,
    },
    #[error("{command}: the value `{value}` of {arg} is not in the range of {bounds}")]
    OutOfRange {
        command: String,
        arg: String,
        value: String,
        bounds: String,
    },
    #[error("{command}: the value `{value}` of {arg} is not within {choices}")]
    NotInChoices {
        command: String,
        arg: String,
        value: String,
        choices: String,
    },
    #[error("{command}: option {arg} conflicts with all other options")]
    ConflictsWithAll { command: String, arg: String },
    #[error("{command}: options {group} must be given together or not at all")]
    Related { command: String, group: String },
    #[error("{command}: options {group} conflict with each other")]
    Conflict { command: String, group: String },
    #[error("{command}: at least one of {group} is required")]
    OneRequired { command: String, group: String },
    #[error("{command}: Can not find option `{name}`")]
    UnknownMember { command: String, name: String },
    #[error("{0}: Missing subcommand")]
    MissingSubcommand(String),

    // Query errors.
    #[error("Can not find option `{0}`")]
    UnknownArg(String),
    #[error("Option `{0}` does not have a value")]
    NoValue(String),
    #[error("No position argument at index `{0}`")]
    NoPosition(usize),
    #[error("{0}: no subcommand has been parsed")]
    NoSubcommand(String),

    #[error("Error parsing value `{0}`: {1}")]
    Value(String, Box<dyn StdError>),
    /// Help was requested; the usage text has already been printed.
    #[error("")]
    Help,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Applies the termination policy to an error.
///
/// Every public operation that can fail passes its error through here. With the
/// `exit-on-error` feature the message is printed to stderr and the process exits
/// with status 1. Otherwise the error is handed back unchanged.
#[cfg(feature = "exit-on-error")]
pub fn finalize(error: Error) -> Error {
    if !matches!(error, Error::Help) {
        eprintln!("{}", error);
    }
    std::process::exit(1);
}

/// Applies the termination policy to an error.
///
/// Every public operation that can fail passes its error through here. With the
/// `exit-on-error` feature the message is printed to stderr and the process exits
/// with status 1. Otherwise the error is handed back unchanged.
#[cfg(not(feature = "exit-on-error"))]
pub fn finalize(error: Error) -> Error {
    error
}
