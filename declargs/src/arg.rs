use super::check::{Choices, Constraint, Mismatch, NumType, Range};
use super::{finalize, Error};

/// How an argument is matched and whether it may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Presence only, e.g. `--verbose`. Reads as `0` when absent and `1` when given.
    Flag,
    /// A named option that must be given, e.g. `--file out.txt`.
    Required,
    /// A named option that may be absent and may carry defaults.
    Optional,
    /// Matched by its place among the trailing non-option tokens.
    Positional,
}

pub(crate) const HELP_LONG: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';

/// Internal identifier the scanner reports matches with.
pub(crate) type ArgId = i32;

/// Describes one parameter of a [`Command`](crate::Command).
///
/// Every setter validates its input straight away and returns the argument again,
/// so a declaration reads as a `?`-chain:
///
/// ```
/// # use declargs::{Arg, NumType};
/// # fn main() -> Result<(), declargs::Error> {
/// let level = Arg::optional()
///     .long_name("level")?
///     .short_name('l')?
///     .range(NumType::Int, "0", "9")?
///     .default_value("6")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Arg {
    pub(crate) kind: ArgKind,
    pub(crate) long: Option<String>,
    pub(crate) short: Option<char>,
    pub(crate) id: ArgId,
    pub(crate) position: Option<usize>,
    pub(crate) conflicts_with_all: bool,
    constraint: Option<Constraint>,

    values: Vec<String>,
    defaults: Vec<String>,
    default_cleared: bool,
    pub(crate) hit: bool,
}

impl Arg {
    pub fn new(kind: ArgKind) -> Self {
        Self {
            kind,
            long: None,
            short: None,
            id: 0,
            position: None,
            conflicts_with_all: false,
            constraint: None,
            values: Vec::new(),
            defaults: Vec::new(),
            default_cleared: false,
            hit: false,
        }
    }
    pub fn flag() -> Self {
        Self::new(ArgKind::Flag)
    }
    pub fn required() -> Self {
        Self::new(ArgKind::Required)
    }
    pub fn optional() -> Self {
        Self::new(ArgKind::Optional)
    }
    pub fn positional() -> Self {
        Self::new(ArgKind::Positional)
    }

    pub(crate) fn help() -> Self {
        Self {
            long: Some(HELP_LONG.to_string()),
            short: Some(HELP_SHORT),
            conflicts_with_all: true,
            ..Self::flag()
        }
    }

    /// Sets the long name, given without the leading `--`.
    pub fn long_name(mut self, name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if self.kind == ArgKind::Positional {
            return Err(finalize(Error::NamedPositional));
        }
        if name == HELP_LONG {
            return Err(finalize(Error::ReservedName(name)));
        }
        if name.chars().count() < 2 {
            return Err(finalize(Error::LongNameTooShort(name)));
        }
        if name.starts_with('-') {
            return Err(finalize(Error::LeadingDash(name)));
        }
        if name.contains(' ') {
            return Err(finalize(Error::LongNameSpace(name)));
        }
        if name.contains('=') {
            return Err(finalize(Error::LongNameEquals(name)));
        }
        self.long = Some(name);
        Ok(self)
    }

    /// Sets the short name, given without the leading `-`.
    pub fn short_name(mut self, name: char) -> Result<Self, Error> {
        if self.kind == ArgKind::Positional {
            return Err(finalize(Error::NamedPositional));
        }
        if name == HELP_SHORT {
            return Err(finalize(Error::ReservedName(name.to_string())));
        }
        if name.is_whitespace() || name == '-' || name == '=' {
            return Err(finalize(Error::InvalidShortName(name)));
        }
        self.short = Some(name);
        Ok(self)
    }

    /// If this argument is given, no other argument of the command may be.
    pub fn conflicts_with_all(mut self) -> Result<Self, Error> {
        if !matches!(self.kind, ArgKind::Flag | ArgKind::Optional) {
            return Err(finalize(Error::ConflictsWithAllKind));
        }
        self.conflicts_with_all = true;
        Ok(self)
    }

    pub fn default_value(self, value: impl Into<String>) -> Result<Self, Error> {
        self.default_values(std::iter::once(value))
    }

    /// Values used when the argument is absent. Any occurrence replaces all of them.
    pub fn default_values<I, S>(mut self, values: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.kind != ArgKind::Optional {
            return Err(finalize(Error::DefaultOnNonOptional));
        }
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(finalize(Error::EmptyDefaults));
        }
        self.values = values.clone();
        self.defaults = values;
        self.check_default().map_err(finalize)?;
        Ok(self)
    }

    /// Inclusive numeric range. Bounds are text so 64-bit extremes can be written
    /// exactly; see [`NumLimit`](crate::NumLimit).
    pub fn range(
        self,
        num: NumType,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Result<Self, Error> {
        self.range_with(num, left, right, true, true)
    }

    pub fn range_with(
        mut self,
        num: NumType,
        left: impl Into<String>,
        right: impl Into<String>,
        include_left: bool,
        include_right: bool,
    ) -> Result<Self, Error> {
        if self.kind == ArgKind::Flag {
            return Err(finalize(Error::ConstraintOnFlag("range")));
        }
        if let Some(Constraint::Choices(_)) = self.constraint {
            return Err(finalize(Error::RangeAndChoices));
        }
        self.constraint = Some(Constraint::Range(Range {
            num,
            left: left.into(),
            right: right.into(),
            include_left,
            include_right,
        }));
        self.check_default().map_err(finalize)?;
        Ok(self)
    }

    pub fn choices<I, S>(mut self, choices: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.kind == ArgKind::Flag {
            return Err(finalize(Error::ConstraintOnFlag("set of choices")));
        }
        if let Some(Constraint::Range(_)) = self.constraint {
            return Err(finalize(Error::RangeAndChoices));
        }
        let choices: std::collections::BTreeSet<String> =
            choices.into_iter().map(Into::into).collect();
        if choices.is_empty() {
            return Err(finalize(Error::EmptyChoices));
        }
        self.constraint = Some(Constraint::Choices(Choices(choices)));
        self.check_default().map_err(finalize)?;
        Ok(self)
    }

    pub fn kind(&self) -> ArgKind {
        self.kind
    }
    pub fn get_long(&self) -> Option<&str> {
        self.long.as_deref()
    }
    pub fn get_short(&self) -> Option<char> {
        self.short
    }

    pub(crate) fn values(&self) -> &[String] {
        &self.values
    }

    /// How messages refer to this argument.
    pub(crate) fn display_name(&self) -> String {
        match (self.position, &self.long, self.short) {
            (Some(position), ..) => format!("position argument (position index {})", position),
            (None, Some(long), _) => format!("--{}", long),
            (None, None, Some(short)) => format!("-{}", short),
            (None, None, None) => String::from("<unnamed>"),
        }
    }

    pub(crate) fn takes_value(&self) -> bool {
        self.kind != ArgKind::Flag
    }

    /// Stores one raw value. A flag always overwrites its single slot; any other kind
    /// drops its defaults on the first call after a reset and then appends.
    pub(crate) fn set_value(&mut self, raw: &str, command: &str) -> Result<(), Error> {
        if self.kind == ArgKind::Flag {
            if self.values.is_empty() {
                self.values.push(String::new());
            }
            self.values[0] = raw.to_string();
            return Ok(());
        }
        if !self.defaults.is_empty() && !self.default_cleared {
            self.values.clear();
            self.default_cleared = true;
        }
        self.values.push(raw.to_string());
        match self.check_last()? {
            Some(mismatch) => Err(mismatch.into_error(command, self.display_name())),
            None => Ok(()),
        }
    }

    pub(crate) fn reset_status_info(&mut self) {
        self.hit = false;
        if !self.defaults.is_empty() {
            self.values = self.defaults.clone();
            self.default_cleared = false;
        } else if self.kind == ArgKind::Flag {
            self.values = vec![String::from("0")];
        } else {
            self.values.clear();
        }
    }

    fn check_last(&self) -> Result<Option<Mismatch>, Error> {
        match (&self.constraint, self.values.last()) {
            (Some(constraint), Some(last)) => constraint.check(last),
            _ => Ok(None),
        }
    }

    fn check_default(&self) -> Result<(), Error> {
        if self.defaults.is_empty() {
            return Ok(());
        }
        match self.check_last()? {
            Some(mismatch) => Err(mismatch.into_default_error()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        let arg = Arg::optional().long_name("output").unwrap().short_name('o').unwrap();
        assert_eq!(arg.get_long(), Some("output"));
        assert_eq!(arg.get_short(), Some('o'));
        assert_eq!(arg.display_name(), "--output");
    }

    #[test]
    fn bad_long_names() {
        assert!(matches!(Arg::flag().long_name("help"), Err(Error::ReservedName(_))));
        assert!(matches!(Arg::flag().long_name("x"), Err(Error::LongNameTooShort(_))));
        assert!(matches!(Arg::flag().long_name("--xy"), Err(Error::LeadingDash(_))));
        assert!(matches!(Arg::flag().long_name("x y"), Err(Error::LongNameSpace(_))));
        assert!(matches!(Arg::flag().long_name("a=b"), Err(Error::LongNameEquals(_))));
        assert!(matches!(Arg::positional().long_name("pos"), Err(Error::NamedPositional)));
    }

    #[test]
    fn bad_short_names() {
        assert!(matches!(Arg::flag().short_name('h'), Err(Error::ReservedName(_))));
        assert!(matches!(Arg::flag().short_name(' '), Err(Error::InvalidShortName(' '))));
        assert!(matches!(Arg::positional().short_name('p'), Err(Error::NamedPositional)));
    }

    #[test]
    fn flag_overwrites() {
        let mut arg = Arg::flag().long_name("flag").unwrap();
        arg.reset_status_info();
        assert_eq!(arg.values(), ["0"]);
        arg.set_value("1", "cmd").unwrap();
        arg.set_value("1", "cmd").unwrap();
        assert_eq!(arg.values(), ["1"]);
    }

    #[test]
    fn occurrences_replace_defaults() {
        let mut arg = Arg::optional()
            .long_name("opt")
            .unwrap()
            .default_values(["100", "200"])
            .unwrap();
        assert_eq!(arg.values(), ["100", "200"]);
        arg.set_value("1", "cmd").unwrap();
        arg.set_value("2", "cmd").unwrap();
        assert_eq!(arg.values(), ["1", "2"]);
        arg.reset_status_info();
        assert_eq!(arg.values(), ["100", "200"]);
        arg.set_value("3", "cmd").unwrap();
        assert_eq!(arg.values(), ["3"]);
    }

    #[test]
    fn constraints_exclusive() {
        let arg = Arg::optional().range(NumType::Int, "0", "1").unwrap();
        assert!(matches!(arg.choices(["a"]), Err(Error::RangeAndChoices)));
        let arg = Arg::optional().choices(["a"]).unwrap();
        assert!(matches!(arg.range(NumType::Int, "0", "1"), Err(Error::RangeAndChoices)));
        assert!(matches!(Arg::flag().choices(["a"]), Err(Error::ConstraintOnFlag(_))));
        assert!(matches!(Arg::optional().choices(Vec::<String>::new()), Err(Error::EmptyChoices)));
    }

    #[test]
    fn set_value_checks_last() {
        let mut arg = Arg::required()
            .long_name("num")
            .unwrap()
            .range(NumType::Int, "5", "10")
            .unwrap();
        arg.set_value("5", "cmd").unwrap();
        let err = arg.set_value("11", "cmd").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cmd: the value `11` of --num is not in the range of [5, 10]"
        );
    }
}
