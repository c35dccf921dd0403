use super::arg::{Arg, ArgId, ArgKind};
use super::scan::OptionSpec;
use super::{finalize, Error, HelpInfo, Value};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
enum Usage {
    Block(String),
    Lines(Vec<String>),
}

/// A set of arguments, constraint groups and sub-commands.
///
/// Build the tree once, then call [`parse`](Command::parse) as often as needed; every
/// call starts from a clean state.
#[derive(Debug, Clone)]
pub struct Command {
    pub(crate) name: String,
    usage: Option<Usage>,

    pub(crate) args: Vec<Arg>,
    pub(crate) by_long: BTreeMap<String, usize>,
    pub(crate) by_short: BTreeMap<char, usize>,
    pub(crate) by_id: HashMap<ArgId, usize>,
    pub(crate) positions: Vec<usize>,
    pub(crate) exclusive: Vec<usize>,
    pub(crate) help: usize,
    pub(crate) options: Vec<OptionSpec>,
    next_id: ArgId,

    pub(crate) related_groups: Vec<Vec<String>>,
    pub(crate) conflict_groups: Vec<Vec<String>>,
    pub(crate) one_required_groups: Vec<Vec<String>>,

    pub(crate) position_values: Vec<String>,

    pub(crate) subcommands: BTreeMap<String, Command>,
    pub(crate) current_subcommand: Option<String>,
}

/// Something an argument can be looked up by: a long name (`&str`) or a short name (`char`).
pub trait ArgName {
    #[doc(hidden)]
    fn find(&self, cmd: &Command) -> Option<usize>;
    #[doc(hidden)]
    fn describe(&self) -> String;
}

impl ArgName for &str {
    fn find(&self, cmd: &Command) -> Option<usize> {
        cmd.by_long.get(*self).copied()
    }
    fn describe(&self) -> String {
        format!("--{}", self)
    }
}

impl ArgName for char {
    fn find(&self, cmd: &Command) -> Option<usize> {
        cmd.by_short.get(self).copied()
    }
    fn describe(&self) -> String {
        format!("-{}", self)
    }
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        let mut cmd = Self {
            name: name.into(),
            usage: None,
            args: Vec::new(),
            by_long: BTreeMap::new(),
            by_short: BTreeMap::new(),
            by_id: HashMap::new(),
            positions: Vec::new(),
            exclusive: Vec::new(),
            help: 0,
            options: Vec::new(),
            // Ids count down from -2 so they can never collide with a character code.
            next_id: -2,
            related_groups: Vec::new(),
            conflict_groups: Vec::new(),
            one_required_groups: Vec::new(),
            position_values: Vec::new(),
            subcommands: BTreeMap::new(),
            current_subcommand: None,
        };
        cmd.help = cmd.register(Arg::help());
        cmd
    }

    /// Usage text printed verbatim on `--help`.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(Usage::Block(usage.into()));
        self
    }

    /// Usage text given line by line.
    pub fn usage_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usage = Some(Usage::Lines(lines.into_iter().map(Into::into).collect()));
        self
    }

    pub fn arg(mut self, arg: Arg) -> Result<Self, Error> {
        if arg.kind() != ArgKind::Positional
            && arg.get_long().is_none()
            && arg.get_short().is_none()
        {
            return Err(finalize(Error::Unnamed));
        }
        if let Some(long) = arg.get_long() {
            if self.by_long.contains_key(long) {
                return Err(finalize(self.duplicate(format!("--{}", long))));
            }
        }
        if let Some(short) = arg.get_short() {
            if self.by_short.contains_key(&short) {
                return Err(finalize(self.duplicate(format!("-{}", short))));
            }
        }
        self.register(arg);
        Ok(self)
    }

    fn duplicate(&self, name: String) -> Error {
        Error::DuplicateName {
            command: self.name.clone(),
            name,
        }
    }

    fn register(&mut self, mut arg: Arg) -> usize {
        let index = self.args.len();
        arg.id = self.next_id;
        self.next_id -= 1;

        if let Some(long) = &arg.long {
            self.by_long.insert(long.clone(), index);
        }
        if let Some(short) = arg.short {
            self.by_short.insert(short, index);
        }
        self.by_id.insert(arg.id, index);
        if arg.long.is_some() || arg.short.is_some() {
            self.options.push(OptionSpec {
                long: arg.long.clone(),
                short: arg.short,
                id: arg.id,
                takes_value: arg.takes_value(),
            });
        }
        if arg.conflicts_with_all {
            self.exclusive.push(index);
        }
        match arg.kind {
            ArgKind::Flag => arg.reset_status_info(),
            ArgKind::Positional => {
                arg.position = Some(self.positions.len());
                self.positions.push(index);
            }
            _ => {}
        }
        self.args.push(arg);
        index
    }

    /// Members must be given all together or not at all.
    ///
    /// Members are long names, or short names when a single character. They are
    /// resolved when parsing, so the group may be declared before its arguments.
    pub fn related_group<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_groups.push(names.into_iter().map(Into::into).collect());
        self
    }

    /// At most one member may be given.
    pub fn conflict_group<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflict_groups.push(names.into_iter().map(Into::into).collect());
        self
    }

    /// At least one member must be given.
    pub fn one_required_group<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_required_groups.push(names.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a sub-command, replacing any earlier one with the same name.
    pub fn subcommand(mut self, subcommand: Command) -> Self {
        self.subcommands.insert(subcommand.name.clone(), subcommand);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sub-command selected by the last parse.
    pub fn get_subcommand(&self) -> Result<&Command, Error> {
        self.current_subcommand
            .as_ref()
            .and_then(|name| self.subcommands.get(name))
            .ok_or_else(|| finalize(Error::NoSubcommand(self.name.clone())))
    }

    pub(crate) fn help_info(&self) -> HelpInfo {
        HelpInfo(match &self.usage {
            Some(Usage::Block(block)) => block.clone(),
            Some(Usage::Lines(lines)) => lines.join("\n"),
            None => String::new(),
        })
    }

    /// Whether the argument was given in the last parse. Unknown names are never given.
    pub fn has(&self, name: impl ArgName) -> bool {
        name.find(self).map_or(false, |index| self.args[index].hit)
    }

    fn values_of(&self, name: &impl ArgName) -> Result<&[String], Error> {
        name.find(self)
            .map(|index| self.args[index].values())
            .ok_or_else(|| Error::UnknownArg(name.describe()))
    }

    /// The first value of the argument: the first occurrence, the first default, or a
    /// flag's `0`/`1`.
    pub fn get_one<'s, T: Value<'s>>(&'s self, name: impl ArgName) -> Result<T, Error> {
        let values = self.values_of(&name).map_err(finalize)?;
        let first = values
            .first()
            .ok_or_else(|| finalize(Error::NoValue(name.describe())))?;
        T::from_raw(first).map_err(finalize)
    }

    /// Every occurrence in order, or the defaults if there was none.
    pub fn get_many<'s, T: Value<'s>>(&'s self, name: impl ArgName) -> Result<Vec<T>, Error> {
        self.values_of(&name)
            .and_then(|values| values.iter().map(|value| T::from_raw(value)).collect())
            .map_err(finalize)
    }

    /// A positional token by index, including tokens past the declared position arguments.
    pub fn get_one_position<'s, T: Value<'s>>(&'s self, index: usize) -> Result<T, Error> {
        let value = self
            .position_values
            .get(index)
            .ok_or_else(|| finalize(Error::NoPosition(index)))?;
        T::from_raw(value).map_err(finalize)
    }

    pub fn get_all_positions<'s, T: Value<'s>>(&'s self) -> Result<Vec<T>, Error> {
        self.position_values
            .iter()
            .map(|value| T::from_raw(value))
            .collect::<Result<_, _>>()
            .map_err(finalize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_is_registered() {
        let cmd = Command::new("cmd");
        assert_eq!(cmd.by_long.get("help"), Some(&cmd.help));
        assert_eq!(cmd.by_short.get(&'h'), Some(&cmd.help));
        assert_eq!(cmd.exclusive, vec![cmd.help]);
        assert_eq!(cmd.args[cmd.help].id, -2);
    }

    #[test]
    fn registration() -> Result<(), Error> {
        let cmd = Command::new("cmd")
            .arg(Arg::flag().long_name("flag")?)?
            .arg(Arg::optional().short_name('o')?)?
            .arg(Arg::positional())?
            .arg(Arg::positional())?;
        assert_eq!(cmd.args[1].id, -3);
        assert_eq!(cmd.args[2].id, -4);
        assert_eq!(cmd.by_id[&-4], 2);
        assert_eq!(cmd.positions, vec![3, 4]);
        assert_eq!(cmd.args[4].position, Some(1));
        // help, flag and -o; positional arguments have no option entry.
        assert_eq!(cmd.options.len(), 3);
        assert!(!cmd.options[1].takes_value);
        assert!(cmd.options[2].takes_value);
        assert_eq!(cmd.get_one::<i32>("flag")?, 0);
        Ok(())
    }

    #[test]
    fn unnamed() {
        assert!(matches!(Command::new("cmd").arg(Arg::optional()), Err(Error::Unnamed)));
    }

    #[test]
    fn duplicate() -> Result<(), Error> {
        let cmd = Command::new("cmd").arg(Arg::optional().long_name("aa")?)?;
        assert!(matches!(
            cmd.arg(Arg::flag().long_name("aa")?),
            Err(Error::DuplicateName { .. })
        ));
        Ok(())
    }

    #[test]
    fn usage_lines() {
        let cmd = Command::new("cmd").usage_lines(["usage: cmd", "  -v  verbose"]);
        assert_eq!(cmd.help_info().to_string(), "usage: cmd\n  -v  verbose");
    }

    #[test]
    fn no_subcommand_yet() {
        let cmd = Command::new("cmd").subcommand(Command::new("sub"));
        assert!(matches!(cmd.get_subcommand(), Err(Error::NoSubcommand(_))));
    }
}
