use super::arg::ArgKind;
use super::scan::{ScanError, Scanner};
use super::{finalize, Command, Error, Parse};

impl Command {
    /// Validates `args` against this command and its sub-commands.
    ///
    /// `args[0]` is the program name, as in [`std::env::args`]. Nothing is printed;
    /// a help request comes back as [`Parse::Help`]. Failures go through [`finalize`].
    pub fn parse<I, S>(&mut self, args: I) -> Result<Parse, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        self.dispatch(&tokens).map_err(finalize)
    }

    /// Like [`parse`](Command::parse), but prints usage text on a help request and
    /// treats it as [`Error::Help`], which also goes through [`finalize`].
    pub fn process<I, S>(&mut self, args: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.parse(args) {
            Ok(Parse::Success) => Ok(()),
            Ok(Parse::Help(help)) => {
                println!("{}", help);
                Err(finalize(Error::Help))
            }
            Err(e) => Err(e),
        }
    }

    fn dispatch(&mut self, tokens: &[String]) -> Result<Parse, Error> {
        self.reset_arg_status();
        tracing::debug!(command = %self.name, tokens = tokens.len(), "parsing arguments");

        if self.subcommands.is_empty() {
            return self.parse_level(tokens);
        }

        // The first token naming a sub-command splits the parent's tokens from the child's.
        let idx = tokens
            .iter()
            .skip(1)
            .position(|t| self.subcommands.contains_key(t))
            .map_or(tokens.len(), |i| i + 1);

        // Parent errors are reported before a missing sub-command.
        if let Parse::Help(help) = self.parse_level(&tokens[..idx])? {
            return Ok(Parse::Help(help));
        }
        let name = match tokens.get(idx) {
            Some(name) => name,
            None => return Err(Error::MissingSubcommand(self.name.clone())),
        };
        tracing::debug!(command = %self.name, subcommand = %name, "dispatching");
        self.current_subcommand = Some(name.clone());
        match self.subcommands.get_mut(name) {
            Some(sub) => sub.dispatch(&tokens[idx..]),
            None => Err(Error::MissingSubcommand(self.name.clone())),
        }
    }

    fn reset_arg_status(&mut self) {
        for arg in &mut self.args {
            arg.reset_status_info();
        }
        self.position_values.clear();
        self.current_subcommand = None;
    }

    fn parse_level(&mut self, tokens: &[String]) -> Result<Parse, Error> {
        let tokens = tokens.get(1..).unwrap_or(&[]);
        let mut scanner = Scanner::new(&self.options, tokens);
        for event in scanner.by_ref() {
            let event = event.map_err(|e| self.scan_error(e))?;
            let index = match self.by_id.get(&event.id) {
                Some(&index) => index,
                None => continue,
            };
            if index == self.help {
                return Ok(Parse::Help(self.help_info()));
            }
            tracing::trace!(
                command = %self.name,
                id = event.id,
                value = ?event.value,
                "matched option"
            );
            let arg = &mut self.args[index];
            arg.hit = true;
            arg.set_value(event.value.unwrap_or("1"), &self.name)?;
        }
        self.check_required_args()?;

        let rest = scanner.remaining();
        tracing::debug!(
            command = %self.name,
            positional = rest.len(),
            "capturing positional arguments"
        );
        if rest.len() < self.positions.len() {
            return Err(Error::MissingPositional {
                command: self.name.clone(),
                expected: self.positions.len(),
                found: rest.len(),
            });
        }
        // Tokens past the declared position arguments are kept, unchecked.
        for (i, value) in rest.into_iter().enumerate() {
            self.position_values.push(value.to_string());
            if let Some(&index) = self.positions.get(i) {
                self.args[index].set_value(value, &self.name)?;
            }
        }

        self.check_conflict_with_all_args()?;
        self.check_related_groups()?;
        self.check_conflict_groups()?;
        self.check_one_required_groups()?;
        Ok(Parse::Success)
    }

    fn scan_error(&self, e: ScanError) -> Error {
        let command = self.name.clone();
        match e {
            ScanError::Unknown(option) => Error::UnknownOption { command, option },
            ScanError::MissingValue(option) => Error::ExpectedValue { command, option },
            ScanError::UnexpectedValue(option) => Error::UnexpectedValue { command, option },
        }
    }

    fn check_required_args(&self) -> Result<(), Error> {
        let missing = self
            .by_long
            .values()
            .chain(self.by_short.values())
            .map(|&index| &self.args[index])
            .find(|arg| arg.kind == ArgKind::Required && !arg.hit);
        match missing {
            Some(arg) => Err(Error::MissingRequired {
                command: self.name.clone(),
                arg: arg.display_name(),
            }),
            None => Ok(()),
        }
    }

    fn check_conflict_with_all_args(&self) -> Result<(), Error> {
        for &index in &self.exclusive {
            if !self.args[index].hit {
                continue;
            }
            let others = self
                .args
                .iter()
                .enumerate()
                .any(|(i, arg)| i != index && arg.hit);
            if others {
                return Err(Error::ConflictsWithAll {
                    command: self.name.clone(),
                    arg: self.args[index].display_name(),
                });
            }
        }
        Ok(())
    }

    fn check_related_groups(&self) -> Result<(), Error> {
        for group in &self.related_groups {
            let count = self.count_hits(group)?;
            if count != 0 && count != group.len() {
                return Err(Error::Related {
                    command: self.name.clone(),
                    group: describe_group(group),
                });
            }
        }
        Ok(())
    }

    fn check_conflict_groups(&self) -> Result<(), Error> {
        for group in &self.conflict_groups {
            if self.count_hits(group)? > 1 {
                return Err(Error::Conflict {
                    command: self.name.clone(),
                    group: describe_group(group),
                });
            }
        }
        Ok(())
    }

    fn check_one_required_groups(&self) -> Result<(), Error> {
        for group in &self.one_required_groups {
            if self.count_hits(group)? < 1 {
                return Err(Error::OneRequired {
                    command: self.name.clone(),
                    group: describe_group(group),
                });
            }
        }
        Ok(())
    }

    fn count_hits(&self, group: &[String]) -> Result<usize, Error> {
        let mut count = 0;
        for name in group {
            if self.member_hit(name)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// A single character names a short option, anything longer a long one.
    fn member_hit(&self, name: &str) -> Result<bool, Error> {
        let mut chars = name.chars();
        let index = match (chars.next(), chars.next()) {
            (Some(short), None) => self.by_short.get(&short),
            _ => self.by_long.get(name),
        };
        index
            .map(|&index| self.args[index].hit)
            .ok_or_else(|| Error::UnknownMember {
                command: self.name.clone(),
                name: name.to_string(),
            })
    }
}

fn describe_group(group: &[String]) -> String {
    let names: Vec<String> = group
        .iter()
        .map(|name| {
            if name.chars().count() == 1 {
                format!("-{}", name)
            } else {
                format!("--{}", name)
            }
        })
        .collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arg;

    #[test]
    fn group_description() {
        let group = vec!["aa".to_string(), "b".to_string()];
        assert_eq!(describe_group(&group), "[--aa, -b]");
    }

    #[test]
    fn reset_between_parses() -> Result<(), Error> {
        let mut cmd = Command::new("cmd")
            .arg(Arg::flag().long_name("flag")?)?
            .arg(Arg::optional().long_name("opt")?)?;
        cmd.parse(vec!["cmd", "--flag", "--opt", "1", "extra"])?;
        assert!(cmd.has("flag"));
        assert_eq!(cmd.position_values, vec!["extra"]);

        cmd.parse(vec!["cmd"])?;
        assert!(!cmd.has("flag"));
        assert!(!cmd.has("opt"));
        assert!(cmd.position_values.is_empty());
        assert!(cmd.get_many::<i32>("opt")?.is_empty());
        Ok(())
    }

    #[test]
    fn help_stops_scanning() -> Result<(), Error> {
        let mut cmd = Command::new("cmd")
            .usage("usage: cmd")
            .arg(Arg::required().long_name("req")?)?;
        // The missing required option is never reported.
        assert_eq!(
            cmd.parse(vec!["cmd", "--help"])?,
            Parse::Help(crate::HelpInfo("usage: cmd".to_string()))
        );
        assert_eq!(
            cmd.parse(vec!["cmd", "-h", "--bogus"])?,
            Parse::Help(crate::HelpInfo("usage: cmd".to_string()))
        );
        Ok(())
    }
}
