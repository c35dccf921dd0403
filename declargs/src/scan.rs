//! Splits raw tokens into option matches and leftover positional tokens.
//!
//! Supported forms are `--name value`, `--name=value`, `-n value`, `-nvalue` and,
//! like `getopt_long_only`, a long name behind a single dash (`-name value`).
//! Non-option tokens are set aside while scanning continues, and `--` ends option
//! scanning altogether. Abbreviated long names and clustered short flags are not
//! recognized.
use super::arg::ArgId;

/// One entry of the option table.
#[derive(Debug, Clone)]
pub(crate) struct OptionSpec {
    pub long: Option<String>,
    pub short: Option<char>,
    pub id: ArgId,
    pub takes_value: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Event<'t> {
    pub id: ArgId,
    pub value: Option<&'t str>,
}

/// The offending token is carried as written by the user.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScanError {
    Unknown(String),
    MissingValue(String),
    UnexpectedValue(String),
}

pub(crate) struct Scanner<'o, 't> {
    options: &'o [OptionSpec],
    tokens: &'t [String],
    cursor: usize,
    finished: bool,
    positional: Vec<&'t str>,
}

impl<'o, 't> Scanner<'o, 't> {
    pub fn new(options: &'o [OptionSpec], tokens: &'t [String]) -> Self {
        Self {
            options,
            tokens,
            cursor: 0,
            finished: false,
            positional: Vec::new(),
        }
    }

    /// Tokens not consumed as options or option values, in order.
    pub fn remaining(mut self) -> Vec<&'t str> {
        self.positional
            .extend(self.tokens[self.cursor..].iter().map(String::as_str));
        self.positional
    }

    fn find_long(&self, name: &str) -> Option<&'o OptionSpec> {
        let options = self.options;
        options.iter().find(|o| o.long.as_deref() == Some(name))
    }

    fn find_short(&self, name: char) -> Option<&'o OptionSpec> {
        let options = self.options;
        options.iter().find(|o| o.short == Some(name))
    }

    fn next_value(&mut self) -> Option<&'t str> {
        let tokens = self.tokens;
        let value = tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(value.as_str())
    }

    fn long(
        &mut self,
        token: &'t str,
        spec: &OptionSpec,
        attached: Option<&'t str>,
    ) -> Result<Event<'t>, ScanError> {
        let value = match (spec.takes_value, attached) {
            (true, Some(value)) => Some(value),
            (true, None) => Some(
                self.next_value()
                    .ok_or_else(|| ScanError::MissingValue(token.to_string()))?,
            ),
            (false, Some(_)) => return Err(ScanError::UnexpectedValue(token.to_string())),
            (false, None) => None,
        };
        Ok(Event { id: spec.id, value })
    }

    fn short(&mut self, token: &'t str, body: &'t str) -> Result<Event<'t>, ScanError> {
        let mut chars = body.chars();
        let spec = chars
            .next()
            .and_then(|c| self.find_short(c))
            .ok_or_else(|| ScanError::Unknown(token.to_string()))?;
        let rest = chars.as_str();
        let value = match (spec.takes_value, rest.is_empty()) {
            (true, false) => Some(rest),
            (true, true) => Some(
                self.next_value()
                    .ok_or_else(|| ScanError::MissingValue(token.to_string()))?,
            ),
            (false, true) => None,
            (false, false) => return Err(ScanError::Unknown(token.to_string())),
        };
        Ok(Event { id: spec.id, value })
    }
}

fn split_attached(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

impl<'o, 't> Iterator for Scanner<'o, 't> {
    type Item = Result<Event<'t>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let tokens = self.tokens;
        loop {
            let token = match tokens.get(self.cursor) {
                Some(token) => token.as_str(),
                None => {
                    self.finished = true;
                    return None;
                }
            };
            self.cursor += 1;

            if token == "--" {
                self.finished = true;
                return None;
            }
            if let Some(body) = token.strip_prefix("--") {
                let (name, attached) = split_attached(body);
                return Some(match self.find_long(name) {
                    Some(spec) => self.long(token, spec, attached),
                    None => Err(ScanError::Unknown(token.to_string())),
                });
            }
            if let Some(body) = token.strip_prefix('-') {
                if body.is_empty() {
                    self.positional.push(token);
                    continue;
                }
                if body.chars().count() > 1 {
                    let (name, attached) = split_attached(body);
                    if let Some(spec) = self.find_long(name) {
                        return Some(self.long(token, spec, attached));
                    }
                }
                return Some(self.short(token, body));
            }
            self.positional.push(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<OptionSpec> {
        vec![
            OptionSpec {
                long: Some("verbose".to_string()),
                short: Some('v'),
                id: -2,
                takes_value: false,
            },
            OptionSpec {
                long: Some("output".to_string()),
                short: Some('o'),
                id: -3,
                takes_value: true,
            },
            OptionSpec {
                long: Some("aa".to_string()),
                short: None,
                id: -4,
                takes_value: true,
            },
        ]
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn forms() {
        let options = table();
        let tokens = tokens(&[
            "--output", "a", "--output=b", "-o", "c", "-od", "-aa", "e", "-aa=f", "-v",
        ]);
        let mut scanner = Scanner::new(&options, &tokens);
        let values: Vec<_> = scanner.by_ref().map(|e| e.unwrap()).collect();
        assert_eq!(
            values,
            vec![
                Event { id: -3, value: Some("a") },
                Event { id: -3, value: Some("b") },
                Event { id: -3, value: Some("c") },
                Event { id: -3, value: Some("d") },
                Event { id: -4, value: Some("e") },
                Event { id: -4, value: Some("f") },
                Event { id: -2, value: None },
            ]
        );
        assert!(scanner.remaining().is_empty());
    }

    #[test]
    fn positionals_are_permuted() {
        let options = table();
        let tokens = tokens(&["one", "-v", "two", "-", "--output", "x", "three"]);
        let mut scanner = Scanner::new(&options, &tokens);
        assert_eq!(scanner.by_ref().count(), 2);
        assert_eq!(scanner.remaining(), vec!["one", "two", "-", "three"]);
    }

    #[test]
    fn double_dash_stops() {
        let options = table();
        let tokens = tokens(&["-v", "--", "-v", "--output"]);
        let mut scanner = Scanner::new(&options, &tokens);
        assert_eq!(scanner.next(), Some(Ok(Event { id: -2, value: None })));
        assert_eq!(scanner.next(), None);
        assert_eq!(scanner.remaining(), vec!["-v", "--output"]);
    }

    #[test]
    fn value_may_look_like_option() {
        let options = table();
        let tokens = tokens(&["--output", "-v"]);
        let mut scanner = Scanner::new(&options, &tokens);
        assert_eq!(scanner.next(), Some(Ok(Event { id: -3, value: Some("-v") })));
    }

    #[test]
    fn errors() {
        let options = table();
        let check = |raw: &[&str], expected: ScanError| {
            let tokens = tokens(raw);
            let mut scanner = Scanner::new(&options, &tokens);
            assert_eq!(scanner.next(), Some(Err(expected)));
        };
        check(&["--nope"], ScanError::Unknown("--nope".to_string()));
        check(&["-x"], ScanError::Unknown("-x".to_string()));
        check(&["-vv"], ScanError::Unknown("-vv".to_string()));
        check(&["--output"], ScanError::MissingValue("--output".to_string()));
        check(&["-o"], ScanError::MissingValue("-o".to_string()));
        check(&["--verbose=1"], ScanError::UnexpectedValue("--verbose=1".to_string()));
    }
}
