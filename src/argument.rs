use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("empty command")]
    Empty,
    #[error("unterminated quoted argument")]
    UnterminatedQuote,
}

/// A named group of positional values: either the command itself or one of its sub-arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub args: Vec<String>,
}

impl Argument {
    fn new(name: String) -> Argument {
        Argument { name, args: vec![] }
    }
}

/// One command line broken into its primary argument followed by any sub-arguments, in the
/// order they appeared.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    arguments: Vec<Argument>,
}

impl Arguments {
    /// Parses `line`, treating any token that case-insensitively matches one of
    /// `sub_arguments` as the start of a new sub-argument. Each name opens a sub-argument at
    /// most once per line; later occurrences are kept as plain values.
    pub fn parse(line: &str, sub_arguments: &[&str]) -> Result<Arguments, Error> {
        Self::from_tokens(tokenize(line)?, sub_arguments)
    }

    /// Groups already tokenized input, see [`Arguments::parse`].
    pub fn from_tokens(tokens: Vec<String>, sub_arguments: &[&str]) -> Result<Arguments, Error> {
        let mut tokens = tokens.into_iter();
        let name = tokens.next().ok_or(Error::Empty)?;

        let mut seen = vec![false; sub_arguments.len()];
        let mut arguments = vec![Argument::new(name)];

        for token in tokens {
            let opens = sub_arguments
                .iter()
                .position(|name| name.eq_ignore_ascii_case(&token))
                .filter(|&i| !seen[i]);

            match opens {
                Some(i) => {
                    seen[i] = true;
                    arguments.push(Argument::new(token));
                }
                None => {
                    if let Some(current) = arguments.last_mut() {
                        current.args.push(token);
                    }
                }
            }
        }

        Ok(Arguments { arguments })
    }

    pub fn primary(&self) -> &Argument {
        &self.arguments[0]
    }

    pub fn sub_argument(&self, name: &str) -> Option<&Argument> {
        self.arguments[1..]
            .iter()
            .find(|argument| argument.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter()
    }
}

/// Splits a line on whitespace. Double quotes group everything up to the closing quote into
/// the current token and are themselves dropped.
pub fn tokenize(line: &str) -> Result<Vec<String>, Error> {
    let mut tokens = vec![];
    let mut current = String::new();
    // An empty pair of quotes still produces a token.
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        if quoted {
            if c == '"' {
                quoted = false;
            } else {
                current.push(c);
            }
            continue;
        }

        match c {
            '"' => {
                quoted = true;
                in_token = true;
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(Error::UnterminatedQuote);
    }

    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}
