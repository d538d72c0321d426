//! Shell line splitting: first word selects the command, the rest are
//! arguments looked up by position.

/// One committed input line, split lazily on whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    name: &'a str,
    args: &'a str,
}

impl<'a> CommandLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some((name, args)) => Self { name, args },
            None => Self { name: line, args: "" },
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// `n`th argument, 0-based.
    pub fn arg(&self, n: usize) -> Option<&'a str> {
        self.args.split_whitespace().nth(n)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_args() {
        let line = CommandLine::parse("  sleep \t 250   x ");
        assert_eq!(line.name(), "sleep");
        assert_eq!(line.arg(0), Some("250"));
        assert_eq!(line.arg(1), Some("x"));
        assert_eq!(line.arg(2), None);
    }

    #[test]
    fn test_blank_line() {
        assert!(CommandLine::parse(" \t ").is_empty());
        assert_eq!(CommandLine::parse("").arg(0), None);
    }

    #[test]
    fn test_bare_command() {
        let line = CommandLine::parse("stats");
        assert_eq!(line.name(), "stats");
        assert_eq!(line.arg(0), None);
    }
}
