//! Command line grammar

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    Execute(String),
    Install(String),
    Uninstall(String),
    ListInstalled,
    Exit,
    /// Anything the grammar doesn't recognise, kept verbatim (trimmed)
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Create,
    Execute,
    Install,
    Uninstall,
    ListInstalled,
    Exit,
}

struct Rule {
    prefix: &'static str,
    verb: Verb,
    takes_arg: bool,
}

/// Ordered longest prefix first; `parse` takes the first rule that matches.
const GRAMMAR: &[Rule] = &[
    Rule { prefix: "apt list --installed", verb: Verb::ListInstalled, takes_arg: false },
    Rule { prefix: "sudo apt uninstall", verb: Verb::Uninstall, takes_arg: true },
    Rule { prefix: "sudo apt install", verb: Verb::Install, takes_arg: true },
    Rule { prefix: "packager -new", verb: Verb::Create, takes_arg: true },
    Rule { prefix: "packager -run", verb: Verb::Execute, takes_arg: true },
    Rule { prefix: "exit", verb: Verb::Exit, takes_arg: false },
];

impl Command {
    /// Parse a single input line.
    ///
    /// Verbs that take an argument need at least one whitespace character
    /// between the verb and the argument; the argument is trimmed and handed
    /// on as-is, even when empty. Verbs without arguments must match the
    /// whole line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        for rule in GRAMMAR {
            let Some(rest) = line.strip_prefix(rule.prefix) else {
                continue;
            };

            if !rule.takes_arg {
                if rest.is_empty() {
                    return rule.verb.build(String::new());
                }
                continue;
            }

            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rule.verb.build(rest.trim().to_string());
            }
        }

        Command::Unknown(line.to_string())
    }
}

impl Verb {
    fn build(self, arg: String) -> Command {
        match self {
            Verb::Create => Command::Create(arg),
            Verb::Execute => Command::Execute(arg),
            Verb::Install => Command::Install(arg),
            Verb::Uninstall => Command::Uninstall(arg),
            Verb::ListInstalled => Command::ListInstalled,
            Verb::Exit => Command::Exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_is_longest_first() {
        let lengths: Vec<usize> = GRAMMAR.iter().map(|r| r.prefix.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn test_parse_verbs() {
        assert_eq!(Command::parse("packager -new calc"), Command::Create("calc".into()));
        assert_eq!(Command::parse("packager -run calc"), Command::Execute("calc".into()));
        assert_eq!(Command::parse("sudo apt install calc"), Command::Install("calc".into()));
        assert_eq!(Command::parse("sudo apt uninstall calc"), Command::Uninstall("calc".into()));
        assert_eq!(Command::parse("apt list --installed"), Command::ListInstalled);
        assert_eq!(Command::parse("exit"), Command::Exit);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(Command::parse("  exit \n"), Command::Exit);
        assert_eq!(
            Command::parse("\tsudo apt install    calc   "),
            Command::Install("calc".into())
        );
        assert_eq!(Command::parse("   "), Command::Unknown(String::new()));
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn test_empty_argument_passed_through() {
        assert_eq!(Command::parse("packager -new"), Command::Create(String::new()));
        assert_eq!(Command::parse("packager -new    "), Command::Create(String::new()));
        assert_eq!(Command::parse("sudo apt install"), Command::Install(String::new()));
    }

    #[test]
    fn test_argument_keeps_inner_text() {
        assert_eq!(
            Command::parse("packager -new my pkg"),
            Command::Create("my pkg".into())
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(Command::parse("foo bar"), Command::Unknown("foo bar".into()));
        assert_eq!(Command::parse("  foo bar "), Command::Unknown("foo bar".into()));
        assert_eq!(Command::parse("exit now"), Command::Unknown("exit now".into()));
        assert_eq!(Command::parse("exits"), Command::Unknown("exits".into()));
        assert_eq!(
            Command::parse("apt list --installed calc"),
            Command::Unknown("apt list --installed calc".into())
        );
        assert_eq!(
            Command::parse("packager -newcalc"),
            Command::Unknown("packager -newcalc".into())
        );
        assert_eq!(Command::parse("EXIT"), Command::Unknown("EXIT".into()));
    }

    #[test]
    fn test_install_is_not_misrouted_as_uninstall() {
        assert_eq!(
            Command::parse("sudo apt uninstall install"),
            Command::Uninstall("install".into())
        );
        assert_eq!(
            Command::parse("sudo apt install uninstall"),
            Command::Install("uninstall".into())
        );
    }
}
