/// A parsed command line. Parsing never fails: unrecognized names become
/// [`Command::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Exit,
    Ls { path: Option<String> },
    Cd { path: Option<String> },
    Tree { path: Option<String> },
    /// `name` is only set when exactly one argument was given
    Mkdir { name: Option<String> },
    Tail { path: Option<String> },
    Uptime,
    ConfDump,
    Unknown { name: String },
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Command::Empty;
        };
        let args: Vec<&str> = tokens.collect();
        let first = args.first().map(|arg| arg.to_string());

        match name {
            "exit" => Command::Exit,
            "ls" => Command::Ls { path: first },
            "cd" => Command::Cd { path: first },
            "tree" => Command::Tree { path: first },
            "mkdir" => Command::Mkdir {
                name: first.filter(|_| args.len() == 1),
            },
            "tail" => Command::Tail { path: first },
            "uptime" => Command::Uptime,
            "conf-dump" => Command::ConfDump,
            _ => Command::Unknown {
                name: name.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Empty => "",
            Command::Exit => "exit",
            Command::Ls { .. } => "ls",
            Command::Cd { .. } => "cd",
            Command::Tree { .. } => "tree",
            Command::Mkdir { .. } => "mkdir",
            Command::Tail { .. } => "tail",
            Command::Uptime => "uptime",
            Command::ConfDump => "conf-dump",
            Command::Unknown { name } => name,
        }
    }
}
