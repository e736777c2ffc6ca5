use snafu::Snafu;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(super)))]
pub enum CommandError {
    #[snafu(display("{}: no such file or directory", path))]
    NotFound { path: String },
    #[snafu(display("{}: not a directory", path))]
    NotADirectory { path: String },
    #[snafu(display("{}: is a directory", path))]
    IsADirectory { path: String },
    #[snafu(display("{}: already exists", path))]
    AlreadyExists { path: String },
    #[snafu(display("missing operand, usage: {}", usage))]
    MissingArgument { usage: &'static str },
    #[snafu(display("{}: command not found", name))]
    UnknownCommand { name: String },
}
