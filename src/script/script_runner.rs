use std::io;
use std::path::Path;

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, error};

use crate::interpreter::{Interpreter, Outcome};

const COMMENT_PREFIX: char = '#';

/// Feeds script lines into an [`Interpreter`], echoing each command after the
/// current prompt. `exit` inside a script is ignored.
pub struct ScriptRunner<'a> {
    interpreter: &'a mut Interpreter,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(interpreter: &'a mut Interpreter) -> Self {
        Self { interpreter }
    }

    /// Runs the script at `path`. A script that cannot be read produces a
    /// single error line and nothing else.
    pub async fn run_file(&mut self, path: &Path) -> Vec<String> {
        match read_script(path).await {
            Ok(text) => self.run_lines(text.lines().map(Ok::<_, io::Error>)),
            Err(e) => vec![report(e)],
        }
    }

    /// Runs lines until the source is exhausted or yields a read error, which
    /// is reported once and stops the script.
    pub fn run_lines<I, S>(&mut self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = io::Result<S>>,
        S: AsRef<str>,
    {
        let mut output = Vec::new();

        for (index, line) in lines.into_iter().enumerate() {
            let line = match line.context(LineReadSnafu {
                line_number: index + 1,
            }) {
                Ok(line) => line,
                Err(e) => {
                    output.push(report(e));
                    break;
                }
            };

            let command = line.as_ref().trim();
            if command.is_empty() || command.starts_with(COMMENT_PREFIX) {
                continue;
            }

            output.push(format!("{}{}", self.interpreter.prompt(), command));
            match self.interpreter.execute(command) {
                Outcome::Continue(lines) => output.extend(lines),
                Outcome::Exit => debug!("Ignoring exit on script line {}", index + 1),
            }
        }

        output
    }
}

async fn read_script(path: &Path) -> Result<String, ScriptError> {
    debug!("Opening script: {}", path.display());
    let file_path = path.display().to_string();
    let bytes = fs::read(path).await.context(ReadSnafu {
        file_path: file_path.clone(),
    })?;
    String::from_utf8(bytes).context(EncodingSnafu { file_path })
}

fn report(e: ScriptError) -> String {
    error!("Script execution failed: {e}");
    format!("script execution error: {e}")
}

#[derive(Debug, Snafu)]
pub enum ScriptError {
    #[snafu(display("Failed to read script {}: {}", file_path, source))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Script {} is not valid UTF-8: {}", file_path, source))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to read script line {}: {}", line_number, source))]
    LineReadError {
        line_number: usize,
        source: std::io::Error,
    },
}
