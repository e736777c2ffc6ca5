use std::io::{self, BufRead, Write};

use colored::Colorize;
use snafu::Snafu;
use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::filesystem::VfsLoader;
use crate::interpreter::{Interpreter, Outcome, SessionInfo};
use crate::script::ScriptRunner;

const WELCOME: &str = "VFS emulator v1.0. Type 'exit' to quit.";

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let tree = VfsLoader::load_or_empty(app_config.vfs_path.as_deref()).await;
        let mut interpreter = Interpreter::new(tree, SessionInfo::from(&app_config));

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{WELCOME}\n").context(StdoutSnafu)?;

        if let Some(script_path) = &app_config.script_path {
            info!("Running startup script {}", script_path.display());
            let lines = ScriptRunner::new(&mut interpreter).run_file(script_path).await;
            write_lines(&mut stdout, &lines)?;
            debug!(
                "Root after startup script: {:?}",
                interpreter.tree().root().list()
            );
        }

        let color = supports_color::on(Stream::Stdout).is_some();
        Self::repl(&mut interpreter, io::stdin().lock(), &mut stdout, color)
    }

    /// Reads commands from `input` until `exit` or end of input, writing the
    /// prompt and every output line to `output`.
    fn repl(
        interpreter: &mut Interpreter,
        mut input: impl BufRead,
        output: &mut impl Write,
        color: bool,
    ) -> Result<(), ApplicationError> {
        loop {
            let prompt = interpreter.prompt();
            let prompt = if color {
                prompt.green().to_string()
            } else {
                prompt
            };
            write!(output, "{prompt}").context(StdoutSnafu)?;
            output.flush().context(StdoutSnafu)?;

            let mut buffer = Vec::new();
            if input.read_until(b'\n', &mut buffer).context(StdinSnafu)? == 0 {
                debug!("End of input reached");
                writeln!(output).context(StdoutSnafu)?;
                return Ok(());
            }

            // Invalid UTF-8 is replaced rather than ending the session
            let line = String::from_utf8_lossy(&buffer);
            match interpreter.execute(&line) {
                Outcome::Continue(lines) => write_lines(output, &lines)?,
                Outcome::Exit => {
                    info!("Exit requested in {}", interpreter.current_directory());
                    return Ok(());
                }
            }
        }
    }
}

fn write_lines(output: &mut impl Write, lines: &[String]) -> Result<(), ApplicationError> {
    for line in lines {
        writeln!(output, "{line}").context(StdoutSnafu)?;
    }
    Ok(())
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Failed to read from standard input"))]
    StdinError { source: io::Error },
    #[snafu(display("Failed to write to standard output"))]
    StdoutError { source: io::Error },
}
