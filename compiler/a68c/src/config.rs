//! Command line and driver configuration.
//!
//! Arguments are parsed by hand: a subcommand, a file, and flags in any
//! position. Flags taking a value accept it as the next argument or
//! after `=`.

use std::path::PathBuf;

use a68_diagnostic::emitter::ColorMode;
use a68_diagnostic::MAX_ERRORS;
use a68_ir::{Options, Stropping};

use crate::DriverError;

/// Optimise level of a bare `-O` or `--optimise`, and of `compile` when
/// no level is given.
pub const DEFAULT_OPTIMISE: u8 = 2;

/// Everything the driver needs besides the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub options: Options,
    /// Errors tolerated before a phase gives up (0 = unlimited).
    pub error_limit: usize,
    pub color: ColorMode,
    /// Write the generated C here instead of standard output.
    pub emit_c: Option<PathBuf>,
    pub include_paths: Vec<PathBuf>,
    /// Print the tree after the front end.
    pub listing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            options: Options::default(),
            error_limit: MAX_ERRORS,
            color: ColorMode::Auto,
            emit_c: None,
            include_paths: Vec::new(),
            listing: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Front end only.
    Check(PathBuf),
    /// Front end and C generator.
    Compile(PathBuf),
    /// Front end, then the final mode list.
    Modes(PathBuf),
    Help,
    Version,
}

impl Command {
    pub fn file(&self) -> Option<&PathBuf> {
        match self {
            Command::Check(path) | Command::Compile(path) | Command::Modes(path) => Some(path),
            Command::Help | Command::Version => None,
        }
    }
}

/// Parse the arguments after the program name.
pub fn parse_args(args: &[String]) -> Result<(Command, Config), DriverError> {
    let mut config = Config::default();
    let mut optimise: Option<u8> = None;
    let mut positional: Vec<&str> = Vec::new();
    let mut args = args.iter().map(String::as_str);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (arg, None),
        };
        let mut value = |name: &str| -> Result<String, DriverError> {
            inline
                .map(str::to_owned)
                .or_else(|| args.next().map(str::to_owned))
                .ok_or_else(|| DriverError::usage(format!("{name} needs a value")))
        };
        match flag {
            "--upper-stropping" => config.options.stropping = Stropping::Upper,
            "--quote-stropping" => config.options.stropping = Stropping::Quote,
            "--portcheck" => config.options.portcheck = true,
            "--reductions" => config.options.reductions = true,
            "--brackets" => config.options.brackets = true,
            "--tree" => config.listing = true,
            "--optimise" | "--optimize" => {
                optimise = Some(match inline {
                    Some(level) => parse_level(level)?,
                    None => DEFAULT_OPTIMISE,
                });
            }
            "--emit-c" => config.emit_c = Some(PathBuf::from(value("--emit-c")?)),
            "--error-limit" => {
                let text = value("--error-limit")?;
                config.error_limit = text
                    .parse()
                    .map_err(|_| DriverError::usage(format!("invalid error limit \"{text}\"")))?;
            }
            "--color" | "--colour" => {
                let text = value("--color")?;
                config.color = text.parse().map_err(DriverError::Usage)?;
            }
            "-I" => config.include_paths.push(PathBuf::from(value("-I")?)),
            "-h" | "--help" => positional.insert(0, "help"),
            "-V" | "--version" => positional.insert(0, "version"),
            _ if flag.starts_with("-O") => {
                let level = &flag[2..];
                optimise = Some(if level.is_empty() {
                    DEFAULT_OPTIMISE
                } else {
                    parse_level(level)?
                });
            }
            _ if flag.starts_with("-I") => config.include_paths.push(PathBuf::from(&flag[2..])),
            _ if flag.starts_with('-') && flag.len() > 1 => {
                return Err(DriverError::usage(format!("unknown option \"{arg}\"")));
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.as_slice() {
        [] | ["help", ..] => Command::Help,
        ["version", ..] => Command::Version,
        [command, file] => {
            let path = PathBuf::from(*file);
            match *command {
                "check" => Command::Check(path),
                "compile" => Command::Compile(path),
                "modes" => Command::Modes(path),
                _ => return Err(DriverError::usage(format!("unknown command \"{command}\""))),
            }
        }
        [command] => return Err(DriverError::usage(format!("\"{command}\" needs a source file"))),
        [_, _, extra, ..] => return Err(DriverError::usage(format!("unexpected argument \"{extra}\""))),
    };

    let level = match (optimise, &command) {
        (Some(level), _) => level,
        (None, Command::Compile(_)) => DEFAULT_OPTIMISE,
        (None, _) => 0,
    };
    config.options = config.options.with_optimise(level);
    Ok((command, config))
}

fn parse_level(text: &str) -> Result<u8, DriverError> {
    text.parse()
        .map_err(|_| DriverError::usage(format!("invalid optimise level \"{text}\"")))
}

#[cfg(test)]
mod tests;
