// AST to Graphviz DOT converter
//
//  Copyright (C) 2026 The ast2dot Authors
//
//  This file is part of ast2dot.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Convert a parser AST dump into a Graphviz DOT graph.
//!
//! The input is parser debug output containing the AST between marker
//!   lines,
//!     or just the AST XML with `--plain`.
//! DOT is written to standard output unless `-o` is given.
//!
//! Logging is written to standard error and configured via the
//!   `AST2DOT_LOG` environment variable
//!     (e.g. `AST2DOT_LOG=debug`).

extern crate ast2dot;

use ast2dot::{
    ast_to_dot,
    filter::FilterConfig,
    fs::{Input, Output},
    Config, InputMode,
};
use getopts::{Fail, Options};
use std::{env, fmt, io};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "AST2DOT_LOG";

/// Types of commands
#[derive(Debug, PartialEq)]
enum Command {
    Convert(ConvertOptions),
    Usage,
}

#[derive(Debug, PartialEq)]
struct ConvertOptions {
    input: String,
    output: Option<String>,
    config: Config,
}

/// Entrypoint for the converter
pub fn main() {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = get_opts();
    let usage = opts.usage(&format!("Usage: {} [OPTIONS] INPUT", program));

    match parse_options(opts, args) {
        Ok(Command::Convert(options)) => {
            init_tracing();
            std::process::exit(convert(&options));
        }
        Ok(Command::Usage) => {
            println!("{}", usage);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", usage);
            std::process::exit(exitcode::USAGE);
        }
    }
}

/// Perform the conversion,
///   returning the process exit code.
///
/// A failed conversion removes its output file,
///   so that a partial graph is never mistaken for a complete one.
fn convert(options: &ConvertOptions) -> exitcode::ExitCode {
    let input = match Input::open(&options.input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: cannot open `{}`: {}", options.input, e);
            return exitcode::NOINPUT;
        }
    };

    let mut output = match Output::create(options.output.as_ref()) {
        Ok(output) => output,
        Err(e) => {
            eprintln!(
                "error: cannot create `{}`: {}",
                options.output.as_deref().unwrap_or("<stdout>"),
                e
            );
            return exitcode::CANTCREAT;
        }
    };

    match ast_to_dot(input, &mut output, &options.config) {
        Ok(_) => {
            debug!(input = %options.input, "conversion complete");
            exitcode::OK
        }
        Err(e) => {
            eprintln!("error: {}", e);

            if let Err(rm) = output.abandon() {
                error!("failed to remove incomplete output: {rm}");
            }

            if e.is_data_error() {
                exitcode::DATAERR
            } else {
                exitcode::IOERR
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Get 'Options'
fn get_opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "p",
        "plain",
        "input contains only XML, without other parser debug output",
    );
    opts.optopt(
        "o",
        "output",
        "path to output file; standard output if not specified",
        "FILE",
    );
    opts.optopt(
        "",
        "lookback",
        "bytes before the end marker to search for a newline",
        "N",
    );
    opts.optflag("h", "help", "print this help menu");

    opts
}

/// Command line error.
#[derive(Debug, PartialEq)]
enum UsageError {
    Opts(Fail),
    InvalidLookback(String),
}

impl From<Fail> for UsageError {
    fn from(e: Fail) -> Self {
        Self::Opts(e)
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opts(e) => fmt::Display::fmt(e, f),
            Self::InvalidLookback(n) => {
                write!(f, "Invalid --lookback `{n}`: expected a byte count.")
            }
        }
    }
}

/// Option parser
fn parse_options(
    opts: Options,
    args: Vec<String>,
) -> Result<Command, UsageError> {
    let matches = opts.parse(&args[1..])?;

    if matches.opt_present("h") {
        return Ok(Command::Usage);
    }

    let input = match matches.free.len() {
        0 => return Err(Fail::OptionMissing(String::from("INPUT")).into()),
        1 => matches.free[0].clone(),
        _ => {
            return Err(
                Fail::UnrecognizedOption(matches.free[1].clone()).into()
            )
        }
    };

    let mode = if matches.opt_present("p") {
        InputMode::Plain
    } else {
        InputMode::Filtered
    };

    let filter = match matches.opt_str("lookback") {
        Some(n) => FilterConfig::with_lookback(
            n.parse().map_err(|_| UsageError::InvalidLookback(n.clone()))?,
        ),
        None => FilterConfig::default(),
    };

    Ok(Command::Convert(ConvertOptions {
        input,
        output: matches.opt_str("o"),
        config: Config { mode, filter },
    }))
}
