// Light filesystem abstractions
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

//! Input and output endpoints for the command line.
//!
//!   - [`Input`] reads from a file or,
//!       given the path [`STDIN_PATH`],
//!       from standard input; and
//!   - [`Output`] writes to a created file or to standard output.
//!
//! Both are buffered.

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Result, Write};
use std::path::{Path, PathBuf};

/// Input path denoting standard input.
pub const STDIN_PATH: &str = "-";

/// A source of input.
pub enum Input {
    Stdin(io::StdinLock<'static>),
    File(BufReader<fs::File>),
}

impl Input {
    /// Open `path` for reading,
    ///   or lock standard input if `path` is [`STDIN_PATH`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.as_os_str() == STDIN_PATH {
            return Ok(Self::Stdin(io::stdin().lock()));
        }

        fs::File::open(path).map(|file| Self::File(BufReader::new(file)))
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Self::Stdin(stdin) => stdin.read(buf),
            Self::File(file) => file.read(buf),
        }
    }
}

impl BufRead for Input {
    fn fill_buf(&mut self) -> Result<&[u8]> {
        match self {
            Self::Stdin(stdin) => stdin.fill_buf(),
            Self::File(file) => file.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Self::Stdin(stdin) => stdin.consume(amt),
            Self::File(file) => file.consume(amt),
        }
    }
}

/// A destination for output.
pub enum Output {
    Stdout(BufWriter<io::Stdout>),
    /// A created file,
    ///   along with its path so that it may be removed if its contents
    ///   are abandoned.
    File(BufWriter<fs::File>, PathBuf),
}

impl Output {
    /// Create (or truncate) the file at `path`,
    ///   or use standard output if no path is given.
    pub fn create<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            None => Ok(Self::Stdout(BufWriter::new(io::stdout()))),
            Some(path) => {
                let path = path.as_ref().to_path_buf();
                let file = fs::File::create(&path)?;

                Ok(Self::File(BufWriter::new(file), path))
            }
        }
    }

    /// Discard the output,
    ///   removing the file if one was created.
    ///
    /// Output already written to standard output cannot be recalled.
    pub fn abandon(self) -> Result<()> {
        match self {
            Self::Stdout(_) => Ok(()),
            Self::File(file, path) => {
                drop(file);
                fs::remove_file(path)
            }
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            Self::Stdout(stdout) => stdout.write(buf),
            Self::File(file, _) => file.write(buf),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            Self::Stdout(stdout) => stdout.flush(),
            Self::File(file, _) => file.flush(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn input_reads_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ast.xml");
        fs::write(&path, "<Root/>\nsecond line\n")?;

        let mut input = Input::open(&path)?;
        let mut line = String::new();
        input.read_line(&mut line)?;

        assert_eq!(line, "<Root/>\n");
        Ok(())
    }

    #[test]
    fn input_missing_file_fails() {
        let err = Input::open("does/not/exist.xml")
            .err()
            .expect("expected failure");

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn output_creates_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ast.dot");

        let mut output = Output::create(Some(&path))?;
        output.write_all(b"digraph AST {\n}\n")?;
        output.flush()?;
        drop(output);

        assert_eq!(fs::read_to_string(&path)?, "digraph AST {\n}\n");
        Ok(())
    }

    #[test]
    fn abandoned_output_file_is_removed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("partial.dot");

        let mut output = Output::create(Some(&path))?;
        output.write_all(b"digraph AST {\n")?;
        assert!(path.exists());

        output.abandon()?;
        assert!(!path.exists());
        Ok(())
    }
}
