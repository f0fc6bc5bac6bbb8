#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Reading clause text and writing solutions.
//!
//! Two input dialects are understood:
//!
//! - [`Dialect::Plain`]: one clause per line, literals are whitespace-separated
//!   signed integers. There is no header and no terminator, so a `0` token is
//!   kept as a literal and rejected when the [`Cnf`] is built. Blank lines are
//!   skipped.
//! - [`Dialect::Dimacs`]: the DIMACS CNF format. Lines starting with `c`
//!   (comments) or `p` (the problem line) are skipped, a `%` line ends the
//!   data, and `0` terminates a clause, so a clause may span several lines or
//!   share a line with others. The counts on the problem line are not
//!   enforced; they are derived from the clauses found.
//!
//! Solutions are written one signed literal per line: magnitude is the
//! variable identity, sign is the value.

use crate::sat::cnf::Cnf;
use crate::sat::error::{Result, SatError};
use clap::ValueEnum;
use itertools::Itertools;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Input text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Dialect {
    /// One clause per line, no header, no terminator.
    #[default]
    Plain,
    /// DIMACS CNF with comments, a problem line and `0`-terminated clauses.
    Dimacs,
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Dimacs => write!(f, "dimacs"),
        }
    }
}

impl Dialect {
    /// Picks [`Dialect::Dimacs`] when the text carries a `p cnf` problem line
    /// before its first clause, [`Dialect::Plain`] otherwise.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                None | Some("c") => {}
                Some("p") => {
                    return if parts.next() == Some("cnf") {
                        Self::Dimacs
                    } else {
                        Self::Plain
                    };
                }
                Some(_) => return Self::Plain,
            }
        }
        Self::Plain
    }
}

fn parse_literal(token: &str, line: usize) -> Result<i32> {
    token.parse::<i32>().map_err(|_| SatError::Parse {
        line,
        token: token.to_string(),
    })
}

/// Reads clauses as signed-integer lists without validating them.
///
/// # Errors
///
/// - `SatError::Parse` for a token that is not a 32-bit signed integer.
/// - `SatError::Io` if reading fails.
pub fn parse_clauses<R: BufRead>(reader: R, dialect: Dialect) -> Result<Vec<Vec<i32>>> {
    let mut clauses = Vec::new();
    let mut pending: Vec<i32> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let mut parts = line.split_whitespace().peekable();

        match dialect {
            Dialect::Plain => {
                if parts.peek().is_none() {
                    continue;
                }
                clauses.push(
                    parts
                        .map(|t| parse_literal(t, line_no))
                        .collect::<Result<Vec<_>>>()?,
                );
            }
            Dialect::Dimacs => match parts.peek() {
                Some(&"%") => break,
                None | Some(&"c" | &"p") => {}
                Some(_) => {
                    for token in parts {
                        match parse_literal(token, line_no)? {
                            0 => clauses.push(std::mem::take(&mut pending)),
                            lit => pending.push(lit),
                        }
                    }
                }
            },
        }
    }

    if !pending.is_empty() {
        clauses.push(pending);
    }
    Ok(clauses)
}

/// Reads and validates an instance.
///
/// # Errors
///
/// Anything [`parse_clauses`] or [`Cnf::new`] reports.
pub fn parse_cnf<R: BufRead>(reader: R, dialect: Dialect) -> Result<Cnf> {
    Cnf::new(parse_clauses(reader, dialect)?)
}

/// Reads an instance from a file, detecting the dialect when `dialect` is `None`.
///
/// # Errors
///
/// `SatError::Io` if the file cannot be read, otherwise see [`parse_cnf`].
pub fn parse_file<P: AsRef<Path>>(path: P, dialect: Option<Dialect>) -> Result<Cnf> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    let dialect = dialect.unwrap_or_else(|| Dialect::detect(&text));
    parse_cnf(Cursor::new(text), dialect)
}

/// Writes one literal per line, joined by `\n` with no trailing newline.
///
/// # Errors
///
/// `SatError::Io` if writing fails.
pub fn write_solution<W: Write>(mut writer: W, literals: &[i32]) -> Result<()> {
    write!(writer, "{}", literals.iter().join("\n"))?;
    writer.flush()?;
    Ok(())
}

/// [`write_solution`] into a newly created (or truncated) file.
///
/// # Errors
///
/// `SatError::Io` if the file cannot be created or written.
pub fn write_solution_file<P: AsRef<Path>>(path: P, literals: &[i32]) -> Result<()> {
    write_solution(BufWriter::new(File::create(path)?), literals)
}

/// Reads back a solution written by [`write_solution`]. Any whitespace
/// separates literals.
///
/// # Errors
///
/// `SatError::Parse` for a non-integer token, `SatError::Io` if reading fails.
pub fn parse_solution<R: BufRead>(reader: R) -> Result<Vec<i32>> {
    let mut literals = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        for token in line.split_whitespace() {
            literals.push(parse_literal(token, i + 1)?);
        }
    }
    Ok(literals)
}

/// Recursively collects the instance files (`.cnf` or `.txt`) under `dir`, sorted by path.
///
/// # Errors
///
/// `SatError::Io` if `dir` is not a readable directory.
pub fn find_instances<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(SatError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        )));
    }

    Ok(walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "cnf" || ext == "txt"))
        .collect())
}

/// Opens a file for buffered reading.
///
/// # Errors
///
/// `SatError::Io` if the file cannot be opened.
pub fn open<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::error::MalformedReason;

    #[test]
    fn test_parse_plain() {
        let text = "1 -2\n\n  2 3  \n-3\n";
        let clauses = parse_clauses(Cursor::new(text), Dialect::Plain).unwrap();
        assert_eq!(clauses, vec![vec![1, -2], vec![2, 3], vec![-3]]);
    }

    #[test]
    fn test_plain_zero_is_rejected_by_instance() {
        let err = parse_cnf(Cursor::new("1 2\n3 0\n"), Dialect::Plain).unwrap_err();
        assert!(matches!(
            err,
            SatError::MalformedClause {
                clause: 1,
                reason: MalformedReason::ZeroLiteral
            }
        ));
    }

    #[test]
    fn test_parse_simple_dimacs() {
        let text = "c This is a comment\n\
                    p cnf 3 2\n\
                    1 -2 0\n\
                    2 3 0\n";
        let cnf = parse_cnf(Cursor::new(text), Dialect::Dimacs).unwrap();
        assert_eq!(cnf.num_clauses(), 2);
        assert_eq!(cnf.num_vars(), 3);
        assert_eq!(cnf.to_string(), "1 -2\n2 3\n");
    }

    #[test]
    fn test_dimacs_clauses_span_lines_and_end_marker() {
        let text = "p cnf 3 3\n1 2\n-3 0 2 0\n\n-1 0\n%\n0\nc ignored\n";
        let clauses = parse_clauses(Cursor::new(text), Dialect::Dimacs).unwrap();
        assert_eq!(clauses, vec![vec![1, 2, -3], vec![2], vec![-1]]);
    }

    #[test]
    fn test_dimacs_unterminated_last_clause() {
        let clauses = parse_clauses(Cursor::new("1 2 0\n3"), Dialect::Dimacs).unwrap();
        assert_eq!(clauses, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_dimacs_lone_zero_is_empty_clause() {
        let err = parse_cnf(Cursor::new("p cnf 1 2\n1 0\n0\n"), Dialect::Dimacs).unwrap_err();
        assert!(matches!(
            err,
            SatError::MalformedClause {
                clause: 1,
                reason: MalformedReason::Empty
            }
        ));
    }

    #[test]
    fn test_bad_token() {
        let err = parse_clauses(Cursor::new("1 2\n1 abc\n"), Dialect::Plain).unwrap_err();
        assert!(matches!(err, SatError::Parse { line: 2, ref token } if token == "abc"));
    }

    #[test]
    fn test_detect() {
        assert_eq!(Dialect::detect("c hi\np cnf 2 1\n1 2 0\n"), Dialect::Dimacs);
        assert_eq!(Dialect::detect("1 2\n-1\n"), Dialect::Plain);
        assert_eq!(Dialect::detect("1 2\np cnf 2 1\n"), Dialect::Plain);
        assert_eq!(Dialect::detect(""), Dialect::Plain);
    }

    #[test]
    fn test_solution_format() {
        let mut out = Vec::new();
        write_solution(&mut out, &[1, -2, 3]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n-2\n3");

        let back = parse_solution(Cursor::new("1\n-2\n3")).unwrap();
        assert_eq!(back, vec![1, -2, 3]);
    }

    #[test]
    fn test_solution_file_round_trip() {
        let cnf = Cnf::new([vec![7, -2], vec![2, 9]]).unwrap();
        let path = std::env::temp_dir().join(format!("walksat-solution-{}.txt", std::process::id()));

        write_solution_file(&path, &[2, 7, 9]).unwrap();
        let literals = parse_solution(open(&path).unwrap()).unwrap();
        assert_eq!(literals, vec![2, 7, 9]);
        assert!(cnf.verify(&literals).unwrap());

        // 2 true with 7 false falsifies [7, -2]
        write_solution_file(&path, &[2, -7, 9]).unwrap();
        let literals = parse_solution(open(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(!cnf.verify(&literals).unwrap());
    }

    #[test]
    fn test_parse_file_detects_dialect() {
        let dir = std::env::temp_dir().join(format!("walksat-parse-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("a.cnf"), "p cnf 2 1\n1 -2 0\n").unwrap();
        std::fs::write(dir.join("nested").join("b.txt"), "1\n2\n").unwrap();
        std::fs::write(dir.join("notes.md"), "not an instance").unwrap();

        let files = find_instances(&dir).unwrap();
        assert_eq!(files.len(), 2);

        let a = parse_file(dir.join("a.cnf"), None).unwrap();
        assert_eq!(a.num_clauses(), 1);
        let b = parse_file(dir.join("nested").join("b.txt"), None).unwrap();
        assert_eq!(b.num_clauses(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
        assert!(find_instances(&dir).is_err());
    }
}
