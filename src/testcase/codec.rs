//! Text format for test-case suites
//!
//! A suite file starts with the number of cases, followed by one block per
//! case:
//!
//! ```text
//! # --- Test Case 1 ---
//! Input:
//! N M P
//! <N rows of A>
//! <M rows of B>
//! Output:
//! <N rows of C>
//! ```
//!
//! Each row is `k col_1 val_1 ... col_k val_k`, or `0` for an empty row.
//! Input rows keep insertion order; output rows are written as stored, which
//! for products of the reference multiplier means ascending columns.

use std::collections::HashSet;
use std::fmt::{Display, Write as _};
use std::io::{self, Write};

use num_traits::Num;

use crate::constants::*;
use crate::error::{CodecError, MatrixError};
use crate::matrix::SparseMatrix;
use crate::testcase::TestCase;

/// Decoded input block: dimensions and both operands
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInput {
    pub n: usize,
    pub m: usize,
    pub p: usize,
    pub a: SparseMatrix<i64>,
    pub b: SparseMatrix<i64>,
}

/// One recognised segment of a suite file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCase {
    /// 1-based position among recognised segments
    pub case_num: usize,
    /// Dimension line plus A and B rows, blank lines removed
    pub input: String,
    /// Rows after the `Output:` marker, blank lines removed
    pub output: String,
}

// ============================================================================
// WRITING
// ============================================================================

/// Row `i` of `matrix` in sparse row format
pub fn format_row<T>(matrix: &SparseMatrix<T>, i: usize) -> String
where
    T: Copy + Num + Display,
{
    let mut line = matrix.row_nnz(i).to_string();
    for (col, val) in matrix.row_iter(i) {
        // Writing into a String cannot fail
        let _ = write!(line, " {} {}", col, val);
    }
    line
}

/// Writes every row of `matrix`, one per line
pub fn write_matrix<W, T>(w: &mut W, matrix: &SparseMatrix<T>) -> io::Result<()>
where
    W: Write,
    T: Copy + Num + Display,
{
    for i in 0..matrix.n_rows {
        writeln!(w, "{}", format_row(matrix, i))?;
    }
    Ok(())
}

/// Writes one case block
///
/// The `Output:` marker is always written so the block stays parseable; its
/// rows follow only when `include_output` is set and the case carries C.
pub fn write_test_case<W: Write>(
    w: &mut W,
    case: &TestCase,
    include_output: bool,
) -> io::Result<()> {
    writeln!(w, "{} {} ---", CASE_SEPARATOR, case.id)?;
    writeln!(w, "{}", INPUT_MARKER)?;
    writeln!(w, "{} {} {}", case.n, case.m, case.p)?;
    write_matrix(w, &case.a)?;
    write_matrix(w, &case.b)?;
    writeln!(w, "{}", OUTPUT_MARKER)?;
    if include_output {
        if let Some(c) = &case.c {
            write_matrix(w, c)?;
        }
    }
    Ok(())
}

/// Writes the case count header followed by every case
pub fn write_suite<W: Write>(w: &mut W, cases: &[TestCase], include_output: bool) -> io::Result<()> {
    writeln!(w, "{}", cases.len())?;
    for case in cases {
        write_test_case(w, case, include_output)?;
    }
    w.flush()
}

// ============================================================================
// READING
// ============================================================================

/// Parses one row in sparse row format
///
/// `line_no` is only used for error reporting; `row` and `n_cols` check the
/// decoded entries against the matrix invariants.
pub fn parse_row(
    line: &str,
    line_no: usize,
    row: usize,
    n_cols: usize,
) -> Result<Vec<(usize, i64)>, CodecError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let declared: usize = match tokens.first() {
        Some(tok) => parse_token(tok, line_no)?,
        None => return Err(CodecError::UnexpectedEof(format!("empty row at line {}", line_no))),
    };

    if declared.checked_mul(2).map(|d| d + 1) != Some(tokens.len()) {
        return Err(CodecError::RowLength {
            line: line_no,
            declared,
            tokens: tokens.len() - 1,
        });
    }

    let mut seen = HashSet::with_capacity(declared);
    let mut entries = Vec::with_capacity(declared);
    for pair in tokens[1..].chunks_exact(2) {
        let col: usize = parse_token(pair[0], line_no)?;
        let val: i64 = parse_token(pair[1], line_no)?;

        if col >= n_cols {
            return Err(CodecError::Matrix {
                line: line_no,
                source: MatrixError::ColumnOutOfBounds { row, col, n_cols },
            });
        }
        if !seen.insert(col) {
            return Err(CodecError::Matrix {
                line: line_no,
                source: MatrixError::DuplicateColumn { row, col },
            });
        }
        entries.push((col, val));
    }

    Ok(entries)
}

fn parse_token<F: std::str::FromStr>(token: &str, line_no: usize) -> Result<F, CodecError> {
    token.parse().map_err(|_| CodecError::InvalidToken {
        line: line_no,
        token: token.to_string(),
    })
}

/// Non-blank lines of `text` with their 1-based line numbers
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn read_rows<'a, I>(
    lines: &mut I,
    n_rows: usize,
    n_cols: usize,
    what: &str,
) -> Result<SparseMatrix<i64>, CodecError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    // n_rows comes from the dimension line; grow with the rows actually present
    let mut rows = Vec::new();
    for row in 0..n_rows {
        let (line_no, line) = lines.next().ok_or_else(|| {
            CodecError::UnexpectedEof(format!("{} has {} of {} rows", what, row, n_rows))
        })?;
        rows.push(parse_row(line, line_no, row, n_cols)?);
    }
    Ok(SparseMatrix::from_rows(n_rows, n_cols, rows)?)
}

/// Reads `N M P` from the first non-blank line of an input block
pub fn parse_dimensions(block: &str) -> Option<(usize, usize, usize)> {
    let (_, line) = content_lines(block).next()?;
    let dims: Vec<usize> = line
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match dims.as_slice() {
        &[n, m, p] => Some((n, m, p)),
        _ => None,
    }
}

/// Decodes an input block (dimension line, N rows of A, M rows of B)
pub fn parse_input_block(block: &str) -> Result<ProblemInput, CodecError> {
    let mut lines = content_lines(block);

    let (line_no, header) = lines
        .next()
        .ok_or_else(|| CodecError::UnexpectedEof("missing dimension line".to_string()))?;
    let dims = header
        .split_whitespace()
        .map(|tok| parse_token::<usize>(tok, line_no))
        .collect::<Result<Vec<_>, _>>()?;
    let (n, m, p) = match dims.as_slice() {
        &[n, m, p] => (n, m, p),
        _ => {
            return Err(CodecError::InvalidToken {
                line: line_no,
                token: header.to_string(),
            })
        }
    };

    let a = read_rows(&mut lines, n, m, "A")?;
    let b = read_rows(&mut lines, m, p, "B")?;

    if let Some((line, _)) = lines.next() {
        return Err(CodecError::TrailingRow { line });
    }

    Ok(ProblemInput { n, m, p, a, b })
}

/// Decodes an output block of `n` rows with `p` columns
pub fn parse_output_rows(block: &str, n: usize, p: usize) -> Result<SparseMatrix<i64>, CodecError> {
    let mut lines = content_lines(block);
    let c = read_rows(&mut lines, n, p, "C")?;
    if let Some((line, _)) = lines.next() {
        return Err(CodecError::TrailingRow { line });
    }
    Ok(c)
}

/// The case count declared on the first non-blank line of a suite file
pub fn declared_case_count(content: &str) -> Option<usize> {
    content_lines(content)
        .next()
        .and_then(|(_, line)| line.parse().ok())
}

/// Splits a suite file into raw case blocks
///
/// Segments lacking an `Input:` line followed by an `Output:` line, or with
/// nothing between the two, are dropped without error. Callers needing
/// strict validation compare the result's length with
/// `declared_case_count`.
pub fn split_cases(content: &str) -> Vec<RawCase> {
    let mut cases = Vec::new();

    for segment in content.split(CASE_SEPARATOR).skip(1) {
        let lines: Vec<&str> = segment.lines().map(str::trim_end).collect();

        let mut input_start = None;
        let mut output_start = None;
        for (j, line) in lines.iter().enumerate() {
            match line.trim() {
                INPUT_MARKER => input_start = Some(j + 1),
                OUTPUT_MARKER => {
                    output_start = Some(j);
                    break;
                }
                _ => {}
            }
        }

        let (start, end) = match (input_start, output_start) {
            (Some(start), Some(end)) if start <= end => (start, end),
            _ => continue,
        };

        let input = join_non_blank(&lines[start..end]);
        if input.is_empty() {
            continue;
        }

        cases.push(RawCase {
            case_num: cases.len() + 1,
            input,
            output: join_non_blank(&lines[end + 1..]),
        });
    }

    cases
}

fn join_non_blank(lines: &[&str]) -> String {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes every recognised case of a suite file into a `TestCase`
///
/// C is present when the case's output block is non-empty.
pub fn read_suite(content: &str) -> Result<Vec<TestCase>, CodecError> {
    split_cases(content)
        .into_iter()
        .map(|raw| {
            let input = parse_input_block(&raw.input)?;
            let c = if raw.output.is_empty() {
                None
            } else {
                Some(parse_output_rows(&raw.output, input.n, input.p)?)
            };
            Ok(TestCase {
                id: raw.case_num,
                n: input.n,
                m: input.m,
                p: input.p,
                a: input.a,
                b: input.b,
                c,
            })
        })
        .collect()
}
