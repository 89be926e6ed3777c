//! Command-line validation for the demo binary.

/// Fixed usage message printed when validation fails.
pub const USAGE: &str = "\
Usage: poolrun <number-of-jobs> <number-of-threads>
Both arguments must be positive integers: the first is the number of jobs
to submit, the second the number of worker threads in the pool.";

/// The single error produced by command-line validation.
///
/// Missing tokens, unparseable integers, and non-positive values all
/// collapse into this one kind; the remediation is the same for each:
/// re-run with two positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected two positive integer arguments")]
pub struct InvalidArguments;

/// Parses the raw argument list into `(number_of_jobs, number_of_threads)`.
///
/// Only the first two tokens are read; anything after them is ignored.
///
/// # Errors
///
/// Returns [`InvalidArguments`] if fewer than two tokens are present, either
/// token is not an integer, or either value is less than 1.
pub fn parse<I>(args: I) -> Result<(usize, usize), InvalidArguments>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let number_of_jobs = parse_positive(args.next())?;
    let number_of_threads = parse_positive(args.next())?;
    Ok((number_of_jobs, number_of_threads))
}

fn parse_positive(token: Option<String>) -> Result<usize, InvalidArguments> {
    match token.ok_or(InvalidArguments)?.parse::<usize>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(InvalidArguments),
    }
}
