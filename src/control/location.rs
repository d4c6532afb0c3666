use crate::control::CommandError;
use chumsky::error::Rich;
use chumsky::prelude::{end, just, none_of};
use chumsky::{extra, IterParser, Parser};
use itertools::Itertools;

type Err<'a> = extra::Err<Rich<'a, char>>;

/// Source location in the client tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
}

fn segments<'a>() -> impl Parser<'a, &'a str, Vec<&'a str>, Err<'a>> {
    none_of(":")
        .repeated()
        .to_slice()
        .separated_by(just(':'))
        .at_least(2)
        .collect::<Vec<_>>()
        .then_ignore(end())
}

fn number(segment: &str) -> Option<u32> {
    segment.trim().parse().ok()
}

/// Parse `file:line[:column]`. A file name may contain `:` itself, so the trailing
/// segments are tried as `line:column` first and as `line` if that fails.
pub fn parse_location(text: &str) -> Result<Location, CommandError> {
    let invalid = || CommandError::InvalidLocation(text.to_string());
    let segments = segments().parse(text.trim()).into_result().map_err(|_| invalid())?;

    let n = segments.len();
    let (file, line, column) = match (n >= 3)
        .then(|| number(segments[n - 2]).zip(number(segments[n - 1])))
        .flatten()
    {
        Some((line, column)) => (&segments[..n - 2], line, Some(column)),
        None => {
            let line = number(segments[n - 1]).ok_or_else(invalid)?;
            (&segments[..n - 1], line, None)
        }
    };

    let file = file.iter().join(":");
    if file.trim().is_empty() {
        return Err(invalid());
    }
    Ok(Location {
        file: file.trim().to_string(),
        line,
        column,
    })
}
