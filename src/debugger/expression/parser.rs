//! Breakpoint predicate parser.
use crate::debugger::expression::{BinaryOp, CompileError, Expression, UnaryOp};
use chumsky::prelude::*;
use chumsky::Parser;
use itertools::Itertools;

type Err<'a> = extra::Err<Rich<'a, char>>;

/// Word operators, can't be used as identifiers.
const KEYWORDS: &[&str] = &["and", "or", "not"];

fn number<'a>() -> impl Parser<'a, &'a str, f64, Err<'a>> + Clone {
    let prefix = just("0x").or(just("0X"));
    let hex = prefix.ignore_then(
        text::digits(16)
            .at_least(1)
            .to_slice()
            .try_map(|s: &str, span| {
                i64::from_str_radix(s, 16)
                    .map(|v| v as f64)
                    .map_err(|e| Rich::custom(span, e))
            }),
    );

    let decimal = text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .from_str::<f64>()
        .unwrapped();

    hex.or(decimal).labelled("number")
}

/// Identifier, possibly hierarchical: `a`, `data.valid`, `mem.0`.
fn identifier<'a>() -> impl Parser<'a, &'a str, String, Err<'a>> + Clone {
    let segment = text::ascii::ident().or(text::int(10));
    text::ascii::ident()
        .then(just('.').then(segment).repeated())
        .to_slice()
        .try_map(|name: &str, span| {
            if KEYWORDS.contains(&name) {
                Err(Rich::custom(span, format!("unexpected keyword `{name}`")))
            } else {
                Ok(name.to_string())
            }
        })
        .labelled("identifier")
}

pub fn parser<'a>() -> impl Parser<'a, &'a str, Expression, Err<'a>> {
    let expr = recursive(|expr| {
        let op = |sym| just(sym).padded();
        let kw = |word| text::ascii::keyword(word).padded();

        let atom = number()
            .map(Expression::Constant)
            .or(identifier().map(Expression::Symbol))
            .or(expr.delimited_by(op("("), op(")")))
            .padded();

        let unary = choice((
            op("-").to(UnaryOp::Neg),
            op("!").to(UnaryOp::Not),
            kw("not").to(UnaryOp::Not),
        ))
        .repeated()
        .foldr(atom, |un_op, rhs| Expression::Unary(un_op, Box::new(rhs)))
        .boxed();

        let product = unary
            .clone()
            .foldl(
                choice((
                    op("*").to(BinaryOp::Mul),
                    op("/").to(BinaryOp::Div),
                    op("%").to(BinaryOp::Rem),
                ))
                .then(unary)
                .repeated(),
                |lhs, (bin_op, rhs)| Expression::binary(bin_op, lhs, rhs),
            )
            .boxed();

        let sum = product
            .clone()
            .foldl(
                choice((op("+").to(BinaryOp::Add), op("-").to(BinaryOp::Sub)))
                    .then(product)
                    .repeated(),
                |lhs, (bin_op, rhs)| Expression::binary(bin_op, lhs, rhs),
            )
            .boxed();

        let comparison = sum
            .clone()
            .foldl(
                choice((
                    op("<=").to(BinaryOp::Le),
                    op(">=").to(BinaryOp::Ge),
                    op("<").to(BinaryOp::Lt),
                    op(">").to(BinaryOp::Gt),
                ))
                .then(sum)
                .repeated(),
                |lhs, (bin_op, rhs)| Expression::binary(bin_op, lhs, rhs),
            )
            .boxed();

        let equality = comparison
            .clone()
            .foldl(
                choice((
                    op("==").to(BinaryOp::Eq),
                    op("!=").to(BinaryOp::Ne),
                    op("=").to(BinaryOp::Eq),
                ))
                .then(comparison)
                .repeated(),
                |lhs, (bin_op, rhs)| Expression::binary(bin_op, lhs, rhs),
            )
            .boxed();

        let conjunction = equality
            .clone()
            .foldl(
                op("&&")
                    .or(kw("and"))
                    .to(BinaryOp::And)
                    .then(equality)
                    .repeated(),
                |lhs, (bin_op, rhs)| Expression::binary(bin_op, lhs, rhs),
            )
            .boxed();

        conjunction
            .clone()
            .foldl(
                op("||")
                    .or(kw("or"))
                    .to(BinaryOp::Or)
                    .then(conjunction)
                    .repeated(),
                |lhs, (bin_op, rhs)| Expression::binary(bin_op, lhs, rhs),
            )
            .boxed()
    });

    expr.then_ignore(end())
}

/// Parse predicate text into an expression tree.
pub fn parse(text: &str) -> Result<Expression, CompileError> {
    parser()
        .parse(text)
        .into_result()
        .map_err(|errors| CompileError::Syntax(errors.iter().map(|e| e.to_string()).join("; ")))
}
