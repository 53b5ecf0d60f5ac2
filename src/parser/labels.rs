use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::opt,
    sequence::preceded,
    IResult,
};
use crate::parser::lexer::{string_literal, ws};

/// Parse a title label
/// Format: labs(title: "...") or labs()
pub fn parse_labs(input: &str) -> IResult<&str, Option<String>> {
    let (input, _) = ws(tag("labs"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, title) = opt(preceded(ws(tag("title:")), ws(string_literal)))(input)?;
    let (input, _) = ws(char(')'))(input)?;

    Ok((input, title))
}
