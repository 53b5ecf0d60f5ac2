use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::value,
    IResult,
};
use crate::parser::lexer::ws;
use crate::spec::SortDirection;

/// Format: sort(asc), sort(desc), sort(ascending), sort(descending)
pub fn parse_sort(input: &str) -> IResult<&str, SortDirection> {
    let (input, _) = ws(tag("sort"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, direction) = ws(alt((
        value(SortDirection::Ascending, tag("ascending")),
        value(SortDirection::Descending, tag("descending")),
        value(SortDirection::Ascending, tag("asc")),
        value(SortDirection::Descending, tag("desc")),
    )))(input)?;
    let (input, _) = ws(char(')'))(input)?;

    Ok((input, direction))
}
