// Chart component parsers: bar/line/scatter/pie

use super::lexer::{column_name, ws};
use crate::spec::{ChartKind, ChartSpec};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, value},
    error::{Error, ErrorKind},
    multi::separated_list0,
    sequence::preceded,
    IResult,
};

/// Parse an axis chart
/// Format: bar(x: col, y: col), line(...), scatter(...) or point(...)
pub fn parse_axes_chart(input: &str) -> IResult<&str, ChartSpec> {
    let start = input;
    let (input, kind) = ws(alt((
        value(ChartKind::Bar, tag("bar")),
        value(ChartKind::Line, tag("line")),
        value(ChartKind::Scatter, tag("scatter")),
        value(ChartKind::Scatter, tag("point")),
    )))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(
        ws(char(',')),
        alt((
            map(preceded(ws(tag("x:")), ws(column_name)), |c| ("x", c)),
            map(preceded(ws(tag("y:")), ws(column_name)), |c| ("y", c)),
        )),
    )(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut x = None;
    let mut y = None;
    for (key, col) in args {
        match key {
            "x" => x = Some(col),
            "y" => y = Some(col),
            _ => {}
        }
    }

    match (x, y) {
        (Some(x), Some(y)) => Ok((input, ChartSpec::axes(kind, x, y))),
        _ => Err(nom::Err::Error(Error::new(start, ErrorKind::Verify))),
    }
}

/// Parse a pie chart
/// Format: pie(category: col, value: col)
pub fn parse_pie_chart(input: &str) -> IResult<&str, ChartSpec> {
    let start = input;
    let (input, _) = ws(tag("pie"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(
        ws(char(',')),
        alt((
            map(preceded(ws(tag("category:")), ws(column_name)), |c| ("category", c)),
            map(preceded(ws(tag("value:")), ws(column_name)), |c| ("value", c)),
        )),
    )(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut category = None;
    let mut val = None;
    for (key, col) in args {
        match key {
            "category" => category = Some(col),
            "value" => val = Some(col),
            _ => {}
        }
    }

    match (category, val) {
        (Some(category), Some(val)) => Ok((input, ChartSpec::pie(category, val))),
        _ => Err(nom::Err::Error(Error::new(start, ErrorKind::Verify))),
    }
}

pub fn parse_chart(input: &str) -> IResult<&str, ChartSpec> {
    alt((parse_pie_chart, parse_axes_chart))(input)
}
