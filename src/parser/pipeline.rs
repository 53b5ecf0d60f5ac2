// Pipeline parser for chart expressions

use super::geom::parse_chart;
use super::labels::parse_labs;
use super::lexer::ws;
use super::sort::parse_sort;
use crate::spec::{ChartSpec, SortDirection};
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map, opt},
    error::{Error, ErrorKind},
    multi::separated_list1,
    IResult,
};

#[derive(Debug)]
enum PipelineComponent {
    Chart(ChartSpec),
    Sort(SortDirection),
    Title(Option<String>),
}

fn parse_pipeline_component(input: &str) -> IResult<&str, PipelineComponent> {
    alt((
        map(parse_chart, PipelineComponent::Chart),
        map(parse_sort, PipelineComponent::Sort),
        map(parse_labs, PipelineComponent::Title),
    ))(input)
}

/// Parse a complete chart expression
/// Format: chart | sort(...) | labs(...), components in any order
pub fn parse_chart_spec(input: &str) -> IResult<&str, ChartSpec> {
    // Optional: consume leading "df"
    let (input, _) = opt(ws(tag("df")))(input)?;

    // If input starts with "|", consume it
    let (input, _) = opt(ws(tag("|")))(input)?;

    let (input, components) = separated_list1(ws(tag("|")), parse_pipeline_component)(input)?;

    // Consume trailing whitespace and ensure end of input
    let (input, _) = ws(eof)(input)?;

    let mut chart = None;
    let mut sort = None;
    let mut title = None;

    for comp in components {
        match comp {
            PipelineComponent::Chart(c) => {
                if chart.is_some() {
                    // exactly one chart per expression
                    return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
                }
                chart = Some(c);
            }
            PipelineComponent::Sort(s) => sort = Some(s),
            PipelineComponent::Title(t) => title = t,
        }
    }

    let Some(chart) = chart else {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    };

    let chart = chart.with_sort(sort);
    Ok((
        input,
        match title {
            Some(t) => chart.with_title(t),
            None => chart,
        },
    ))
}
