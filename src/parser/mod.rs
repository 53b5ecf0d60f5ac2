// Chart expression parser

pub mod geom;
pub mod labels;
pub mod lexer;
pub mod pipeline;
pub mod sort;

pub use pipeline::parse_chart_spec;

use crate::spec::ChartSpec;
use anyhow::{anyhow, Result};

/// Parse a whole expression, turning nom errors into a readable message
pub fn parse_expression(input: &str) -> Result<ChartSpec> {
    match parse_chart_spec(input) {
        Ok((_, spec)) => Ok(spec),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let position = input.len() - e.input.len();
            Err(anyhow!(
                "Parse error in chart expression at offset {}: near '{}'",
                position,
                e.input.chars().take(20).collect::<String>()
            ))
        }
        Err(nom::Err::Incomplete(_)) => Err(anyhow!("Parse error: incomplete chart expression")),
    }
}
