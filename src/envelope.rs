//! Generated-file envelope: banner, line-length directive and newline normalisation.

use crate::config::OutputFormat;

pub const BANNER: &[&str] = &[
    "/**",
    " * This file is generated by frontgen. Do not edit it by hand.",
    " * Changes will be overwritten the next time the generator runs.",
    " */",
];

pub const MAX_LEN_DIRECTIVE: &str = "/* eslint-disable max-len */";

#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    format: OutputFormat,
    /// None disables the line-length check
    max_line_length: Option<usize>,
}

impl Envelope {
    pub fn new(format: OutputFormat, max_line_length: Option<usize>) -> Self {
        Self {
            format,
            max_line_length: max_line_length.filter(|n| *n > 0),
        }
    }

    pub fn wrap(&self, body: &str) -> String {
        let normalized = body.replace("\r\n", "\n").replace('\r', "\n");
        let mut body_lines: Vec<&str> = normalized.split('\n').collect();
        while body_lines.last().is_some_and(|l| l.trim().is_empty()) {
            body_lines.pop();
        }

        let mut lines: Vec<String> = Vec::new();
        if self.format != OutputFormat::Json {
            lines.extend(BANNER.iter().map(|l| l.to_string()));
            lines.push(String::new());
        }
        lines.extend(body_lines.iter().map(|l| l.to_string()));

        let too_long = match self.max_line_length {
            Some(max) if self.format != OutputFormat::Json => {
                lines.iter().any(|l| l.chars().count() > max)
            }
            _ => false,
        };
        if too_long {
            lines.insert(0, MAX_LEN_DIRECTIVE.to_string());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
