//! NAIF text kernel pool
//!
//! Parses text kernels (leapseconds, SCLK, frame and instrument kernels) into
//! a variable pool. Only the lines between `\begindata` and the next
//! `\begintext` are data; everything else is commentary. Supported syntax:
//!
//! ```text
//! NAME  = scalar
//! NAME  = ( v1, v2  v3 )        commas are optional
//! NAME += ( v4 )                append to an existing variable
//! ```
//!
//! Values are numbers (Fortran `D` exponents allowed), single-quoted strings
//! (`''` is an embedded quote) or `@` date literals, which are stored as
//! formal UTC seconds past J2000.

use std::collections::HashMap;

use crate::error::{EphemerisError, Result};
use crate::utils::time_utils::parse_utc_seconds;

const BEGIN_DATA: &str = "\\begindata";
const BEGIN_TEXT: &str = "\\begintext";

/// Value of one pool variable
#[derive(Debug, Clone, PartialEq)]
pub enum PoolValue {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl PoolValue {
    fn type_name(&self) -> &'static str {
        match self {
            PoolValue::Numeric(_) => "numeric",
            PoolValue::Text(_) => "string",
        }
    }
}

/// Variables loaded from text kernels
#[derive(Debug, Default, Clone)]
pub struct KernelPool {
    vars: HashMap<String, PoolValue>,
}

impl KernelPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load text kernel contents; `source_name` is only used in error messages
    ///
    /// Returns the names assigned by this text, in first-seen order. On error
    /// the pool is left unchanged.
    pub fn load_str(&mut self, source_name: &str, text: &str) -> Result<Vec<String>> {
        let assignments = Parser::new(source_name, &data_section(text)).parse()?;

        let mut assigned: Vec<String> = Vec::new();
        let mut staged = self.vars.clone();
        for assignment in assignments {
            let Assignment {
                name,
                append,
                value,
                line,
            } = assignment;
            if !assigned.contains(&name) {
                assigned.push(name.clone());
            }
            match (append, staged.get_mut(&name)) {
                (true, Some(existing)) => match (existing, value) {
                    (PoolValue::Numeric(old), PoolValue::Numeric(new)) => old.extend(new),
                    (PoolValue::Text(old), PoolValue::Text(new)) => old.extend(new),
                    (existing, value) => {
                        return Err(EphemerisError::KernelParse {
                            source_name: source_name.to_string(),
                            line,
                            message: format!(
                                "cannot append {} values to {} variable {name}",
                                value.type_name(),
                                existing.type_name()
                            ),
                        })
                    }
                },
                _ => {
                    staged.insert(name, value);
                }
            }
        }

        self.vars = staged;
        Ok(assigned)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Numeric values of a variable, `None` if absent or not numeric
    pub fn numbers(&self, name: &str) -> Option<&[f64]> {
        match self.vars.get(name) {
            Some(PoolValue::Numeric(v)) => Some(v),
            _ => None,
        }
    }

    /// String values of a variable, `None` if absent or not a string variable
    pub fn strings(&self, name: &str) -> Option<&[String]> {
        match self.vars.get(name) {
            Some(PoolValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    /// First numeric value
    pub fn number(&self, name: &str) -> Option<f64> {
        self.numbers(name).and_then(|v| v.first().copied())
    }

    /// First numeric value as an integer code
    pub fn integer(&self, name: &str) -> Option<i32> {
        self.number(name).map(|v| v.round() as i32)
    }

    /// First string value
    pub fn string(&self, name: &str) -> Option<&str> {
        self.strings(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Numeric values that must be exactly `N` long
    pub fn fixed_numbers<const N: usize>(&self, name: &str) -> Option<[f64; N]> {
        self.numbers(name).and_then(|v| v.try_into().ok())
    }
}

/// Blank out every line that is not inside a data block, keeping line numbers
fn data_section(text: &str) -> String {
    let mut in_data = false;
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        match line.trim() {
            BEGIN_DATA => in_data = true,
            BEGIN_TEXT => in_data = false,
            _ if in_data => out.push_str(line),
            _ => {}
        }
        out.push('\n');
    }
    out
}

#[derive(Debug)]
struct Assignment {
    name: String,
    append: bool,
    value: PoolValue,
    line: usize,
}

enum Scalar {
    Number(f64),
    Text(String),
}

struct Parser<'a> {
    source_name: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(source_name: &'a str, data: &str) -> Self {
        Self {
            source_name,
            chars: data.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> EphemerisError {
        EphemerisError::KernelParse {
            source_name: self.source_name.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn read_until(&mut self, stop: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || stop(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn parse(mut self) -> Result<Vec<Assignment>> {
        let mut assignments = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                return Ok(assignments);
            }
            assignments.push(self.parse_assignment()?);
        }
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let line = self.line;
        let name = self.read_until(|c| matches!(c, '=' | '+' | '(' | ')' | '\'' | ','));
        if name.is_empty() {
            return Err(self.error(format!(
                "expected a variable name, found '{}'",
                self.peek().unwrap_or(' ')
            )));
        }

        self.skip_whitespace();
        let append = match self.bump() {
            Some('=') => false,
            Some('+') if self.peek() == Some('=') => {
                self.bump();
                true
            }
            _ => return Err(self.error(format!("expected '=' or '+=' after {name}"))),
        };

        self.skip_whitespace();
        let scalars = if self.peek() == Some('(') {
            self.bump();
            self.parse_list()?
        } else {
            vec![self.parse_scalar()?]
        };

        let value = collect_values(scalars).ok_or_else(|| {
            EphemerisError::KernelParse {
                source_name: self.source_name.to_string(),
                line,
                message: format!("variable {name} mixes numeric and string values"),
            }
        })?;

        Ok(Assignment {
            name,
            append,
            value,
            line,
        })
    }

    fn parse_list(&mut self) -> Result<Vec<Scalar>> {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error("unterminated value list")),
                Some(')') => {
                    self.bump();
                    return Ok(values);
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => values.push(self.parse_scalar()?),
            }
        }
    }

    fn parse_scalar(&mut self) -> Result<Scalar> {
        match self.peek() {
            None => Err(self.error("missing value")),
            Some('\'') => self.parse_string().map(Scalar::Text),
            Some('@') => {
                self.bump();
                let literal = self.read_until(|c| matches!(c, ',' | ')'));
                parse_utc_seconds(&literal)
                    .map(Scalar::Number)
                    .map_err(|e| self.error(format!("bad date literal @{literal}: {e}")))
            }
            Some(_) => {
                let token = self.read_until(|c| matches!(c, ',' | ')' | '(' | '='));
                if token.is_empty() {
                    return Err(self.error(format!(
                        "unexpected '{}' in value",
                        self.peek().unwrap_or(' ')
                    )));
                }
                token
                    .replace(['D', 'd'], "E")
                    .parse::<f64>()
                    .map(Scalar::Number)
                    .map_err(|_| self.error(format!("invalid number '{token}'")))
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        // Opening quote
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.bump();
                        out.push('\'');
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }
}

fn collect_values(scalars: Vec<Scalar>) -> Option<PoolValue> {
    match scalars.first() {
        None | Some(Scalar::Number(_)) => scalars
            .into_iter()
            .map(|s| match s {
                Scalar::Number(v) => Some(v),
                Scalar::Text(_) => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(PoolValue::Numeric),
        Some(Scalar::Text(_)) => scalars
            .into_iter()
            .map(|s| match s {
                Scalar::Text(v) => Some(v),
                Scalar::Number(_) => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(PoolValue::Text),
    }
}
