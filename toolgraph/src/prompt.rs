//! String prompt templates with `{name}` variables.
//!
//! `{{` and `}}` render as literal braces, so JSON examples can sit inside a template.

use std::collections::BTreeMap;

use crate::error::AgentError;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Var(String),
}

/// A parsed template plus any partially bound variables.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    partials: BTreeMap<String, String>,
}

impl PromptTemplate {
    /// Parses `text`. An unmatched `{` or `}` is a parse error.
    pub fn from_template(text: &str) -> Result<Self, AgentError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(AgentError::Parse(format!(
                                    "unclosed '{{' in template near '{}'",
                                    name
                                )))
                            }
                        }
                    }
                    let name = name.trim().to_string();
                    if name.is_empty() {
                        return Err(AgentError::Parse("empty template variable".to_string()));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Var(name));
                }
                '}' => {
                    return Err(AgentError::Parse(
                        "single '}' in template; use '}}' for a literal brace".to_string(),
                    ))
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            segments,
            partials: BTreeMap::new(),
        })
    }

    /// Binds `name` ahead of time; later `format` calls may still override it.
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.partials.insert(name.into(), value.into());
        self
    }

    /// Variable names in first-appearance order, including partially bound ones.
    pub fn input_variables(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for s in &self.segments {
            if let Segment::Var(v) = s {
                if !seen.contains(&v.as_str()) {
                    seen.push(v.as_str());
                }
            }
        }
        seen
    }

    /// Renders the template. Fails with `MissingPromptVariable` on the first unbound variable.
    pub fn format(&self, values: &[(&str, &str)]) -> Result<String, AgentError> {
        let mut out = String::new();
        for s in &self.segments {
            match s {
                Segment::Literal(l) => out.push_str(l),
                Segment::Var(name) => {
                    let value = values
                        .iter()
                        .find(|(k, _)| *k == name.as_str())
                        .map(|(_, v)| *v)
                        .or_else(|| self.partials.get(name).map(|v| v.as_str()))
                        .ok_or_else(|| AgentError::MissingPromptVariable(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}
