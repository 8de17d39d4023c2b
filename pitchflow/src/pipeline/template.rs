//! Prompt templates with `{key}` placeholders.

use crate::context::SharedContext;
use crate::errors::TemplateResolutionError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed prompt template.
///
/// Placeholders are identifiers in single braces (`{refined_idea}`). A doubled
/// brace (`{{` or `}}`) renders as a literal brace. Any other brace is kept
/// verbatim, so free-form prompt text never fails to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
    placeholders: Vec<String>,
}

impl PromptTemplate {
    /// Parses a template.
    #[must_use]
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut placeholders: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in token_pattern().captures_iter(&source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            literal.push_str(&source[last..whole.start()]);
            last = whole.end();

            match caps.get(1) {
                Some(name) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let name = name.as_str().to_string();
                    if !placeholders.contains(&name) {
                        placeholders.push(name.clone());
                    }
                    segments.push(Segment::Placeholder(name));
                }
                None if whole.as_str() == "{{" => literal.push('{'),
                None => literal.push('}'),
            }
        }

        literal.push_str(&source[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source,
            segments,
            placeholders,
        }
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns referenced keys, deduplicated, in order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Renders the template against a context.
    ///
    /// # Errors
    ///
    /// Returns `TemplateResolutionError` naming the first placeholder with no
    /// value in the context.
    pub fn render(&self, context: &SharedContext) -> Result<String, TemplateResolutionError> {
        self.render_with(|key| context.get(key))
    }

    /// Renders the template with an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns `TemplateResolutionError` if the lookup yields `None` for a
    /// placeholder.
    pub fn render_with<'a, F>(&self, lookup: F) -> Result<String, TemplateResolutionError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(key) => {
                    let value = lookup(key).ok_or_else(|| TemplateResolutionError::new(key))?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for PromptTemplate {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<String> for PromptTemplate {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}
