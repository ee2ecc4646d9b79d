//! Template rendering for prm files.
//!
//! Supported syntax:
//! - `{{ name }}` and `{{ nested.name }}` substitute values from a JSON
//!   context; a numeric segment indexes into an array (`{{ items.0 }}`)
//! - `{# ... #}` comments are dropped
//! - `{% ... %}` statement tags are rejected at parse time
//! - a `-` just inside a tag (`{{-`, `-}}`, `{#-`, `-#}`) trims the
//!   whitespace on that side of the tag
//!
//! Undefined values render as the empty string. One trailing newline at the
//! end of the template source is dropped.

use camino::Utf8Path;
use ggops_utils::error::TemplateError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static PATH_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Value(Vec<String>),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Read and parse the template at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.as_std_path().to_path_buf(),
            source,
        })?;
        Self::parse(path.as_str(), &source)
    }

    /// Parse template `source`; `name` is used in error messages.
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let source = source
            .strip_suffix("\r\n")
            .or_else(|| source.strip_suffix('\n'))
            .unwrap_or(source);

        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0usize;
        let mut trim_next = false;

        loop {
            let next_tag = [rest.find("{{"), rest.find("{#"), rest.find("{%")]
                .into_iter()
                .flatten()
                .min();

            let Some(start) = next_tag else {
                push_text(&mut segments, rest, trim_next, false);
                break;
            };

            let line = line_at(source, consumed + start);
            if rest[start..].starts_with("{%") {
                return Err(syntax(name, line, "unsupported statement tag".to_string()));
            }
            let is_comment = rest[start..].starts_with("{#");
            let close = if is_comment { "#}" } else { "}}" };

            let mut inner_start = start + 2;
            let trim_before = rest[inner_start..].starts_with('-');
            if trim_before {
                inner_start += 1;
            }
            push_text(&mut segments, &rest[..start], trim_next, trim_before);

            let Some(close_offset) = rest[inner_start..].find(close) else {
                return Err(syntax(
                    name,
                    line,
                    format!("unterminated '{}' tag", &rest[start..start + 2]),
                ));
            };
            let mut inner = &rest[inner_start..inner_start + close_offset];
            trim_next = inner.ends_with('-');
            if trim_next {
                inner = &inner[..inner.len() - 1];
            }

            if !is_comment {
                let expr = inner.trim();
                if expr.is_empty() {
                    return Err(syntax(name, line, "empty expression".to_string()));
                }
                if !PATH_EXPR.is_match(expr) {
                    return Err(syntax(
                        name,
                        line,
                        format!("unsupported expression '{expr}'"),
                    ));
                }
                segments.push(Segment::Value(expr.split('.').map(str::to_string).collect()));
            }

            let tag_end = inner_start + close_offset + close.len();
            consumed += tag_end;
            rest = &rest[tag_end..];
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against `context`.
    #[must_use]
    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Value(path) => {
                    if let Some(value) = lookup(context, path) {
                        push_value(&mut out, value);
                    }
                }
            }
        }
        out
    }
}

fn syntax(name: &str, line: usize, reason: String) -> TemplateError {
    TemplateError::Syntax {
        template: name.to_string(),
        line,
        reason,
    }
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

fn push_text(segments: &mut Vec<Segment>, text: &str, trim_start: bool, trim_end: bool) {
    let text = if trim_start { text.trim_start() } else { text };
    let text = if trim_end { text.trim_end() } else { text };
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
}

fn lookup<'a>(context: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(context, |value, key| match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}
