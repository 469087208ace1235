//! Two-stage decoding of data pills: find the `_dp('...')` call in the
//! surrounding text, then decode its argument (dotted path or JSON object).

use serde::Deserialize;
use serde_json::Value;

use super::{DataPillRef, MalformedPill, PathSegment, PillOutcome, SyntaxForm};

const SNIPPET_LEN: usize = 80;

/// Decode every pill in a single string value.
///
/// Plain literals yield nothing. `#{...}` that does not wrap a pill call is
/// ordinary text.
pub fn parse_str(input: &str) -> Vec<PillOutcome> {
    match input.strip_prefix('=') {
        Some(formula) => parse_formula(formula),
        None => parse_interpolated(input),
    }
}

/// True if the string holds at least one pill, well-formed or not.
pub fn contains_pill(input: &str) -> bool {
    !parse_str(input).is_empty()
}

/// Values computed at runtime: formulas and strings carrying pills.
pub fn is_dynamic(input: &str) -> bool {
    input.starts_with('=') || contains_pill(input)
}

fn parse_interpolated(input: &str) -> Vec<PillOutcome> {
    let mut outcomes = Vec::new();
    let mut remaining = input;

    while let Some(start) = remaining.find("#{") {
        let after_open = &remaining[start + 2..];
        let Some(args) = strip_call(after_open.trim_start()) else {
            remaining = after_open;
            continue;
        };

        // A pill never runs into the next `#{`.
        let (region, next) = args.split_at(args.find("#{").unwrap_or(args.len()));
        let pill_text = &remaining[start..remaining.len() - next.len()];

        let Some((arg, rest)) = split_quoted_arg(region) else {
            outcomes.push(malformed(
                "Data pill argument is not a closed quoted string",
                pill_text,
            ));
            remaining = next;
            continue;
        };

        match rest.trim_start().strip_prefix('}') {
            Some(after_close) => {
                outcomes.push(decode_arg(arg, SyntaxForm::Interpolation));
                remaining = &args[region.len() - after_close.len()..];
            }
            None => {
                outcomes.push(malformed("Data pill is not closed with '}'", pill_text));
                remaining = next;
            }
        }
    }

    outcomes
}

fn parse_formula(formula: &str) -> Vec<PillOutcome> {
    let mut outcomes = Vec::new();
    let mut remaining = formula;

    // Anything after the closing paren (`.upcase`, `+ ...`) is opaque.
    while let Some((start, args)) = find_call(remaining) {
        let limit = find_call(args).map_or(args.len(), |(next, _)| next);
        let (region, next) = args.split_at(limit);

        match split_quoted_arg(region) {
            Some((arg, rest)) => {
                outcomes.push(decode_arg(arg, SyntaxForm::Formula));
                remaining = &args[region.len() - rest.len()..];
            }
            None => {
                let pill_text = &remaining[start..remaining.len() - next.len()];
                outcomes.push(malformed(
                    "Data pill argument is not a closed quoted string",
                    pill_text,
                ));
                remaining = next;
            }
        }
    }

    outcomes
}

/// Strip a leading `_dp(` or `_(`, returning the text after the paren.
fn strip_call(s: &str) -> Option<&str> {
    s.strip_prefix("_dp(").or_else(|| s.strip_prefix("_("))
}

/// First pill call in a formula that is not the tail of a longer identifier.
fn find_call(s: &str) -> Option<(usize, &str)> {
    for (idx, _) in s.match_indices('_') {
        let preceded_by_ident = s[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if preceded_by_ident {
            continue;
        }
        if let Some(args) = strip_call(&s[idx..]) {
            return Some((idx, args));
        }
    }
    None
}

/// Split `'arg')rest` into `(arg, rest)`. Accepts single or double quotes.
fn split_quoted_arg(args: &str) -> Option<(&str, &str)> {
    let args = args.trim_start();
    let quote = args.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = &args[1..];
    let closing: String = [quote, ')'].iter().collect();
    let end = body.find(closing.as_str())?;
    Some((&body[..end], &body[end + 2..]))
}

fn decode_arg(arg: &str, form: SyntaxForm) -> PillOutcome {
    let arg = arg.trim();
    if arg.starts_with('{') {
        decode_json(arg, form)
    } else {
        decode_dotted(arg, form)
    }
}

#[derive(Deserialize)]
struct PillPayload {
    pill_type: Option<String>,
    provider: Option<String>,
    line: Option<String>,
    path: Option<Vec<Value>>,
}

fn decode_json(json: &str, form: SyntaxForm) -> PillOutcome {
    let payload: PillPayload = match serde_json::from_str(json) {
        Ok(p) => p,
        Err(e) => {
            return malformed(format!("Data pill JSON could not be decoded: {}", e), json);
        }
    };

    match payload.pill_type.as_deref() {
        Some("output") => {}
        Some(other) => {
            return PillOutcome::Other {
                pill_type: other.to_string(),
            };
        }
        None => return malformed("Data pill JSON has no 'pill_type'", json),
    }

    let Some(line) = payload.line.filter(|l| !l.trim().is_empty()) else {
        return malformed("Output data pill has no 'line' naming its source block", json);
    };

    let mut field_path = Vec::new();
    for segment in payload.path.unwrap_or_default() {
        match segment {
            Value::String(key) => field_path.push(PathSegment::Key(key)),
            Value::Number(ref n) if n.is_u64() => {
                let Some(index) = n.as_u64().and_then(|i| usize::try_from(i).ok()) else {
                    return malformed(format!("Data pill path index {} is out of range", n), json);
                };
                field_path.push(PathSegment::Index(index));
            }
            other => {
                return malformed(
                    format!(
                        "Data pill path segment must be a string or non-negative integer, found {}",
                        other
                    ),
                    json,
                );
            }
        }
    }

    PillOutcome::Reference(DataPillRef {
        provider: payload.provider,
        source_alias: line,
        field_path,
        syntax_form: form,
    })
}

fn decode_dotted(path: &str, form: SyntaxForm) -> PillOutcome {
    let Some(rest) = path.strip_prefix("data.") else {
        return malformed("Dotted data pill must start with 'data.'", path);
    };

    let segments: Vec<&str> = rest.split('.').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return malformed("Dotted data pill has an empty path segment", path);
    }
    if let Some(bad) = segments.iter().find(|s| !is_plain_segment(s)) {
        return malformed(
            format!("Dotted data pill has an invalid path segment '{}'", bad),
            path,
        );
    }
    if segments.len() < 2 {
        return malformed(
            "Dotted data pill must name a provider and a source block alias",
            path,
        );
    }

    PillOutcome::Reference(DataPillRef {
        provider: Some(segments[0].to_string()),
        source_alias: segments[1].to_string(),
        field_path: segments[2..].iter().map(|s| parse_segment(s)).collect(),
        syntax_form: form,
    })
}

/// Quotes, braces, parens and whitespace only show up in a segment when the
/// surrounding pill syntax is broken.
fn is_plain_segment(s: &str) -> bool {
    !s.chars()
        .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '{' | '}' | '(' | ')' | '#'))
}

fn parse_segment(s: &str) -> PathSegment {
    s.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .and_then(|inner| inner.parse::<usize>().ok())
        .map(PathSegment::Index)
        .unwrap_or_else(|| PathSegment::Key(s.to_string()))
}

fn malformed(message: impl Into<String>, source: &str) -> PillOutcome {
    PillOutcome::Malformed(MalformedPill {
        message: message.into(),
        snippet: source.chars().take(SNIPPET_LEN).collect(),
    })
}
