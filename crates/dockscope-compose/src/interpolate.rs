//! Shell-style variable interpolation over raw compose text.
//!
//! Supported forms:
//!
//! | form | result |
//! |---|---|
//! | `$NAME`, `${NAME}` | value, or empty when unset |
//! | `${NAME:-default}`, `${NAME-default}` | value, or `default` when unset or empty |
//! | `${NAME:?message}` | value, or an error when unset or empty |
//! | `${NAME?message}` | value, or an error when unset |
//! | `${NAME:+alt}`, `${NAME+alt}` | `alt` when set, else empty |
//! | `$$` | a literal `$` |
//!
//! Defaults and alternatives are interpolated themselves, so
//! `${A:-${B:-x}}` works.

use std::collections::BTreeMap;

use dockscope_common::error::ConfigError;

/// Variables available to interpolation.
pub type Environment = BTreeMap<String, String>;

/// Substitutes every variable reference in `input`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingVariable`] when a `?` operator fires and
/// [`ConfigError::Interpolation`] on an unterminated or malformed `${`.
pub fn interpolate(input: &str, env: &Environment) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body_start) = after.strip_prefix('{') {
            let end = closing_brace(body_start).ok_or_else(|| ConfigError::Interpolation {
                message: format!("unterminated ${{ in {:?}", excerpt(&rest[pos..])),
            })?;
            out.push_str(&expand(&body_start[..end], env)?);
            rest = &body_start[end + 1..];
        } else {
            let name_len = after
                .char_indices()
                .find(|&(i, c)| !(c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())))
                .map_or(after.len(), |(i, _)| i);
            if name_len == 0 {
                out.push('$');
            } else {
                out.push_str(&lookup_plain(&after[..name_len], env));
            }
            rest = &after[name_len..];
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Finds the `}` matching an already consumed `${`, honouring nesting.
fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 0_usize;
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 1;
            }
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn expand(body: &str, env: &Environment) -> Result<String, ConfigError> {
    let name_len = body
        .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
        .unwrap_or(body.len());
    let (name, operator) = body.split_at(name_len);
    if name.is_empty() {
        return Err(ConfigError::Interpolation {
            message: format!("missing variable name in ${{{body}}}"),
        });
    }

    let value = env.get(name).map(String::as_str);
    let set_and_non_empty = value.is_some_and(|v| !v.is_empty());

    match operator_kind(operator) {
        None if operator.is_empty() => Ok(lookup_plain(name, env)),
        None => Err(ConfigError::Interpolation {
            message: format!("unsupported operator in ${{{body}}}"),
        }),
        Some((Operator::Default, word)) => match value {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => interpolate(word, env),
        },
        Some((Operator::RequiredNonEmpty, message)) => match value {
            Some(v) if set_and_non_empty => Ok(v.to_string()),
            _ => Err(missing(name, message, env)?),
        },
        Some((Operator::Required, message)) => match value {
            Some(v) => Ok(v.to_string()),
            None => Err(missing(name, message, env)?),
        },
        Some((Operator::AlternativeNonEmpty, word)) => {
            if set_and_non_empty {
                interpolate(word, env)
            } else {
                Ok(String::new())
            }
        }
        Some((Operator::Alternative, word)) => {
            if value.is_some() {
                interpolate(word, env)
            } else {
                Ok(String::new())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operator {
    Default,
    RequiredNonEmpty,
    Required,
    AlternativeNonEmpty,
    Alternative,
}

fn operator_kind(operator: &str) -> Option<(Operator, &str)> {
    const OPERATORS: &[(&str, Operator)] = &[
        (":-", Operator::Default),
        (":?", Operator::RequiredNonEmpty),
        (":+", Operator::AlternativeNonEmpty),
        ("-", Operator::Default),
        ("?", Operator::Required),
        ("+", Operator::Alternative),
    ];
    OPERATORS
        .iter()
        .find_map(|(prefix, kind)| operator.strip_prefix(prefix).map(|word| (*kind, word)))
}

fn missing(name: &str, message: &str, env: &Environment) -> Result<ConfigError, ConfigError> {
    let message = interpolate(message, env)?;
    Ok(ConfigError::MissingVariable {
        variable: name.to_string(),
        message: if message.is_empty() {
            format!("{name} is required")
        } else {
            message
        },
    })
}

fn lookup_plain(name: &str, env: &Environment) -> String {
    env.get(name).cloned().unwrap_or_else(|| {
        tracing::warn!(variable = name, "variable is not set, substituting an empty string");
        String::new()
    })
}

fn excerpt(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(24)
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}
