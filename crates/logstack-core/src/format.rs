//! Message templating with checked placeholder substitution
//!
//! Templates use `{}` as the placeholder and `{{` / `}}` as escapes, the same
//! surface as `format!`, but are interpreted at runtime. Unlike `printf`-style
//! substitution, the number of placeholders must match the number of
//! arguments exactly, otherwise rendering fails instead of producing a
//! silently malformed line.

use std::fmt::{self, Write};

use thiserror::Error;

/// Errors produced while rendering a message template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Placeholder count does not match argument count
    #[error("message has {placeholders} placeholder(s) but {arguments} argument(s) were given")]
    ArgumentMismatch { placeholders: usize, arguments: usize },

    /// A `{` or `}` that is neither a placeholder nor an escape
    #[error("unmatched '{brace}' at byte {position}")]
    UnbalancedBrace { brace: char, position: usize },
}

/// Render `template` with `args` substituted for its `{}` placeholders
///
/// With no arguments the template is returned verbatim and braces are not
/// interpreted.
pub fn render(template: &str, args: &[&dyn fmt::Display]) -> Result<String, FormatError> {
    if args.is_empty() {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut placeholders = 0usize;
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => match chars.peek() {
                Some((_, '{')) => {
                    chars.next();
                    out.push('{');
                }
                Some((_, '}')) => {
                    chars.next();
                    if let Some(arg) = args.get(placeholders) {
                        // Writing into a String cannot fail
                        let _ = write!(out, "{}", arg);
                    }
                    placeholders += 1;
                }
                _ => return Err(FormatError::UnbalancedBrace { brace: '{', position }),
            },
            '}' => match chars.peek() {
                Some((_, '}')) => {
                    chars.next();
                    out.push('}');
                }
                _ => return Err(FormatError::UnbalancedBrace { brace: '}', position }),
            },
            other => out.push(other),
        }
    }

    if placeholders != args.len() {
        return Err(FormatError::ArgumentMismatch {
            placeholders,
            arguments: args.len(),
        });
    }

    Ok(out)
}
