//! Decomposition of a label-format string into substitution arguments.
//!
//! A format looks like `"temperature: %s K" % (x * scale)`: a quoted
//! template, a percent, then a parenthesised argument list. The engine never
//! interprets the template or the argument expressions; it only needs the
//! argument slices so each can be sampled through the evaluator. Anything
//! that fails to decompose is a [`TickError::FormatExpression`] and the axis
//! falls back to uniform ticks.

use crate::error::{TickError, TickResult};

/// Maximum number of substitution arguments considered per format.
pub(crate) const MAX_ARGS: usize = 32;

/// Splits `format` into its substitution-argument expression slices.
pub(crate) fn decompose_format(format: &str) -> TickResult<Vec<&str>> {
    let bytes = format.as_bytes();

    let open_quote = bytes
        .iter()
        .position(|&b| b == b'"' || b == b'\'')
        .ok_or_else(|| fail("no quoted template"))?;
    let quote = bytes[open_quote];

    let mut close_quote = None;
    let mut index = open_quote + 1;
    while index < bytes.len() {
        if bytes[index] == quote && bytes[index - 1] != b'\\' {
            close_quote = Some(index);
            break;
        }
        index += 1;
    }
    let close_quote = close_quote.ok_or_else(|| fail("unterminated template quote"))?;

    let mut rest = format[close_quote + 1..].trim_start();
    rest = rest
        .strip_prefix('%')
        .ok_or_else(|| fail("missing '%' after template"))?
        .trim_start();
    let args_body = rest
        .strip_prefix('(')
        .ok_or_else(|| fail("missing '(' before argument list"))?;

    let (args, consumed) = split_top_level_args(args_body)?;
    if !args_body[consumed..].trim().is_empty() {
        return Err(fail("unexpected trailing matter"));
    }
    if args.is_empty() {
        return Err(fail("empty argument list"));
    }
    if args.len() > MAX_ARGS {
        return Err(fail("too many substitution arguments"));
    }
    Ok(args)
}

/// Walks the argument list up to its closing parenthesis, splitting on
/// top-level commas. Returns the slices and the bytes consumed, closing
/// parenthesis included.
fn split_top_level_args(body: &str) -> TickResult<(Vec<&str>, usize)> {
    let mut args = Vec::new();
    let mut depth = 1usize;
    let mut in_quote: Option<char> = None;
    let mut arg_start = 0usize;
    let mut previous = '\0';

    for (offset, ch) in body.char_indices() {
        if let Some(quote) = in_quote {
            if ch == quote && previous != '\\' {
                in_quote = None;
            }
        } else {
            match ch {
                '"' | '\'' => in_quote = Some(ch),
                '(' | '[' => depth += 1,
                ')' | ']' => {
                    depth -= 1;
                    if depth == 0 {
                        let last = body[arg_start..offset].trim();
                        if !last.is_empty() {
                            args.push(last);
                        } else if !args.is_empty() {
                            return Err(fail("empty substitution argument"));
                        }
                        return Ok((args, offset + ch.len_utf8()));
                    }
                }
                ',' if depth == 1 => {
                    let arg = body[arg_start..offset].trim();
                    if arg.is_empty() {
                        return Err(fail("empty substitution argument"));
                    }
                    args.push(arg);
                    arg_start = offset + 1;
                }
                _ => {}
            }
        }
        previous = ch;
    }

    if in_quote.is_some() {
        Err(fail("unterminated quote in argument list"))
    } else {
        Err(fail("unmatched '(' in argument list"))
    }
}

fn fail(reason: &str) -> TickError {
    TickError::FormatExpression(reason.to_owned())
}
