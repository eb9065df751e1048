use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    IResult,
};
use tracing::warn;

use crate::entry::{Database, Entry, Piece, Value};

/// Parse a bibliography without ever failing.
///
/// Anything that is not a well-formed entry, string, preamble, or comment
/// is captured verbatim as a comment, so a later write keeps the content
/// for a human to fix.
pub(crate) fn parse(input: &str) -> Database {
    let mut db = Database::default();
    let mut remaining = input;

    loop {
        remaining = remaining.trim_start();
        if remaining.is_empty() {
            return db;
        }

        if let Some(at) = remaining.strip_prefix('@') {
            match parse_block(at) {
                Ok((rest, block)) => {
                    match block {
                        Block::Entry(entry) => db.entries.push(entry),
                        Block::String(name, value) => db.strings.push((name, value)),
                        Block::Preamble(text) => db.preambles.push(text),
                        Block::Comment(text) => {
                            if !text.is_empty() {
                                db.comments.push(text);
                            }
                        }
                    }
                    remaining = rest;
                }
                Err(_) => {
                    // Skip to the next @ and keep the region as a comment.
                    let end = remaining[1..]
                        .find('@')
                        .map_or(remaining.len(), |pos| pos + 1);
                    let region = remaining[..end].trim();
                    warn!(
                        head = region.lines().next().unwrap_or_default(),
                        "keeping unparseable region as a comment"
                    );
                    db.comments.push(region.to_string());
                    remaining = &remaining[end..];
                }
            }
        } else {
            // Free text between blocks.
            let end = remaining.find('@').unwrap_or(remaining.len());
            let text = remaining[..end].trim();
            if !text.is_empty() {
                db.comments.push(text.to_string());
            }
            remaining = &remaining[end..];
        }
    }
}

enum Block {
    Entry(Entry),
    String(String, Value),
    Preamble(String),
    Comment(String),
}

// Input starts right after the @.
fn parse_block(input: &str) -> IResult<&str, Block> {
    let (rest, _) = multispace0(input)?;
    let (rest, kind) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match kind.to_lowercase().as_str() {
        "string" => parse_string_definition(rest),
        "preamble" => parse_preamble(rest),
        "comment" => parse_comment_body(rest),
        _ => parse_entry_body(rest, kind),
    }
}

fn parse_string_definition(input: &str) -> IResult<&str, Block> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, name) = field_name(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = parse_value(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, Block::String(name.to_lowercase(), value)))
}

// The preamble is kept verbatim, so concatenations round-trip untouched.
fn parse_preamble(input: &str) -> IResult<&str, Block> {
    let (rest, _) = multispace0(input)?;
    let (rest, content) = braced_content(rest)?;
    let inner = content[1..content.len() - 1].trim().to_string();
    Ok((rest, Block::Preamble(inner)))
}

// A braced body, or bare text running to the end of the line.
fn parse_comment_body(input: &str) -> IResult<&str, Block> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, content) = braced_content(rest)?;
        let inner = content[1..content.len() - 1].trim().to_string();
        Ok((rest, Block::Comment(inner)))
    } else {
        let end = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[end..], Block::Comment(rest[..end].trim().to_string())))
    }
}

fn parse_entry_body<'a>(input: &'a str, kind: &str) -> IResult<&'a str, Block> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) = take_while1(|c: char| {
        !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '(' | ')')
    })(rest)?;
    let (rest, _) = multispace0(rest)?;
    let rest = rest.strip_prefix(',').unwrap_or(rest);

    let (rest, fields) = parse_fields(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((
        rest,
        Block::Entry(Entry {
            kind: kind.to_lowercase(),
            key: key.to_string(),
            fields,
        }),
    ))
}

fn parse_fields(input: &str) -> IResult<&str, Vec<(String, Value)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        match parse_single_field(rest) {
            Ok((rest, field)) => {
                fields.push(field);
                let (rest, _) = multispace0(rest)?;
                remaining = rest.strip_prefix(',').unwrap_or(rest);
            }
            // No further fields; the closing brace check decides whether
            // the entry as a whole is acceptable.
            Err(_) => return Ok((remaining, fields)),
        }
    }
}

fn parse_single_field(input: &str) -> IResult<&str, (String, Value)> {
    let (rest, name) = field_name(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = parse_value(rest)?;
    Ok((rest, (name.to_lowercase(), value)))
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))(input)
}

// A value is one or more pieces joined with #. A single literal piece
// reads as plain text; anything involving a macro or a concatenation is
// kept as an uninterpolated expression.
fn parse_value(input: &str) -> IResult<&str, Value> {
    let mut pieces = Vec::new();
    let mut remaining = input;

    let rest = loop {
        let (rest, _) = multispace0(remaining)?;
        let (rest, piece) = parse_piece(rest)?;
        pieces.push(piece);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => break rest,
        }
    };

    let value = match pieces.pop() {
        Some(Piece::Text(text)) if pieces.is_empty() => Value::Text(text),
        Some(last) => {
            pieces.push(last);
            Value::Expression(pieces)
        }
        None => Value::Text(String::new()),
    };
    Ok((rest, value))
}

fn parse_piece(input: &str) -> IResult<&str, Piece> {
    if input.starts_with('{') {
        let (rest, content) = braced_content(input)?;
        let inner = &content[1..content.len() - 1];
        return Ok((rest, Piece::Text(inner.to_string())));
    }
    if input.starts_with('"') {
        let (rest, content) = quoted_content(input)?;
        return Ok((rest, Piece::Text(content.to_string())));
    }
    if let Ok((rest, digits)) = take_while1::<_, _, nom::error::Error<&str>>(|c: char| {
        c.is_ascii_digit()
    })(input)
    {
        return Ok((rest, Piece::Text(digits.to_string())));
    }
    let (rest, name) = field_name(input)?;
    Ok((rest, Piece::Macro(name.to_lowercase())))
}

// Balanced braces, including the outer pair. A backslash protects the
// following character from the depth count.
fn braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0i32;
    let bytes = input.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

// The content between double quotes, verbatim. Quotes inside braces do
// not terminate the value.
fn quoted_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0i32;
    let bytes = input.as_bytes();
    let mut pos = 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if depth == 0 => return Ok((&input[pos + 1..], &input[1..pos])),
            b'{' => depth += 1,
            b'}' => depth -= 1,
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
