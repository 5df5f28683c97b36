//! Placeholder scanner: splits clause bodies into literal text and
//! `[Nombre Variable]` placeholder segments.

use nom::{
    bytes::complete::{tag, take_till},
    combinator::map,
    sequence::delimited,
    IResult,
};
use std::collections::BTreeSet;
use std::fmt;
use std::mem;

/// One piece of a clause body. Placeholders carry the bare name, without the
/// surrounding brackets.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Placeholder(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Text(text) => f.write_str(text),
            Segment::Placeholder(name) => write!(f, "[{}]", name),
        }
    }
}

fn placeholder(input: &str) -> IResult<&str, Segment> {
    // a name never spans lines: hitting '\n' before ']' fails the parse and
    // the bracket stays literal
    map(
        delimited(tag("["), take_till(|c| c == ']' || c == '\n'), tag("]")),
        |name: &str| Segment::Placeholder(name.to_string()),
    )(input)
}

/// Lossless split of a clause body. An unterminated `[` does not match and
/// stays literal text, so concatenating the segments back always reproduces
/// the input byte for byte.
pub fn segments(body: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut rest = body;

    while !rest.is_empty() {
        match rest.find('[') {
            None => {
                text.push_str(rest);
                rest = "";
            }
            Some(i) => {
                text.push_str(&rest[..i]);
                rest = &rest[i..];
                match placeholder(rest) {
                    Ok((tail, seg)) => {
                        if !text.is_empty() {
                            out.push(Segment::Text(mem::take(&mut text)));
                        }
                        out.push(seg);
                        rest = tail;
                    }
                    Err(_) => {
                        // no closing bracket on this line
                        text.push('[');
                        rest = &rest[1..];
                    }
                }
            }
        }
    }

    if !text.is_empty() {
        out.push(Segment::Text(text));
    }
    out
}

/// Distinct placeholder names referenced by a clause body. Matching is exact:
/// case- and accent-sensitive, first `]` closes (no nesting), and a pair must
/// open and close on the same line.
pub fn scan(body: &str) -> BTreeSet<String> {
    segments(body)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Placeholder(name) => Some(name),
            Segment::Text(_) => None,
        })
        .collect()
}
