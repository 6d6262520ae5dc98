//! Minimal reader and writer for PHP's `serialize()` format.
//!
//! Only the scalar and array forms occur in stored policies:
//!
//! | Form | Example |
//! |---|---|
//! | null | `N;` |
//! | boolean | `b:1;` |
//! | integer | `i:42;` |
//! | float | `d:0.5;` |
//! | string | `s:5:"hello";` (length counted in bytes) |
//! | array | `a:2:{i:0;s:1:"a";i:1;s:1:"b";}` |

use std::fmt::Write as _;

use crate::error::{ArpError, ArpResult};

/// Deepest array nesting accepted by [`parse`]. Policies use three levels.
pub const MAX_DEPTH: usize = 8;

/// Array key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpKey {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

impl PhpKey {
    /// Returns the key as text.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

/// Deserialized value.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    /// `N;`
    Null,
    /// `b:0;` or `b:1;`
    Bool(bool),
    /// `i:<n>;`
    Int(i64),
    /// `d:<f>;`
    Float(f64),
    /// `s:<len>:"<bytes>";`
    Str(String),
    /// `a:<n>:{<key><value>...}` with entries in serialized order.
    Array(Vec<(PhpKey, PhpValue)>),
}

/// Parses a complete serialization. Trailing bytes other than whitespace
/// are rejected.
pub fn parse(input: &str) -> ArpResult<PhpValue> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    while parser.peek().is_some_and(|b| b.is_ascii_whitespace()) {
        parser.pos += 1;
    }
    if parser.pos != parser.input.len() {
        return Err(ArpError::malformed(parser.pos, "trailing data after value"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn next(&mut self) -> ArpResult<u8> {
        let byte = self
            .peek()
            .ok_or_else(|| ArpError::malformed(self.pos, "unexpected end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> ArpResult<()> {
        let at = self.pos;
        let found = self.next()?;
        if found == expected {
            Ok(())
        } else {
            Err(ArpError::malformed(
                at,
                format!("expected '{}', found '{}'", expected as char, found as char),
            ))
        }
    }

    /// Reads raw bytes up to (not including) `terminator` and consumes it.
    fn until(&mut self, terminator: u8) -> ArpResult<&str> {
        let start = self.pos;
        let len = self.input[start..]
            .iter()
            .position(|b| *b == terminator)
            .ok_or_else(|| {
                ArpError::malformed(start, format!("missing '{}'", terminator as char))
            })?;
        self.pos = start + len + 1;
        std::str::from_utf8(&self.input[start..start + len])
            .map_err(|_| ArpError::malformed(start, "invalid UTF-8"))
    }

    fn integer(&mut self, terminator: u8) -> ArpResult<i64> {
        let at = self.pos;
        let text = self.until(terminator)?;
        text.parse()
            .map_err(|_| ArpError::malformed(at, format!("invalid integer '{text}'")))
    }

    fn length(&mut self) -> ArpResult<usize> {
        let at = self.pos;
        let n = self.integer(b':')?;
        usize::try_from(n).map_err(|_| ArpError::malformed(at, format!("negative length {n}")))
    }

    fn string_body(&mut self) -> ArpResult<String> {
        let len = self.length()?;
        self.expect(b'"')?;
        let start = self.pos;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| ArpError::malformed(start, format!("string of {len} bytes overruns input")))?;
        let text = std::str::from_utf8(&self.input[start..end])
            .map_err(|_| ArpError::malformed(start, "invalid UTF-8 in string"))?
            .to_string();
        self.pos = end;
        self.expect(b'"')?;
        self.expect(b';')?;
        Ok(text)
    }

    fn key(&mut self) -> ArpResult<PhpKey> {
        let at = self.pos;
        match self.next()? {
            b'i' => {
                self.expect(b':')?;
                Ok(PhpKey::Int(self.integer(b';')?))
            }
            b's' => {
                self.expect(b':')?;
                Ok(PhpKey::Str(self.string_body()?))
            }
            other => Err(ArpError::malformed(
                at,
                format!("invalid array key type '{}'", other as char),
            )),
        }
    }

    fn value(&mut self) -> ArpResult<PhpValue> {
        let at = self.pos;
        let tag = self.next()?;
        if tag == b'N' {
            self.expect(b';')?;
            return Ok(PhpValue::Null);
        }
        self.expect(b':')?;
        match tag {
            b'b' => match self.integer(b';')? {
                0 => Ok(PhpValue::Bool(false)),
                1 => Ok(PhpValue::Bool(true)),
                n => Err(ArpError::malformed(at, format!("invalid boolean {n}"))),
            },
            b'i' => Ok(PhpValue::Int(self.integer(b';')?)),
            b'd' => {
                let start = self.pos;
                let text = self.until(b';')?;
                text.parse()
                    .map(PhpValue::Float)
                    .map_err(|_| ArpError::malformed(start, format!("invalid float '{text}'")))
            }
            b's' => Ok(PhpValue::Str(self.string_body()?)),
            b'a' => {
                if self.depth == MAX_DEPTH {
                    return Err(ArpError::malformed(at, "nesting too deep"));
                }
                let count = self.length()?;
                self.expect(b'{')?;
                self.depth += 1;
                let mut entries = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    let key = self.key()?;
                    let value = self.value()?;
                    entries.push((key, value));
                }
                self.depth -= 1;
                self.expect(b'}')?;
                Ok(PhpValue::Array(entries))
            }
            other => Err(ArpError::malformed(
                at,
                format!("unknown type tag '{}'", other as char),
            )),
        }
    }
}

/// Serializes a value.
#[must_use]
pub fn write(value: &PhpValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_str(out: &mut String, s: &str) {
    let _ = write!(out, "s:{}:\"{}\";", s.len(), s);
}

fn write_value(out: &mut String, value: &PhpValue) {
    match value {
        PhpValue::Null => out.push_str("N;"),
        PhpValue::Bool(b) => {
            let _ = write!(out, "b:{};", u8::from(*b));
        }
        PhpValue::Int(i) => {
            let _ = write!(out, "i:{i};");
        }
        PhpValue::Float(f) => {
            let _ = write!(out, "d:{f};");
        }
        PhpValue::Str(s) => write_str(out, s),
        PhpValue::Array(entries) => {
            let _ = write!(out, "a:{}:{{", entries.len());
            for (key, value) in entries {
                match key {
                    PhpKey::Int(i) => {
                        let _ = write!(out, "i:{i};");
                    }
                    PhpKey::Str(s) => write_str(out, s),
                }
                write_value(out, value);
            }
            out.push('}');
        }
    }
}
