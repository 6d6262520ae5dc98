//! Owned token stream over `quick_xml`.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::{ImportError, ImportResult};

/// Start tag with its attributes decoded.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub qname: Vec<u8>,
    pub local: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    /// Looks an attribute up by its qualified name (`Binding`, `xml:lang`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[cfg(test)]
    pub fn new(local: &str, attributes: &[(&str, &str)]) -> Self {
        Self {
            qname: local.as_bytes().to_vec(),
            local: local.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum Token {
    Start(Element),
    Empty(Element),
    End,
    Text(String),
    Eof,
    Other,
}

pub(crate) fn reader<R: BufRead>(source: R) -> Reader<R> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);
    reader
}

fn syntax<R>(reader: &Reader<R>, err: impl std::fmt::Display) -> ImportError {
    ImportError::xml(format!("{err} (at byte {})", reader.buffer_position()))
}

fn element<R>(reader: &Reader<R>, start: &BytesStart<'_>) -> ImportResult<Element> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| syntax(reader, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| syntax(reader, e))?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        qname: start.name().as_ref().to_vec(),
        local,
        attributes,
    })
}

pub(crate) fn next_token<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> ImportResult<Token> {
    buf.clear();
    let event = match reader.read_event_into(buf) {
        Ok(event) => event,
        Err(e) => return Err(syntax(reader, e)),
    };
    let token = match event {
        Event::Start(start) => Token::Start(element(reader, &start)?),
        Event::Empty(start) => Token::Empty(element(reader, &start)?),
        Event::End(_) => Token::End,
        Event::Text(text) => Token::Text(text.unescape().map_err(|e| syntax(reader, e))?.into_owned()),
        Event::CData(data) => Token::Text(String::from_utf8_lossy(&data.into_inner()).into_owned()),
        Event::Eof => Token::Eof,
        _ => Token::Other,
    };
    Ok(token)
}

/// Consumes everything up to and including the end tag of `qname`.
pub(crate) fn skip<R: BufRead>(reader: &mut Reader<R>, qname: &[u8], buf: &mut Vec<u8>) -> ImportResult<()> {
    buf.clear();
    match reader.read_to_end_into(QName(qname), buf) {
        Ok(_) => Ok(()),
        Err(e) => Err(syntax(reader, e)),
    }
}

/// Copies the subtree of the open element `qname` into a standalone
/// document, up to and including its end tag.
///
/// Depth is counted on start and end events alone, so a mismatched end tag
/// inside the subtree is carried into the copy and reported only when the
/// copy is parsed.
pub(crate) fn capture<R: BufRead>(reader: &mut Reader<R>, qname: &[u8], buf: &mut Vec<u8>) -> ImportResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    let open = BytesStart::new(String::from_utf8_lossy(qname));
    writer
        .write_event(Event::Start(open))
        .map_err(|e| ImportError::xml(e.to_string()))?;

    let mut depth = 0_usize;
    loop {
        buf.clear();
        let event = match reader.read_event_into(buf) {
            Ok(event) => event,
            Err(e) => return Err(syntax(reader, e)),
        };
        let closes = match &event {
            Event::Start(_) => {
                depth += 1;
                false
            }
            Event::End(_) if depth == 0 => true,
            Event::End(_) => {
                depth -= 1;
                false
            }
            Event::Eof => return Err(syntax(reader, "document ends inside an EntityDescriptor")),
            _ => false,
        };
        writer
            .write_event(event)
            .map_err(|e| ImportError::xml(e.to_string()))?;
        if closes {
            return Ok(writer.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_stops_at_the_matching_depth() {
        let mut outer = reader(&b"<a><b><c/></b><b>x</b></a><next/>"[..]);
        outer.config_mut().check_end_names = false;
        let mut buf = Vec::new();
        assert!(matches!(next_token(&mut outer, &mut buf).unwrap(), Token::Start(_)));

        let copy = capture(&mut outer, b"a", &mut buf).unwrap();
        assert_eq!(copy, b"<a><b><c/></b><b>x</b></a>");
        match next_token(&mut outer, &mut buf).unwrap() {
            Token::Empty(element) => assert_eq!(element.local, "next"),
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn mismatched_end_tags_surface_in_the_copy() {
        let mut outer = reader(&b"<a><b></c></a><next/>"[..]);
        outer.config_mut().check_end_names = false;
        let mut buf = Vec::new();
        next_token(&mut outer, &mut buf).unwrap();

        let copy = capture(&mut outer, b"a", &mut buf).unwrap();
        let mut inner = reader(copy.as_slice());
        let mut inner_buf = Vec::new();
        let err = loop {
            match next_token(&mut inner, &mut inner_buf) {
                Ok(Token::Eof) => panic!("copy parsed without error"),
                Ok(_) => {}
                Err(err) => break err,
            }
        };
        assert!(err.is_syntax());
        assert!(matches!(next_token(&mut outer, &mut buf).unwrap(), Token::Empty(_)));
    }

    #[test]
    fn unterminated_subtree_is_a_syntax_error() {
        let mut outer = reader(&b"<a><b>"[..]);
        outer.config_mut().check_end_names = false;
        let mut buf = Vec::new();
        next_token(&mut outer, &mut buf).unwrap();
        assert!(capture(&mut outer, b"a", &mut buf).unwrap_err().is_syntax());
    }
}
