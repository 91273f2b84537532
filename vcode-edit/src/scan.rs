//! Document validation and root-tag attribute spans.
//!
//! quick-xml walks the whole document to prove it is well formed. The root
//! start tag is then rescanned byte by byte so the patcher can splice a single
//! attribute value without reserializing anything.

use crate::error::MalformedManifest;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::ops::Range;

/// One attribute inside the root start tag, as byte ranges into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttrSpan {
    /// Whitespace run that precedes the attribute name.
    pub leading: Range<usize>,
    pub name: Range<usize>,
    /// Value bytes between the quotes.
    pub value: Range<usize>,
    /// One past the closing quote.
    pub end: usize,
}

/// The root start tag and its attributes.
#[derive(Debug, Clone)]
pub(crate) struct RootTag {
    /// One past the tag name; where an attribute goes when the tag has none.
    pub name_end: usize,
    pub attrs: Vec<AttrSpan>,
}

/// Validate `text` as a single-rooted XML document and scan its root tag.
pub(crate) fn scan_document(text: &str) -> Result<RootTag, MalformedManifest> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<String> = Vec::new();
    let mut root: Option<Range<usize>> = None;

    loop {
        let before = reader.buffer_position();
        let event = reader.read_event().map_err(|e| MalformedManifest::Xml {
            position: reader.error_position(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                check_element(&reader, &e, root.is_some() && stack.is_empty(), before)?;
                if root.is_none() {
                    root = Some(tag_range(text, before, reader.buffer_position()));
                }
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::Empty(e) => {
                check_element(&reader, &e, root.is_some() && stack.is_empty(), before)?;
                if root.is_none() {
                    root = Some(tag_range(text, before, reader.buffer_position()));
                }
            }
            Event::End(_) => {
                if stack.pop().is_none() {
                    return Err(MalformedManifest::Xml {
                        position: before,
                        message: "closing tag without a matching start tag".to_string(),
                    });
                }
            }
            Event::Text(t) => {
                let outside_root = stack.is_empty();
                if outside_root && !t.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(MalformedManifest::TrailingContent { position: before });
                }
            }
            Event::CData(_) if stack.is_empty() => {
                return Err(MalformedManifest::TrailingContent { position: before });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = stack.pop() {
        return Err(MalformedManifest::Unclosed { name });
    }
    let root = root.ok_or(MalformedManifest::NoRootElement)?;
    scan_root_tag(text, root)
}

fn check_element(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    second_root: bool,
    before: u64,
) -> Result<(), MalformedManifest> {
    if second_root {
        return Err(MalformedManifest::TrailingContent { position: before });
    }
    for attr in e.attributes() {
        attr.map_err(|err| MalformedManifest::Xml {
            position: reader.buffer_position(),
            message: err.to_string(),
        })?;
    }
    Ok(())
}

/// Byte range of a tag event: from its `<` to one past its `>`.
fn tag_range(text: &str, before: u64, after: u64) -> Range<usize> {
    let bytes = text.as_bytes();
    let mut start = usize::try_from(before).unwrap_or(bytes.len());
    while start < bytes.len() && bytes[start] != b'<' {
        start += 1;
    }
    let end = usize::try_from(after).unwrap_or(bytes.len());
    start..end.max(start)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn scan_root_tag(text: &str, tag: Range<usize>) -> Result<RootTag, MalformedManifest> {
    let bytes = &text.as_bytes()[..tag.end];
    let bad = |message: &str| MalformedManifest::Xml {
        position: tag.start as u64,
        message: format!("root tag: {message}"),
    };

    let mut i = tag.start + 1;
    while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }
    let name_end = i;
    let mut attrs = Vec::new();

    loop {
        let leading_start = i;
        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(bad("unterminated start tag"));
        }
        if bytes[i] == b'/' || bytes[i] == b'>' {
            break;
        }

        let name_start = i;
        while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        let name = name_start..i;
        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            return Err(bad("attribute without a value"));
        }
        i += 1;
        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }
        let quote = match bytes.get(i) {
            Some(q @ (b'"' | b'\'')) => *q,
            _ => return Err(bad("unquoted attribute value")),
        };
        i += 1;
        let value_start = i;
        while i < bytes.len() && bytes[i] != quote {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(bad("unterminated attribute value"));
        }
        let value = value_start..i;
        i += 1;

        attrs.push(AttrSpan {
            leading: leading_start..name_start,
            name,
            value,
            end: i,
        });
    }

    Ok(RootTag { name_end, attrs })
}
