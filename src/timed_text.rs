//! Timed-text XML parsing.
//!
//! We read the document with `quick-xml`'s streaming reader and keep only what the transcoder
//! needs: the paragraphs (`<p>`) that sit directly under the first `<body>` element, with their
//! timing attributes and text.
//!
//! Parsing rules:
//! - Element names are matched on their local name, so namespace prefixes are tolerated.
//! - Paragraph runs (`<s>`) collect every piece of text inside them, including nested markup.
//! - XML entities are decoded here; HTML entity decoding happens later in [`crate::text`].
//! - The whole input is consumed so that malformation after `</body>` is still reported.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, trace};

use crate::{Error, Result};

const BODY: &[u8] = b"body";
const PARAGRAPH: &[u8] = b"p";
const RUN: &[u8] = b"s";

/// Paragraph start offset, in milliseconds.
const START_ATTR: &[u8] = b"t";

/// Paragraph duration, in hundredths of a millisecond.
const DURATION_ATTR: &[u8] = b"d";

/// A single caption paragraph as it appears in the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// Start offset in milliseconds (`t`).
    pub start_ms: f64,

    /// Duration in hundredths of a millisecond (`d`), if present.
    pub duration: Option<f64>,

    /// Text of each `<s>` run, in document order.
    pub runs: Vec<String>,

    /// Text placed directly inside the paragraph.
    pub text: Option<String>,
}

impl Paragraph {
    /// The paragraph's caption text before normalization.
    ///
    /// Runs win over direct text: each run is prefixed with one space and concatenated.
    pub fn rendered_text(&self) -> Cow<'_, str> {
        if self.runs.is_empty() {
            return Cow::Borrowed(self.text.as_deref().unwrap_or_default());
        }

        let mut out = String::with_capacity(self.runs.iter().map(|r| r.len() + 1).sum());
        for run in &self.runs {
            out.push(' ');
            out.push_str(run);
        }
        Cow::Owned(out)
    }

    pub fn start_seconds(&self) -> f64 {
        self.start_ms / 1000.0
    }

    /// Missing durations count as zero.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.unwrap_or(0.0) / 10_000.0
    }
}

/// The paragraphs of a timed-text document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedTextDocument {
    pub paragraphs: Vec<Paragraph>,
}

impl TimedTextDocument {
    /// Parse a timed-text XML document.
    ///
    /// Fails with [`Error::MalformedDocument`] if the XML is not well formed, no `body` element
    /// exists, or a paragraph carries missing or non-numeric timing.
    pub fn parse(xml: &str) -> Result<Self> {
        let xml = xml.strip_prefix('\u{FEFF}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = true;

        let mut state = ParseState::default();

        loop {
            let event = reader.read_event().map_err(|err| {
                Error::malformed(format!(
                    "{err} (at byte {})",
                    reader.buffer_position()
                ))
            })?;

            match event {
                Event::Start(e) => state.on_start(&e)?,
                Event::Empty(e) => state.on_empty(&e)?,
                Event::End(_) => state.on_end()?,
                Event::Text(e) => {
                    let bytes = e.into_inner();
                    let raw = normalize_line_endings(std::str::from_utf8(&bytes)?);
                    state.on_text(&unescape(&raw).map_err(xml_error)?)?;
                }
                Event::CData(e) => {
                    let bytes = e.into_inner();
                    state.on_text(&normalize_line_endings(std::str::from_utf8(&bytes)?))?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes carry no captions.
                _ => {}
            }
        }

        state.finish()
    }
}

/// Where the reader currently is relative to the first `body` element.
#[derive(Debug, Default, PartialEq)]
enum BodyScope {
    #[default]
    NotSeen,
    /// Inside `body`; holds the depth of the `body` element itself.
    Open(usize),
    Closed,
}

#[derive(Debug, Default)]
struct ParseState {
    /// Number of currently open elements.
    depth: usize,
    /// The document element has been closed; only whitespace and misc markup may follow.
    root_closed: bool,
    body: BodyScope,
    paragraph: Option<Paragraph>,
    run: Option<String>,
    paragraphs: Vec<Paragraph>,
}

impl ParseState {
    fn on_start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        self.ensure_root_open(e)?;
        self.depth += 1;
        self.open_element(e, self.depth)
    }

    fn on_empty(&mut self, e: &BytesStart<'_>) -> Result<()> {
        self.ensure_root_open(e)?;
        let depth = self.depth + 1;
        self.open_element(e, depth)?;
        self.close_element(depth);
        if depth == 1 {
            self.root_closed = true;
        }
        Ok(())
    }

    fn on_end(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::malformed("closing tag without a matching opening tag"));
        }
        self.close_element(self.depth);
        self.depth -= 1;
        if self.depth == 0 {
            self.root_closed = true;
        }
        Ok(())
    }

    fn on_text(&mut self, text: &str) -> Result<()> {
        if self.depth == 0 {
            if !text.chars().all(is_xml_whitespace) {
                return Err(Error::malformed(format!(
                    "text outside the document element: {:?}",
                    text.trim()
                )));
            }
            return Ok(());
        }

        if let Some(run) = self.run.as_mut() {
            run.push_str(text);
            return Ok(());
        }

        if let (BodyScope::Open(body), Some(paragraph)) = (&self.body, self.paragraph.as_mut()) {
            if self.depth == body + 1 {
                paragraph
                    .text
                    .get_or_insert_with(String::new)
                    .push_str(text);
            }
        }
        Ok(())
    }

    /// A well-formed document has exactly one document element.
    fn ensure_root_open(&self, e: &BytesStart<'_>) -> Result<()> {
        if self.root_closed {
            return Err(Error::malformed(format!(
                "junk after document element: <{}>",
                String::from_utf8_lossy(e.name().as_ref())
            )));
        }
        Ok(())
    }

    fn open_element(&mut self, e: &BytesStart<'_>, depth: usize) -> Result<()> {
        let name = e.local_name();

        let body = match self.body {
            BodyScope::NotSeen => {
                if name.as_ref() == BODY {
                    self.body = BodyScope::Open(depth);
                }
                return Ok(());
            }
            BodyScope::Open(body) => body,
            BodyScope::Closed => return Ok(()),
        };

        if depth == body + 1 {
            if name.as_ref() == PARAGRAPH {
                self.paragraph = Some(read_paragraph(e, self.paragraphs.len() + 1)?);
            } else {
                trace!(
                    element = %String::from_utf8_lossy(name.as_ref()),
                    "skipping non-paragraph element in body"
                );
            }
        } else if depth == body + 2 && self.paragraph.is_some() && name.as_ref() == RUN {
            self.run = Some(String::new());
        }

        Ok(())
    }

    fn close_element(&mut self, depth: usize) {
        let BodyScope::Open(body) = self.body else {
            return;
        };

        if depth == body + 2 {
            if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                paragraph.runs.push(run);
            }
        } else if depth == body + 1 {
            if let Some(paragraph) = self.paragraph.take() {
                self.paragraphs.push(paragraph);
            }
        } else if depth == body {
            self.body = BodyScope::Closed;
        }
    }

    fn finish(self) -> Result<TimedTextDocument> {
        if self.depth != 0 {
            return Err(Error::malformed(format!(
                "unexpected end of document with {} unclosed element(s)",
                self.depth
            )));
        }

        if self.body == BodyScope::NotSeen {
            return Err(Error::malformed("missing `body` element"));
        }

        debug!(
            paragraphs = self.paragraphs.len(),
            "parsed timed-text document"
        );

        Ok(TimedTextDocument {
            paragraphs: self.paragraphs,
        })
    }
}

/// Read the timing attributes of the `index`-th paragraph (1-based, for diagnostics).
fn read_paragraph(e: &BytesStart<'_>, index: usize) -> Result<Paragraph> {
    let mut start_ms = None;
    let mut duration = None;

    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = attr.key.local_name();
        let name = match key.as_ref() {
            START_ATTR => "t",
            DURATION_ATTR => "d",
            _ => continue,
        };

        let value = parse_timing(index, name, &attr.unescape_value().map_err(xml_error)?)?;
        if name == "t" {
            start_ms = Some(value);
        } else {
            duration = Some(value);
        }
    }

    let start_ms = start_ms.ok_or_else(|| {
        Error::malformed(format!(
            "paragraph #{index} is missing its required `t` attribute"
        ))
    })?;

    Ok(Paragraph {
        start_ms,
        duration,
        runs: Vec::new(),
        text: None,
    })
}

/// Apply XML end-of-line handling: `\r\n` and lone `\r` become `\n`.
fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::malformed(err.to_string())
}

fn parse_timing(index: usize, attr: &str, raw: &str) -> Result<f64> {
    let invalid = || {
        Error::malformed(format!(
            "paragraph #{index} has a non-numeric `{attr}` attribute: {raw:?}"
        ))
    };

    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> TimedTextDocument {
        TimedTextDocument::parse(xml).expect("document should parse")
    }

    fn malformed(xml: &str) -> String {
        match TimedTextDocument::parse(xml) {
            Err(Error::MalformedDocument(msg)) => msg,
            other => panic!("expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn reads_paragraph_timing_and_runs() {
        let doc = parse(
            r#"<timedtext format="3"><body>
                <p t="5000" d="25000"><s>Hello</s><s> world</s></p>
                <p t="8000">plain</p>
            </body></timedtext>"#,
        );

        assert_eq!(doc.paragraphs.len(), 2);

        let first = &doc.paragraphs[0];
        assert_eq!(first.start_ms, 5000.0);
        assert_eq!(first.duration, Some(25000.0));
        assert_eq!(first.runs, vec!["Hello".to_string(), " world".to_string()]);
        assert_eq!(first.rendered_text(), " Hello  world");
        assert_eq!(first.start_seconds(), 5.0);
        assert_eq!(first.duration_seconds(), 2.5);

        let second = &doc.paragraphs[1];
        assert_eq!(second.duration, None);
        assert_eq!(second.duration_seconds(), 0.0);
        assert_eq!(second.rendered_text(), "plain");
    }

    #[test]
    fn runs_replace_direct_paragraph_text() {
        let doc = parse(r#"<tt><body><p t="0">ignored<s>kept</s> tail</p></body></tt>"#);
        assert_eq!(doc.paragraphs[0].rendered_text(), " kept");
    }

    #[test]
    fn run_text_includes_nested_markup() {
        let doc = parse(r#"<tt><body><p t="0"><s>a<i>b</i>c</s></p></body></tt>"#);
        assert_eq!(doc.paragraphs[0].runs, vec!["abc".to_string()]);
    }

    #[test]
    fn self_closing_elements_have_empty_text() {
        let doc = parse(r#"<tt><body><p t="1"/><p t="2"><s/></p></body></tt>"#);
        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(doc.paragraphs[0].rendered_text(), "");
        assert_eq!(doc.paragraphs[1].rendered_text(), " ");
    }

    #[test]
    fn decodes_xml_entities_and_cdata() {
        let doc = parse(
            r#"<tt><body><p t="0">Tom &amp; Jerry &#39;93</p><p t="1"><![CDATA[<b>raw</b>]]></p></body></tt>"#,
        );
        assert_eq!(doc.paragraphs[0].rendered_text(), "Tom & Jerry '93");
        assert_eq!(doc.paragraphs[1].rendered_text(), "<b>raw</b>");
    }

    #[test]
    fn skips_non_paragraph_children_and_only_reads_first_body() {
        let doc = parse(
            r#"<tt>
                <head><p t="999">not a cue</p></head>
                <body>
                    <div><p t="1">nested</p></div>
                    <p t="2">one</p>
                    <br/>
                    <p t="3">two</p>
                </body>
                <body><p t="4">second body</p></body>
            </tt>"#,
        );
        let starts: Vec<f64> = doc.paragraphs.iter().map(|p| p.start_ms).collect();
        assert_eq!(starts, vec![2.0, 3.0]);
    }

    #[test]
    fn matches_namespaced_elements_by_local_name() {
        let doc = parse(
            r#"<tt:tt xmlns:tt="urn:test"><tt:body><tt:p t="10"><tt:s>hi</tt:s></tt:p></tt:body></tt:tt>"#,
        );
        assert_eq!(doc.paragraphs[0].runs, vec!["hi".to_string()]);
    }

    #[test]
    fn empty_body_yields_no_paragraphs() {
        assert!(parse("<tt><body/></tt>").paragraphs.is_empty());
        assert!(parse("<tt><body>\n</body></tt>").paragraphs.is_empty());
    }

    #[test]
    fn missing_body_is_malformed() {
        let msg = malformed(r#"<tt><head/></tt>"#);
        assert!(msg.contains("body"), "{msg}");
    }

    #[test]
    fn broken_xml_is_malformed() {
        malformed(r#"<tt><body><p t="1">x</s></body></tt>"#);
        malformed(r#"<tt><body><p t="1">x</p>"#);
        malformed(r#"<tt><body><p t="1">&bogus;</p></body></tt>"#);
    }

    #[test]
    fn normalizes_crlf_and_lone_cr_line_endings() {
        let doc = parse(
            "<tt>\r\n<body>\r\n<p t=\"0\">line one\r\nline two\rthree</p>\r\n\
             <p t=\"1\"><![CDATA[a\r\nb]]></p></body></tt>",
        );
        assert_eq!(doc.paragraphs[0].rendered_text(), "line one\nline two\nthree");
        assert_eq!(doc.paragraphs[1].rendered_text(), "a\nb");
    }

    #[test]
    fn content_after_document_element_is_malformed() {
        let msg = malformed(r#"<tt><body><p t="0">a</p></body></tt><extra/>"#);
        assert!(msg.contains("junk after document element"), "{msg}");
        malformed(r#"<tt><body><p t="0">a</p></body></tt><tt><body/></tt>"#);
        malformed(r#"<tt><body><p t="0">a</p></body></tt> trailing junk"#);
        malformed(r#"<tt><body/></tt><![CDATA[x]]>"#);
    }

    #[test]
    fn text_before_document_element_is_malformed() {
        malformed(r#"junk <tt><body/></tt>"#);
    }

    #[test]
    fn whitespace_and_misc_markup_around_document_element_are_allowed() {
        let doc = parse(
            "\u{FEFF}<?xml version=\"1.0\"?>\r\n<!-- captions -->\n<tt><body><p t=\"0\">a</p></body></tt>\n<!-- end -->\r\n",
        );
        assert_eq!(doc.paragraphs.len(), 1);
    }

    #[test]
    fn missing_start_attribute_is_malformed() {
        let msg = malformed(r#"<tt><body><p t="1">a</p><p d="10">b</p></body></tt>"#);
        assert!(msg.contains("paragraph #2"), "{msg}");
        assert!(msg.contains("`t`"), "{msg}");
    }

    #[test]
    fn non_numeric_timing_is_malformed() {
        malformed(r#"<tt><body><p t="soon">a</p></body></tt>"#);
        malformed(r#"<tt><body><p t="1" d="long">a</p></body></tt>"#);
        malformed(r#"<tt><body><p t="-5">a</p></body></tt>"#);
        malformed(r#"<tt><body><p t="inf">a</p></body></tt>"#);
    }

    #[test]
    fn timing_accepts_padded_and_fractional_numbers() {
        let doc = parse(r#"<tt><body><p t=" 1500 " d="12.5">a</p></body></tt>"#);
        assert_eq!(doc.paragraphs[0].start_ms, 1500.0);
        assert_eq!(doc.paragraphs[0].duration, Some(12.5));
    }
}
