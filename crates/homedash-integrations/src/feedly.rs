//! Feed subscriptions from the Feedly OPML export kept in settings.
//!
//! There is no remote call: the OPML document lives in the `feedly.opml`
//! setting and is converted to a nested outline tree.

use homedash_core::settings::require;
use homedash_core::{FeedOutline, FeedlySnapshot, Integration, Settings};
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::IntegrationError;

const OPML: &str = "feedly opml";

/// Convert the stored OPML export into a feed snapshot.
///
/// # Errors
///
/// Returns a config error if `feedly.opml` is missing and a remote or shape
/// error if it does not parse.
pub fn collect(settings: &Settings) -> Result<FeedlySnapshot, IntegrationError> {
    let section = settings.feedly()?;
    let opml = require(section.opml.as_ref(), Integration::Feedly, "opml")?;
    Ok(FeedlySnapshot {
        feeds: parse_opml(opml)?,
    })
}

/// Parse the `<body>` outlines of an OPML document into a tree.
///
/// # Errors
///
/// Returns [`IntegrationError::Xml`] on malformed XML and
/// [`IntegrationError::Shape`] if the document has no `<body>`.
pub fn parse_opml(xml: &str) -> Result<Vec<FeedOutline>, IntegrationError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let xml_err = |source| IntegrationError::Xml {
        context: OPML,
        source,
    };

    let mut roots = Vec::new();
    // Open `<outline>` elements, innermost last.
    let mut open: Vec<FeedOutline> = Vec::new();
    let mut in_body = false;
    let mut saw_body = false;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.name().as_ref() {
                b"body" => {
                    in_body = true;
                    saw_body = true;
                }
                b"outline" if in_body => open.push(outline_from(&e).map_err(xml_err)?),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"body" => saw_body = true,
                b"outline" if in_body => {
                    let leaf = outline_from(&e).map_err(xml_err)?;
                    attach(&mut open, &mut roots, leaf);
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"body" => in_body = false,
                b"outline" if in_body => {
                    if let Some(done) = open.pop() {
                        attach(&mut open, &mut roots, done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_body {
        return Err(IntegrationError::shape(OPML, "document has no <body>"));
    }

    Ok(roots)
}

fn attach(open: &mut [FeedOutline], roots: &mut Vec<FeedOutline>, outline: FeedOutline) {
    match open.last_mut() {
        Some(parent) => parent.children.push(outline),
        None => roots.push(outline),
    }
}

fn outline_from(element: &BytesStart<'_>) -> Result<FeedOutline, quick_xml::Error> {
    let mut outline = FeedOutline::default();
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"title" => outline.title = Some(value),
            b"text" => outline.text = Some(value),
            b"xmlUrl" => outline.xml_url = Some(value),
            b"htmlUrl" => outline.html_url = Some(value),
            b"type" => outline.kind = Some(value),
            _ => {}
        }
    }
    Ok(outline)
}
