//! Atom feed types for the issue tracker's GData dialect.
//!
//! These types model the `feed` and `entry` documents returned by the issue
//! and comment endpoints, including the `issues:` vendor extension elements.
//! Timestamps are kept as the server sent them.
//!
//! Vendor elements are matched by namespace, not by prefix: before mapping
//! a document onto these types, every element bound to [`ISSUES_NAMESPACE`]
//! is renamed to `issues-<local name>` and every other element keeps only
//! its local name.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Reader, Writer};
use serde::Deserialize;

use super::error::{ApiError, Result};

/// The base Atom namespace.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// The issue tracker's vendor extension namespace, bound to the `issues:` prefix.
pub const ISSUES_NAMESPACE: &str = "http://schemas.google.com/projecthosting/issues/2009";

/// An Atom `<link>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(rename = "@href")]
    pub href: String,
    #[serde(rename = "@rel")]
    pub rel: String,
    #[serde(rename = "@type")]
    pub link_type: String,
    #[serde(rename = "@hreflang")]
    pub href_lang: String,
}

/// An Atom `<author>` element. Any field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub uri: String,
    pub email: String,
}

/// A tracker account referenced by `issues:owner` or `issues:cc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Account {
    #[serde(rename = "issues-uri")]
    pub uri: String,
    #[serde(rename = "issues-username")]
    pub username: String,
}

/// Issue owner association.
pub type Owner = Account;

/// Issue CC association.
pub type Cc = Account;

/// A single issue or comment.
///
/// Every list keeps the order the elements had on the wire. The vendor
/// schema allows several `issues:status` or `issues:state` elements even
/// though the tracker usually emits one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// The default namespace in scope, taken from the document root.
    #[serde(skip)]
    pub namespace: String,
    pub id: String,
    pub published: String,
    pub updated: String,
    pub title: String,
    /// HTML-bearing body text.
    pub content: String,
    #[serde(rename = "link")]
    pub links: Vec<Link>,
    #[serde(rename = "author")]
    pub authors: Vec<Author>,
    #[serde(rename = "issues-cc")]
    pub cc: Vec<Cc>,
    #[serde(rename = "issues-label")]
    pub labels: Vec<String>,
    #[serde(rename = "issues-owner")]
    pub owners: Vec<Owner>,
    #[serde(rename = "issues-stars")]
    pub stars: Vec<i64>,
    #[serde(rename = "issues-state")]
    pub state: Vec<String>,
    #[serde(rename = "issues-status")]
    pub status: Vec<String>,
    #[serde(rename = "issues-summary")]
    pub summary: String,
}

/// An ordered collection of entries, in the order the server returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Feed {
    #[serde(rename = "entry")]
    pub entries: Vec<Entry>,
}

impl Feed {
    /// Number of entries in the feed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the feed has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode a `<feed>` document.
///
/// # Errors
///
/// Returns `ApiError::MalformedFeed` if the text is not well-formed XML or
/// its root element is not `feed`.
pub fn decode_feed(xml: &str) -> Result<Feed> {
    let namespace = expect_root(xml, "feed")?;
    let mut feed: Feed = quick_xml::de::from_str(&canonicalize(xml)?).map_err(malformed)?;
    for entry in &mut feed.entries {
        entry.namespace = namespace.clone();
    }
    Ok(feed)
}

/// Decode a single `<entry>` document.
///
/// # Errors
///
/// Returns `ApiError::MalformedFeed` if the text is not well-formed XML or
/// its root element is not `entry`.
pub fn decode_entry(xml: &str) -> Result<Entry> {
    let namespace = expect_root(xml, "entry")?;
    let mut entry: Entry = quick_xml::de::from_str(&canonicalize(xml)?).map_err(malformed)?;
    entry.namespace = namespace;
    Ok(entry)
}

/// Check the document's root element name and return its default namespace.
///
/// Without this, serde would happily map any root onto an all-default struct.
fn expect_root(xml: &str, expected: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = e.local_name();
                return if local.as_ref() == expected.as_bytes() {
                    let namespace = e
                        .try_get_attribute("xmlns")
                        .map_err(|err| ApiError::MalformedFeed(err.to_string()))?
                        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
                        .unwrap_or_default();
                    Ok(namespace)
                } else {
                    Err(ApiError::MalformedFeed(format!(
                        "expected <{}> root element, found <{}>",
                        expected,
                        String::from_utf8_lossy(local.as_ref())
                    )))
                };
            }
            Ok(Event::Eof) => {
                return Err(ApiError::MalformedFeed(
                    "document has no root element".to_string(),
                ))
            }
            Ok(_) => continue,
            Err(e) => return Err(ApiError::MalformedFeed(e.to_string())),
        }
    }
}

/// Rewrite element names into the form the serde types expect.
///
/// Prefixes are resolved against the declarations in scope, so the vendor
/// fields bind whatever prefix the document picked for [`ISSUES_NAMESPACE`],
/// and an unprefixed `<status>` never fills `Entry::status`.
fn canonicalize(xml: &str) -> Result<String> {
    let mut reader = NsReader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    loop {
        let (ns, event) = reader.read_resolved_event().map_err(malformed)?;
        let event = match event {
            Event::Start(e) => Event::Start(rename_start(&ns, &e)?),
            Event::Empty(e) => Event::Empty(rename_start(&ns, &e)?),
            Event::End(e) => {
                Event::End(BytesEnd::new(canonical_name(&ns, e.local_name().as_ref())?))
            }
            Event::Eof => break,
            other => other,
        };
        writer.write_event(event).map_err(malformed)?;
    }
    String::from_utf8(writer.into_inner()).map_err(malformed)
}

fn rename_start(ns: &ResolveResult, start: &BytesStart) -> Result<BytesStart<'static>> {
    let mut renamed = BytesStart::new(canonical_name(ns, start.local_name().as_ref())?);
    for attr in start.attributes() {
        renamed.push_attribute(attr.map_err(malformed)?);
    }
    Ok(renamed)
}

fn canonical_name(ns: &ResolveResult, local: &[u8]) -> Result<String> {
    let local = std::str::from_utf8(local).map_err(malformed)?;
    match ns {
        ResolveResult::Bound(Namespace(uri)) if *uri == ISSUES_NAMESPACE.as_bytes() => {
            Ok(format!("issues-{}", local))
        }
        ResolveResult::Unknown(prefix) => Err(ApiError::MalformedFeed(format!(
            "undeclared namespace prefix '{}' on <{}>",
            String::from_utf8_lossy(prefix),
            local
        ))),
        _ => Ok(local.to_string()),
    }
}

fn malformed(err: impl std::fmt::Display) -> ApiError {
    ApiError::MalformedFeed(err.to_string())
}
