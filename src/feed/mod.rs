//! Driving a [`StreamDispatcher`] from `quick-xml`.
//!
//! The dispatcher itself only consumes events; this module supplies them by
//! running a [`quick_xml::Reader`] over a string or any [`BufRead`] source.
//! The reader is pulled one event at a time, so only the buffered chunk and
//! the fragment currently being collected are held in memory.
//!
//! # Examples
//!
//! ```
//! use xmlfrag::feed::feed_str;
//! use xmlfrag::fragment::FragmentNode;
//! use xmlfrag::stream::{ElementContext, FragmentHandler, StreamDispatcher};
//! use xmlfrag::Result;
//!
//! #[derive(Default)]
//! struct Customers(Vec<(i64, String)>);
//!
//! impl FragmentHandler for Customers {
//!     fn on_element_start(
//!         &mut self,
//!         ctx: &mut ElementContext<'_>,
//!         _name: &str,
//!         _attributes: &[(String, String)],
//!     ) -> Result<()> {
//!         if ctx.is(&["allCustomers", "customer"]) {
//!             ctx.start_fragment_collection()?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn on_element_end(
//!         &mut self,
//!         _ctx: &mut ElementContext<'_>,
//!         _name: &str,
//!         fragment: Option<FragmentNode>,
//!     ) -> Result<()> {
//!         if let Some(c) = fragment {
//!             self.0.push((c.get_attr_int_not_null("id")?, c.get_string_not_null("name")?));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let xml = r#"<allCustomers>
//!   <customer id="1"><name>Ada</name></customer>
//!   <customer id="2"><name>Grace</name></customer>
//! </allCustomers>"#;
//!
//! let mut dispatcher = StreamDispatcher::new(Customers::default());
//! feed_str(xml, &mut dispatcher)?;
//! assert_eq!(
//!     dispatcher.handler().0,
//!     vec![(1, "Ada".to_string()), (2, "Grace".to_string())]
//! );
//! # Ok::<(), xmlfrag::FragmentError>(())
//! ```

use std::borrow::Cow;
use std::io::{BufRead, BufReader, Read};

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FragmentError, Result};
use crate::stream::{FragmentHandler, StreamDispatcher};

/// Default read buffer size for [`feed_reader`] (16 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 16 * 1024;

/// Options controlling how tokenizer events are mapped onto the dispatcher.
///
/// ```
/// use xmlfrag::feed::FeedOptions;
///
/// let opts = FeedOptions::default()
///     .local_names(true)
///     .trim_text(true)
///     .buffer_capacity(64 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    /// If true, strip namespace prefixes from element and attribute names.
    pub local_names: bool,
    /// If true, trim whitespace around text and drop whitespace-only text.
    ///
    /// Trimming applies to each run between markup, and an entity or
    /// character reference ends a run: `x &lt; y` is delivered as `x`, `<`
    /// and `y`, which coalesce to `x<y`.
    pub trim_text: bool,
    /// If true, end tags must match their start tags (default: true).
    pub check_end_names: bool,
    /// Read buffer size used by [`feed_reader`].
    pub buffer_capacity: usize,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            local_names: false,
            trim_text: false,
            check_end_names: true,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl FeedOptions {
    /// Enables or disables prefix stripping.
    #[must_use]
    pub fn local_names(mut self, yes: bool) -> Self {
        self.local_names = yes;
        self
    }

    /// Enables or disables text trimming.
    #[must_use]
    pub fn trim_text(mut self, yes: bool) -> Self {
        self.trim_text = yes;
        self
    }

    /// Enables or disables end tag name checking.
    #[must_use]
    pub fn check_end_names(mut self, yes: bool) -> Self {
        self.check_end_names = yes;
        self
    }

    /// Sets the read buffer size. Values below 1 are raised to 1.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }
}

/// Feeds an XML string through `dispatcher` with default options.
///
/// # Errors
///
/// Returns [`FragmentError::MalformedInput`] for ill-formed XML, and
/// propagates every error raised by the dispatcher or its handler.
pub fn feed_str<H: FragmentHandler>(
    input: &str,
    dispatcher: &mut StreamDispatcher<H>,
) -> Result<()> {
    feed_str_with_options(input, &FeedOptions::default(), dispatcher)
}

/// Feeds an XML string through `dispatcher` with the given options.
///
/// # Errors
///
/// See [`feed_str`].
pub fn feed_str_with_options<H: FragmentHandler>(
    input: &str,
    options: &FeedOptions,
    dispatcher: &mut StreamDispatcher<H>,
) -> Result<()> {
    let mut reader = Reader::from_str(input);
    configure(&mut reader, options);
    pump(&mut reader, options, dispatcher)
}

/// Feeds XML read from `source` through `dispatcher`.
///
/// The source is wrapped in a [`BufReader`] of
/// [`FeedOptions::buffer_capacity`] bytes.
///
/// # Errors
///
/// Returns [`FragmentError::Io`] if reading fails, and otherwise the errors
/// of [`feed_str`].
pub fn feed_reader<R: Read, H: FragmentHandler>(
    source: R,
    options: &FeedOptions,
    dispatcher: &mut StreamDispatcher<H>,
) -> Result<()> {
    let buffered = BufReader::with_capacity(options.buffer_capacity, source);
    let mut reader = Reader::from_reader(buffered);
    configure(&mut reader, options);
    pump(&mut reader, options, dispatcher)
}

fn configure<R>(reader: &mut Reader<R>, options: &FeedOptions) {
    let config = reader.config_mut();
    config.trim_text(options.trim_text);
    config.check_end_names = options.check_end_names;
}

fn pump<R: BufRead, H: FragmentHandler>(
    reader: &mut Reader<R>,
    options: &FeedOptions,
    dispatcher: &mut StreamDispatcher<H>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(quick_xml::Error::Io(err)) => {
                let err = std::io::Error::new(err.kind(), err.to_string());
                dispatcher.abandon(&err);
                return Err(FragmentError::Io(err));
            }
            Err(err) => {
                let position = reader.error_position();
                return dispatcher.error_at(&err.to_string(), position);
            }
        };

        // Anything the tokenizer accepted but we cannot decode is still
        // malformed input, reported through the dispatcher.
        let decoded = match decode(&event, options) {
            Ok(decoded) => decoded,
            Err(FragmentError::MalformedInput { message, .. }) => {
                return dispatcher.error_at(&message, reader.buffer_position())
            }
            Err(err) => return Err(err),
        };

        match decoded {
            Decoded::Start(name, attributes) => dispatcher.start_element(&name, &attributes)?,
            Decoded::Empty(name, attributes) => {
                dispatcher.start_element(&name, &attributes)?;
                dispatcher.end_element(&name)?;
            }
            Decoded::End(name) => dispatcher.end_element(&name)?,
            Decoded::Text(text) => dispatcher.characters(&text)?,
            Decoded::CData(text) => dispatcher.cdata(text)?,
            Decoded::Comment(text) => dispatcher.comment(&text),
            Decoded::Skip => {}
            Decoded::Eof => break,
        }
    }

    debug!("end of input after {} fragments", dispatcher.fragments_delivered());
    dispatcher.finish()
}

/// A tokenizer event reduced to the strings the dispatcher consumes.
enum Decoded<'e> {
    Start(String, Vec<(String, String)>),
    Empty(String, Vec<(String, String)>),
    End(String),
    Text(Cow<'e, str>),
    CData(&'e str),
    Comment(Cow<'e, str>),
    Skip,
    Eof,
}

fn decode<'e>(event: &'e Event<'_>, options: &FeedOptions) -> Result<Decoded<'e>> {
    let decoded = match event {
        Event::Start(e) => {
            let (name, attributes) = start_tag(e, options)?;
            Decoded::Start(name, attributes)
        }
        Event::Empty(e) => {
            let (name, attributes) = start_tag(e, options)?;
            Decoded::Empty(name, attributes)
        }
        Event::End(e) => {
            let name = if options.local_names {
                utf8(e.local_name().into_inner())?
            } else {
                utf8(e.name().into_inner())?
            };
            Decoded::End(name.to_string())
        }
        Event::Text(e) => {
            let text = quick_xml::escape::unescape(utf8(e)?)
                .map_err(|err| FragmentError::malformed(err.to_string()))?;
            Decoded::Text(text)
        }
        Event::CData(e) => Decoded::CData(utf8(e)?),
        Event::GeneralRef(e) => {
            let resolved = match e
                .resolve_char_ref()
                .map_err(|err| FragmentError::malformed(err.to_string()))?
            {
                Some(ch) => ch.to_string(),
                None => {
                    let entity = utf8(e)?;
                    quick_xml::escape::resolve_predefined_entity(entity)
                        .ok_or_else(|| {
                            FragmentError::malformed(format!("undefined entity &{entity};"))
                        })?
                        .to_string()
                }
            };
            Decoded::Text(Cow::Owned(resolved))
        }
        Event::Comment(e) => Decoded::Comment(String::from_utf8_lossy(e)),
        Event::Eof => Decoded::Eof,
        // Declarations, processing instructions and doctype carry
        // nothing the dispatcher consumes.
        _ => Decoded::Skip,
    };
    Ok(decoded)
}

type OwnedStart = (String, Vec<(String, String)>);

fn start_tag(e: &BytesStart<'_>, options: &FeedOptions) -> Result<OwnedStart> {
    let name = if options.local_names {
        utf8(e.local_name().into_inner())?
    } else {
        utf8(e.name().into_inner())?
    };

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| FragmentError::malformed(err.to_string()))?;
        let key = if options.local_names {
            utf8(attr.key.local_name().into_inner())?
        } else {
            utf8(attr.key.into_inner())?
        };
        let value = quick_xml::escape::unescape(utf8(&attr.value)?)
            .map_err(|err| FragmentError::malformed(err.to_string()))?;
        attributes.push((key.to_string(), value.into_owned()));
    }
    Ok((name.to_string(), attributes))
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|err| FragmentError::malformed(format!("invalid UTF-8: {err}")))
}
