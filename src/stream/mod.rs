//! Event dispatch between pass-through and capture.
//!
//! [`StreamDispatcher`] consumes SAX-style events one at a time. While no
//! fragment is being collected (pass-through), every event is forwarded to
//! the application's [`FragmentHandler`]. When the handler calls
//! [`ElementContext::start_fragment_collection`] from inside
//! [`FragmentHandler::on_element_start`], the dispatcher switches to capture:
//! that element and everything under it is absorbed into a
//! [`FragmentBuilder`], and the finished tree is handed to
//! [`FragmentHandler::on_element_end`] when the element closes.
//!
//! # Examples
//!
//! ```
//! use xmlfrag::fragment::FragmentNode;
//! use xmlfrag::stream::{ElementContext, FragmentHandler, StreamDispatcher};
//! use xmlfrag::Result;
//!
//! #[derive(Default)]
//! struct Amounts(Vec<f64>);
//!
//! impl FragmentHandler for Amounts {
//!     fn on_element_start(
//!         &mut self,
//!         ctx: &mut ElementContext<'_>,
//!         _name: &str,
//!         _attributes: &[(String, String)],
//!     ) -> Result<()> {
//!         if ctx.is(&["root", "item"]) {
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
//!         if let Some(item) = fragment {
//!             self.0.push(item.get_float_not_null("amount")?);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut dispatcher = StreamDispatcher::new(Amounts::default());
//! dispatcher.start_element("root", &[])?;
//! dispatcher.start_element("item", &[])?;
//! dispatcher.start_element("amount", &[])?;
//! dispatcher.characters("12.5")?;
//! dispatcher.end_element("amount")?;
//! dispatcher.end_element("item")?;
//! dispatcher.end_element("root")?;
//! dispatcher.finish()?;
//!
//! assert_eq!(dispatcher.handler().0, vec![12.5]);
//! # Ok::<(), xmlfrag::FragmentError>(())
//! ```

use std::fmt;

use log::{debug, trace, warn};

use crate::error::{FragmentError, Result};
use crate::fragment::{CaptureLimits, FragmentBuilder, FragmentNode};
use crate::path::ElementPath;

/// Application callbacks driven by a [`StreamDispatcher`].
///
/// Only pass-through events reach the handler: while a fragment is being
/// collected, the events inside it are absorbed into the fragment instead.
#[allow(unused_variables)]
pub trait FragmentHandler {
    /// Called when an element starts outside any fragment. Does nothing by
    /// default, so a handler that never captures passes everything through.
    ///
    /// `ctx.path()` already includes `name`. Call
    /// [`ctx.start_fragment_collection()`](ElementContext::start_fragment_collection)
    /// to capture this element and its whole subtree.
    ///
    /// # Errors
    ///
    /// Any error is propagated out of the dispatcher call unchanged.
    fn on_element_start(
        &mut self,
        ctx: &mut ElementContext<'_>,
        name: &str,
        attributes: &[(String, String)],
    ) -> Result<()> {
        Ok(())
    }

    /// Called when an element ends outside any fragment.
    ///
    /// `fragment` is `Some` exactly when this end closes a fragment that was
    /// requested at the matching start. `ctx.path()` still includes `name`.
    ///
    /// # Errors
    ///
    /// Any error is propagated out of the dispatcher call unchanged.
    fn on_element_end(
        &mut self,
        ctx: &mut ElementContext<'_>,
        name: &str,
        fragment: Option<FragmentNode>,
    ) -> Result<()> {
        Ok(())
    }

    /// Called for character data outside any fragment.
    ///
    /// # Errors
    ///
    /// Any error is propagated out of the dispatcher call unchanged.
    fn on_characters(&mut self, text: &str) -> Result<()> {
        Ok(())
    }
}

/// Whether a capture request is currently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureWindow {
    /// Outside `on_element_start`.
    Closed,
    /// Inside `on_element_start`, no request yet.
    Open,
    /// Inside `on_element_start`, collection already requested.
    Requested,
}

/// The view of the dispatcher a [`FragmentHandler`] hook receives.
#[derive(Debug)]
pub struct ElementContext<'d> {
    path: &'d ElementPath,
    window: CaptureWindow,
}

impl<'d> ElementContext<'d> {
    fn new(path: &'d ElementPath, window: CaptureWindow) -> Self {
        Self { path, window }
    }

    /// The open element path, including the current element.
    #[must_use]
    pub fn path(&self) -> &ElementPath {
        self.path
    }

    /// Returns `true` if the open element path is exactly `pattern`.
    #[must_use]
    pub fn is<S: AsRef<str>>(&self, pattern: &[S]) -> bool {
        self.path.matches(pattern)
    }

    /// Current nesting depth, including the current element.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Requests that the element being started, and its whole subtree, be
    /// collected into a fragment.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InvalidCaptureRequest`] when called outside
    /// [`FragmentHandler::on_element_start`] or more than once for the same
    /// element.
    pub fn start_fragment_collection(&mut self) -> Result<()> {
        match self.window {
            CaptureWindow::Open => {
                self.window = CaptureWindow::Requested;
                Ok(())
            }
            CaptureWindow::Requested => Err(FragmentError::InvalidCaptureRequest(
                "fragment collection already started".to_string(),
            )),
            CaptureWindow::Closed => Err(FragmentError::InvalidCaptureRequest(
                "fragment collection can only start within on_element_start".to_string(),
            )),
        }
    }

    /// Returns `true` if collection has been requested during this hook.
    #[must_use]
    pub fn collection_requested(&self) -> bool {
        self.window == CaptureWindow::Requested
    }
}

/// The dispatcher's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No fragment is being collected; events go to the handler.
    PassThrough,
    /// A fragment is being collected; events go to the builder.
    Capturing,
}

/// Routes parse events either to a [`FragmentHandler`] or into the fragment
/// currently being collected.
///
/// The dispatcher is reusable for a whole stream and returns to
/// [`DispatchState::PassThrough`] after each delivered fragment. Structural
/// errors (malformed input, nesting mismatches, misuse) abort the stream: the
/// dispatcher discards any partial fragment and the caller should stop
/// feeding events, or call [`reset`](Self::reset) before starting over.
#[derive(Debug)]
pub struct StreamDispatcher<H> {
    handler: H,
    path: ElementPath,
    session: Option<FragmentBuilder>,
    limits: CaptureLimits,
    delivered: u64,
}

impl<H: FragmentHandler> StreamDispatcher<H> {
    /// Creates a dispatcher with default [`CaptureLimits`].
    pub fn new(handler: H) -> Self {
        Self::with_limits(handler, CaptureLimits::default())
    }

    /// Creates a dispatcher whose fragments are bounded by `limits`.
    pub fn with_limits(handler: H, limits: CaptureLimits) -> Self {
        Self {
            handler,
            path: ElementPath::new(),
            session: None,
            limits,
            delivered: 0,
        }
    }

    /// An element start tag.
    ///
    /// # Errors
    ///
    /// Propagates handler errors, [`FragmentError::LimitExceeded`] from the
    /// active capture, and the builder's consistency errors.
    pub fn start_element(&mut self, name: &str, attributes: &[(String, String)]) -> Result<()> {
        self.path.push(name);
        trace!("start {} ({} attributes)", self.path, attributes.len());

        if self.session.is_none() {
            let mut ctx = ElementContext::new(&self.path, CaptureWindow::Open);
            let outcome = self.handler.on_element_start(&mut ctx, name, attributes);
            let requested = ctx.collection_requested();
            outcome?;
            if requested {
                debug!("fragment collection started at {}", self.path);
                self.session = Some(FragmentBuilder::with_limits(self.limits));
            }
        }

        // The element that triggered collection is the fragment root.
        if let Some(session) = self.session.as_mut() {
            if let Err(err) = session.start_element(name, attributes) {
                self.abandon(&err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// An element end tag.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InternalConsistency`] if `name` is not the
    /// innermost open element, and propagates handler and builder errors.
    pub fn end_element(&mut self, name: &str) -> Result<()> {
        self.path.check_current(name)?;
        trace!("end {}", self.path);
        let mut fragment = None;
        if let Some(session) = self.session.as_mut() {
            match close_in_session(session, name) {
                Ok(Some(root)) => {
                    fragment = Some(root);
                    self.session = None;
                    self.delivered += 1;
                    debug!("fragment collected at {}", self.path);
                }
                Ok(None) => {}
                Err(err) => {
                    self.abandon(&err);
                    return Err(err);
                }
            }
        }

        if self.session.is_none() {
            let mut ctx = ElementContext::new(&self.path, CaptureWindow::Closed);
            self.handler.on_element_end(&mut ctx, name, fragment)?;
        }

        self.path.pop(name)
    }

    /// Character data.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`FragmentHandler::on_characters`], and
    /// [`FragmentError::LimitExceeded`] once captured text grows past
    /// [`CaptureLimits::max_text_length`].
    pub fn characters(&mut self, text: &str) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => {
                if let Err(err) = session.characters(text) {
                    self.abandon(&err);
                    return Err(err);
                }
                Ok(())
            }
            None => self.handler.on_characters(text),
        }
    }

    /// A CDATA section; routed exactly like [`characters`](Self::characters).
    ///
    /// # Errors
    ///
    /// Propagates errors from [`FragmentHandler::on_characters`].
    pub fn cdata(&mut self, text: &str) -> Result<()> {
        self.characters(text)
    }

    /// A comment. Ignored.
    pub fn comment(&mut self, text: &str) {
        trace!("ignoring comment at {} ({} bytes)", self.path, text.len());
    }

    /// A tokenizer warning. Ignored.
    pub fn warning(&mut self, message: &str) {
        debug!("ignoring XML warning at {}: {message}", self.path);
    }

    /// A tokenizer error. Always fails with [`FragmentError::MalformedInput`].
    ///
    /// # Errors
    ///
    /// Always.
    pub fn error(&mut self, message: &str) -> Result<()> {
        Err(self.fail(message, None))
    }

    /// Like [`error`](Self::error), with the byte offset the tokenizer
    /// stopped at.
    ///
    /// # Errors
    ///
    /// Always.
    pub fn error_at(&mut self, message: &str, byte_offset: u64) -> Result<()> {
        Err(self.fail(message, Some(byte_offset)))
    }

    /// Checks that the stream ended with every element closed.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::MalformedInput`] if elements are still open;
    /// a partially collected fragment is discarded.
    pub fn finish(&mut self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        let message = format!(
            "unexpected end of input with {} unclosed element(s) at {}",
            self.path.depth(),
            self.path
        );
        Err(self.fail(&message, None))
    }

    fn fail(&mut self, message: &str, byte_offset: Option<u64>) -> FragmentError {
        self.abandon(&message);
        FragmentError::MalformedInput {
            message: message.to_string(),
            byte_offset,
        }
    }

    /// Drops any partial fragment, logging why.
    pub(crate) fn abandon(&mut self, reason: &dyn fmt::Display) {
        if let Some(session) = self.session.take() {
            warn!(
                "discarding partial fragment at {} ({} elements open): {reason}",
                self.path,
                session.depth()
            );
        }
    }

    /// Forgets the open path and any partial fragment so the dispatcher can
    /// consume a new stream.
    pub fn reset(&mut self) {
        self.session = None;
        self.path.clear();
    }

    /// The current mode.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        if self.session.is_some() {
            DispatchState::Capturing
        } else {
            DispatchState::PassThrough
        }
    }

    /// Returns `true` while a fragment is being collected.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.state() == DispatchState::Capturing
    }

    /// The open element path.
    #[must_use]
    pub fn path(&self) -> &ElementPath {
        &self.path
    }

    /// Number of fragments delivered so far.
    #[must_use]
    pub fn fragments_delivered(&self) -> u64 {
        self.delivered
    }

    /// The capture limits applied to each fragment.
    #[must_use]
    pub fn limits(&self) -> CaptureLimits {
        self.limits
    }

    /// The application handler.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The application handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the dispatcher and returns the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }
}

/// Closes one element of the active fragment, returning the tree once its
/// root has been closed.
fn close_in_session(session: &mut FragmentBuilder, name: &str) -> Result<Option<FragmentNode>> {
    session.end_element(name)?;
    if session.is_complete() {
        return session.take_root().map(Some);
    }
    Ok(None)
}
