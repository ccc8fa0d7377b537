//! Incremental construction of a fragment tree from start/end/text events.
//!
//! The builder keeps the chain of elements that are still open. A new element
//! is pushed on start; on end it is popped and attached to its parent, or
//! becomes the finished root when nothing else is open. Text is buffered and
//! only flushed into the innermost open element when the next start or end
//! event arrives, so `"a"` followed by `"b"` always yields one `"ab"` node no
//! matter how the tokenizer chunked the input.

use crate::error::{FragmentError, Result};

use super::node::{Element, FragmentNode};

/// Default maximum element nesting inside a single fragment.
pub const DEFAULT_MAX_DEPTH: usize = 256;
/// Default maximum length in bytes of one coalesced text node (10 MiB).
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10 * 1024 * 1024;
/// Default maximum number of nodes in a single fragment.
pub const DEFAULT_MAX_NODES: usize = 1_000_000;

/// Bounds on the size of a single captured fragment.
///
/// Capture holds the whole matched subtree in memory, so an unexpectedly
/// large match is reported as [`FragmentError::LimitExceeded`] instead of
/// growing without bound.
///
/// ```
/// use xmlfrag::fragment::CaptureLimits;
///
/// let limits = CaptureLimits::default().max_depth(32).max_nodes(10_000);
/// assert_eq!(limits.max_depth, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    /// Maximum element nesting depth inside one fragment, root included.
    pub max_depth: usize,
    /// Maximum length in bytes of one coalesced text node.
    pub max_text_length: usize,
    /// Maximum number of element and text nodes in one fragment.
    pub max_nodes: usize,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl CaptureLimits {
    /// No limits at all.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_text_length: usize::MAX,
            max_nodes: usize::MAX,
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the maximum text node length in bytes.
    #[must_use]
    pub fn max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }

    /// Sets the maximum node count.
    #[must_use]
    pub fn max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }
}

/// Builds one fragment tree.
///
/// # Examples
///
/// ```
/// use xmlfrag::fragment::FragmentBuilder;
///
/// let mut builder = FragmentBuilder::new();
/// builder.start_element("item", &[("id".to_string(), "7".to_string())]).unwrap();
/// builder.characters("a").unwrap();
/// builder.characters("b").unwrap();
/// builder.end_element("item").unwrap();
///
/// assert!(builder.is_complete());
/// let item = builder.take_root().unwrap();
/// assert_eq!(item.get_this_text().unwrap(), "ab");
/// assert_eq!(item.get_attr_int_not_null("id").unwrap(), 7);
/// ```
#[derive(Debug, Default)]
pub struct FragmentBuilder {
    /// Elements that have been started but not ended, outermost first.
    open: Vec<Element>,
    /// The finished tree, once the root has been closed.
    root: Option<FragmentNode>,
    /// Whether a root element has been started.
    started: bool,
    /// Whether `take_root` has already handed the tree out.
    taken: bool,
    /// Text chunks awaiting flush into the innermost open element.
    pending: Vec<String>,
    pending_len: usize,
    node_count: usize,
    limits: CaptureLimits,
}

impl FragmentBuilder {
    /// Creates a builder with default [`CaptureLimits`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the given limits.
    #[must_use]
    pub fn with_limits(limits: CaptureLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Opens an element. The first call creates the fragment root.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InternalConsistency`] if the root has already
    /// been closed, and [`FragmentError::LimitExceeded`] if the element would
    /// exceed the depth or node limits.
    pub fn start_element(&mut self, tag: &str, attributes: &[(String, String)]) -> Result<()> {
        if self.started && self.open.is_empty() {
            return Err(FragmentError::internal(format!(
                "fragment already complete, cannot start <{tag}>"
            )));
        }
        if self.open.len() >= self.limits.max_depth {
            return Err(FragmentError::LimitExceeded {
                limit: "fragment depth",
                max: self.limits.max_depth,
            });
        }
        if self.open.is_empty() {
            // Text seen before the root has no element to belong to.
            self.clear_pending();
        } else {
            self.flush_text()?;
        }
        self.count_node()?;

        let mut element = Element::new(tag);
        for (key, value) in attributes {
            element.attributes.insert(key.clone(), value.clone());
        }
        self.open.push(element);
        self.started = true;
        Ok(())
    }

    /// Closes the innermost open element.
    ///
    /// The tag is not compared against the open element; the dispatcher
    /// checks nesting through its [`ElementPath`](crate::path::ElementPath).
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InternalConsistency`] if no element is open.
    pub fn end_element(&mut self, tag: &str) -> Result<()> {
        if self.open.is_empty() {
            return Err(FragmentError::internal(format!(
                "no open fragment element to end with </{tag}>"
            )));
        }
        self.flush_text()?;
        if let Some(done) = self.open.pop() {
            match self.open.last_mut() {
                Some(parent) => parent.children.push(done.into()),
                None => self.root = Some(done.into()),
            }
        }
        Ok(())
    }

    /// Buffers character data for the innermost open element.
    ///
    /// The buffer is only flushed into the tree on the next start or end
    /// event.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::LimitExceeded`] as soon as the buffered run
    /// would exceed [`CaptureLimits::max_text_length`]; the chunk is not kept.
    pub fn characters(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let len = self.pending_len.saturating_add(text.len());
        if len > self.limits.max_text_length {
            return Err(self.text_limit());
        }
        self.pending_len = len;
        self.pending.push(text.to_string());
        Ok(())
    }

    /// Returns `true` once the root element and all its descendants have
    /// been closed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.started && self.open.is_empty()
    }

    /// Current nesting depth inside the fragment.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Hands out the finished tree.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InternalConsistency`] if the fragment is not
    /// complete yet or the tree was already taken.
    pub fn take_root(&mut self) -> Result<FragmentNode> {
        if !self.is_complete() {
            return Err(FragmentError::internal(format!(
                "fragment not complete ({} elements still open)",
                self.open.len()
            )));
        }
        if self.taken {
            return Err(FragmentError::internal("fragment root already taken"));
        }
        let root = self
            .root
            .take()
            .ok_or_else(|| FragmentError::internal("fragment root missing"))?;
        self.taken = true;
        Ok(root)
    }

    fn flush_text(&mut self) -> Result<()> {
        if self.pending_len == 0 {
            self.clear_pending();
            return Ok(());
        }
        if self.pending_len > self.limits.max_text_length {
            return Err(self.text_limit());
        }
        self.count_node()?;
        let text = self.pending.concat();
        self.clear_pending();
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(FragmentNode::Text(text));
        }
        Ok(())
    }

    fn text_limit(&self) -> FragmentError {
        FragmentError::LimitExceeded {
            limit: "fragment text length",
            max: self.limits.max_text_length,
        }
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
        self.pending_len = 0;
    }

    fn count_node(&mut self) -> Result<()> {
        if self.node_count >= self.limits.max_nodes {
            return Err(FragmentError::LimitExceeded {
                limit: "fragment node count",
                max: self.limits.max_nodes,
            });
        }
        self.node_count += 1;
        Ok(())
    }
}
