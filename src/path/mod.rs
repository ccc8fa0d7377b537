//! Tracking of the currently open element path.
//!
//! [`ElementPath`] mirrors the nesting of start/end events: every start pushes
//! the element name, every end pops it again. Capture decisions compare the
//! *whole* ancestor chain against a pattern, so `["root", "item"]` matches an
//! `<item>` directly under the document element and nothing else.

use std::fmt;

use crate::error::{FragmentError, Result};

/// The stack of element names from the document element down to the
/// innermost open element.
///
/// # Examples
///
/// ```
/// use xmlfrag::path::ElementPath;
///
/// let mut path = ElementPath::new();
/// path.push("root");
/// path.push("item");
/// assert!(path.matches(&["root", "item"]));
/// assert!(!path.matches(&["item"]));
///
/// path.pop("item").unwrap();
/// assert_eq!(path.to_string(), "/root");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPath {
    elements: Vec<String>,
}

impl ElementPath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters an element.
    pub fn push(&mut self, name: &str) {
        self.elements.push(name.to_string());
    }

    /// Leaves the innermost element, which must be `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InternalConsistency`] if the path is empty or
    /// its innermost element is not `name`. For a well-formed event stream
    /// this never happens.
    pub fn pop(&mut self, name: &str) -> Result<()> {
        self.check_current(name)?;
        self.elements.pop();
        Ok(())
    }

    /// Checks that the innermost open element is `name` without leaving it.
    ///
    /// # Errors
    ///
    /// Same as [`pop`](Self::pop).
    pub fn check_current(&self, name: &str) -> Result<()> {
        match self.elements.last() {
            Some(got) if got == name => Ok(()),
            Some(got) => Err(FragmentError::internal(format!(
                "element path pop: want </{name}>, got </{got}>"
            ))),
            None => Err(FragmentError::internal(format!(
                "element path pop: want </{name}>, path is empty"
            ))),
        }
    }

    /// Returns `true` if the open elements are exactly `pattern`, element for
    /// element, from the document element down.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, pattern: &[S]) -> bool {
        self.elements.len() == pattern.len()
            && self
                .elements
                .iter()
                .zip(pattern)
                .all(|(open, want)| open == want.as_ref())
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` when no element is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The innermost open element, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.elements.last().map(String::as_str)
    }

    /// The open element names, outermost first.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.elements
    }

    pub(crate) fn clear(&mut self) {
        self.elements.clear();
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str("/");
        }
        for name in &self.elements {
            write!(f, "/{name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path_of(names: &[&str]) -> ElementPath {
        let mut path = ElementPath::new();
        for name in names {
            path.push(name);
        }
        path
    }

    #[test]
    fn test_matches_exact_path() {
        let path = path_of(&["root", "item"]);
        assert!(path.matches(&["root", "item"]));
    }

    #[test]
    fn test_matches_rejects_prefix_and_suffix() {
        let path = path_of(&["root", "item", "amount"]);
        assert!(!path.matches(&["root", "item"]));
        assert!(!path.matches(&["item", "amount"]));
        assert!(!path.matches(&["amount"]));
        assert!(!path.matches(&["root", "item", "amount", "x"]));
    }

    #[test]
    fn test_matches_is_order_sensitive() {
        let path = path_of(&["a", "b"]);
        assert!(!path.matches(&["b", "a"]));
    }

    #[test]
    fn test_matches_empty() {
        let path = ElementPath::new();
        let empty: [&str; 0] = [];
        assert!(path.matches(&empty));
        assert!(!path.matches(&["root"]));
    }

    #[test]
    fn test_matches_owned_pattern() {
        let path = path_of(&["root", "item"]);
        let pattern = vec!["root".to_string(), "item".to_string()];
        assert!(path.matches(&pattern));
    }

    #[test]
    fn test_pop_matching_name() {
        let mut path = path_of(&["root", "item"]);
        path.pop("item").unwrap();
        assert_eq!(path.depth(), 1);
        assert_eq!(path.current(), Some("root"));
    }

    #[test]
    fn test_pop_mismatch_is_internal_error() {
        let mut path = path_of(&["root", "item"]);
        let err = path.pop("root").unwrap_err();
        assert!(matches!(err, FragmentError::InternalConsistency(_)));
        assert!(err.to_string().contains("want </root>, got </item>"));
    }

    #[test]
    fn test_failed_pop_leaves_path_intact() {
        let mut path = path_of(&["root", "item"]);
        assert!(path.check_current("item").is_ok());
        assert!(path.pop("other").is_err());
        assert_eq!(path.to_string(), "/root/item");
    }

    #[test]
    fn test_pop_empty_is_internal_error() {
        let mut path = ElementPath::new();
        assert!(matches!(
            path.pop("root"),
            Err(FragmentError::InternalConsistency(_))
        ));
    }

    #[test]
    fn test_depth_tracks_nesting() {
        let mut path = ElementPath::new();
        assert!(path.is_empty());
        path.push("a");
        path.push("b");
        path.push("c");
        assert_eq!(path.depth(), 3);
        path.pop("c").unwrap();
        path.pop("b").unwrap();
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(ElementPath::new().to_string(), "/");
        assert_eq!(path_of(&["root", "item"]).to_string(), "/root/item");
    }
}
