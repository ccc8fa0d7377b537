//! Fragment node definitions and typed accessors.
//!
//! A [`FragmentNode`] is either an element (tag, attributes, ordered children)
//! or a text leaf. Captured fragments are read through the accessor families
//! below, each of which comes in three flavours:
//!
//! | Flavour            | absent or empty           | present but malformed |
//! |--------------------|---------------------------|-----------------------|
//! | `..._not_null`     | [`ValueMissing`]          | [`ValueConversion`]   |
//! | `..._object`       | `Ok(None)`                | [`ValueConversion`]   |
//! | plain (`default`)  | `Ok(default)`             | [`ValueConversion`]   |
//!
//! Only absence is turned into a fallback. An ambiguous child lookup
//! ([`MultipleChildren`]) or a lookup on the wrong node shape
//! ([`InternalConsistency`]) is reported by every flavour.
//!
//! [`ValueMissing`]: FragmentError::ValueMissing
//! [`ValueConversion`]: FragmentError::ValueConversion
//! [`MultipleChildren`]: FragmentError::MultipleChildren
//! [`InternalConsistency`]: FragmentError::InternalConsistency

use indexmap::IndexMap;

use crate::error::{FragmentError, Result};
use crate::util::number::{is_blank, parse_float, parse_int};

/// Attribute mapping of an element, in document order.
pub type Attributes = IndexMap<String, String>;

/// A node of a captured fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentNode {
    /// An element with its attributes and children.
    Element(Element),
    /// Character data. Adjacent text and CDATA runs are coalesced into one
    /// text node by the builder.
    Text(String),
}

/// The payload of an element node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// The element name as delivered by the tokenizer.
    pub tag: String,
    /// Attributes; keys are unique.
    pub attributes: Attributes,
    /// Child nodes in document order.
    pub children: Vec<FragmentNode>,
}

impl Element {
    /// Creates an element with no attributes and no children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute, replacing any earlier value for the same key.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<FragmentNode>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<Element> for FragmentNode {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl FragmentNode {
    /// Creates a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates an element node from a tag and `(key, value)` attribute pairs.
    #[must_use]
    pub fn element<I, K, V>(tag: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Element(Element {
            tag: tag.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            children: Vec::new(),
        })
    }

    // --- Shape ---

    /// Returns `true` for a text node.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns `true` for an element node.
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    /// The element payload, if this is an element.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// The element's tag, or `None` for a text node.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag.as_str())
    }

    /// The value of a text node, or `None` for an element.
    #[must_use]
    pub fn text_value(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Element(_) => None,
        }
    }

    /// The element's attributes, or `None` for a text node.
    #[must_use]
    pub fn attributes(&self) -> Option<&Attributes> {
        self.as_element().map(|e| &e.attributes)
    }

    /// A single attribute value, if this is an element carrying it.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    /// Child nodes in document order; empty for a text node.
    #[must_use]
    pub fn children(&self) -> &[FragmentNode] {
        match self {
            Self::Element(element) => &element.children,
            Self::Text(_) => &[],
        }
    }

    /// Element children only, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &FragmentNode> {
        self.children().iter().filter(|c| c.is_element())
    }

    /// All element children named `tag`.
    ///
    /// Unlike [`get`](Self::get) this accepts repeated siblings, which is the
    /// way to read list-like content.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a FragmentNode> {
        self.children()
            .iter()
            .filter(move |c| c.tag() == Some(tag))
    }

    fn expect_element(&self, operation: &str) -> Result<&Element> {
        match self {
            Self::Element(element) => Ok(element),
            Self::Text(_) => Err(FragmentError::internal(format!(
                "{operation} called on a text node"
            ))),
        }
    }

    /// Checks that this element is named `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InternalConsistency`] if the tag differs or
    /// this is a text node.
    pub fn assert_tag(&self, tag: &str) -> Result<()> {
        let element = self.expect_element("assert_tag")?;
        if element.tag == tag {
            Ok(())
        } else {
            Err(FragmentError::internal(format!(
                "expected tag <{tag}>, have <{}>",
                element.tag
            )))
        }
    }

    // --- Child lookup ---

    /// Looks up the single child element named `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::MultipleChildren`] if more than one child is
    /// named `tag`, even when the children are identical, and
    /// [`FragmentError::InternalConsistency`] on a text node.
    pub fn get(&self, tag: &str) -> Result<Option<&FragmentNode>> {
        let element = self.expect_element("get")?;
        let mut found = None;
        let mut count = 0;
        for child in &element.children {
            if child.tag() == Some(tag) {
                count += 1;
                found.get_or_insert(child);
            }
        }
        if count > 1 {
            return Err(FragmentError::MultipleChildren {
                tag: tag.to_string(),
                count,
            });
        }
        Ok(found)
    }

    /// Like [`get`](Self::get), but a missing child is an error.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::ValueMissing`] if there is no such child,
    /// plus the errors of [`get`](Self::get).
    pub fn get_not_null(&self, tag: &str) -> Result<&FragmentNode> {
        self.get(tag)?
            .ok_or_else(|| FragmentError::missing(format!("no such tag: <{tag}>")))
    }

    // --- Own text ---

    /// Concatenates the text children of this element; `""` when there are
    /// none.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InternalConsistency`] if the element has an
    /// element child (mixed content) or this is a text node.
    pub fn get_this_text(&self) -> Result<String> {
        let element = self.expect_element("get_this_text")?;
        let mut text = String::new();
        for child in &element.children {
            match child {
                Self::Text(value) => text.push_str(value),
                Self::Element(inner) => {
                    return Err(FragmentError::internal(format!(
                        "element <{}> has a non-text child <{}>",
                        element.tag, inner.tag
                    )))
                }
            }
        }
        Ok(text)
    }

    /// The element's own text, with `""` promoted to `None`.
    ///
    /// # Errors
    ///
    /// See [`get_this_text`](Self::get_this_text).
    pub fn get_this_string_object(&self) -> Result<Option<String>> {
        let text = self.get_this_text()?;
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    /// The element's own text, which must not be empty.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::ValueMissing`] if the text is empty, plus the
    /// errors of [`get_this_text`](Self::get_this_text).
    pub fn get_this_string_not_null(&self) -> Result<String> {
        self.get_this_string_object()?
            .ok_or_else(|| self.missing_own_text())
    }

    /// The element's own text, or `default` if it is empty.
    ///
    /// # Errors
    ///
    /// See [`get_this_text`](Self::get_this_text).
    pub fn get_this_string(&self, default: &str) -> Result<String> {
        Ok(self
            .get_this_string_object()?
            .unwrap_or_else(|| default.to_string()))
    }

    fn missing_own_text(&self) -> FragmentError {
        FragmentError::missing(format!("text of <{}>", self.tag().unwrap_or_default()))
    }

    fn own_number_source(&self) -> Result<Option<String>> {
        let text = self.get_this_text()?;
        Ok(if is_blank(&text) { None } else { Some(text) })
    }

    /// The element's own text as an integer.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if the text is empty,
    /// [`FragmentError::ValueConversion`] if it is not an exact integer.
    pub fn get_this_int_not_null(&self) -> Result<i64> {
        match self.own_number_source()? {
            Some(s) => parse_int(&s),
            None => Err(self.missing_own_text()),
        }
    }

    /// The element's own text as an integer, `None` if empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if the text is not an exact integer.
    pub fn get_this_int_object(&self) -> Result<Option<i64>> {
        self.own_number_source()?.map(|s| parse_int(&s)).transpose()
    }

    /// The element's own text as an integer, `default` if empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if the text is not an exact integer.
    pub fn get_this_int(&self, default: i64) -> Result<i64> {
        Ok(self.get_this_int_object()?.unwrap_or(default))
    }

    /// The element's own text as a float.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if the text is empty,
    /// [`FragmentError::ValueConversion`] if it is not numeric.
    pub fn get_this_float_not_null(&self) -> Result<f64> {
        match self.own_number_source()? {
            Some(s) => parse_float(&s),
            None => Err(self.missing_own_text()),
        }
    }

    /// The element's own text as a float, `None` if empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if the text is not numeric.
    pub fn get_this_float_object(&self) -> Result<Option<f64>> {
        self.own_number_source()?.map(|s| parse_float(&s)).transpose()
    }

    /// The element's own text as a float, `default` if empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if the text is not numeric.
    pub fn get_this_float(&self, default: f64) -> Result<f64> {
        Ok(self.get_this_float_object()?.unwrap_or(default))
    }

    // --- Child element values ---

    /// The text of child `tag`; a present but empty child yields `""`.
    ///
    /// # Errors
    ///
    /// The errors of [`get`](Self::get) and
    /// [`get_this_text`](Self::get_this_text) on the child.
    pub fn get_string_object(&self, tag: &str) -> Result<Option<String>> {
        self.get(tag)?.map(Self::get_this_text).transpose()
    }

    /// The text of child `tag`, which must exist.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if there is no such child, plus the
    /// errors of [`get_string_object`](Self::get_string_object).
    pub fn get_string_not_null(&self, tag: &str) -> Result<String> {
        self.get_string_object(tag)?
            .ok_or_else(|| missing_child(tag))
    }

    /// The text of child `tag`, or `default` if there is no such child.
    ///
    /// # Errors
    ///
    /// See [`get_string_object`](Self::get_string_object).
    pub fn get_string(&self, tag: &str, default: &str) -> Result<String> {
        Ok(self
            .get_string_object(tag)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn child_number_source(&self, tag: &str) -> Result<Option<String>> {
        Ok(self.get_string_object(tag)?.filter(|s| !is_blank(s)))
    }

    /// Child `tag` as an integer.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if the child is absent or empty,
    /// [`FragmentError::ValueConversion`] if it is not an exact integer, plus
    /// the lookup errors of [`get`](Self::get).
    pub fn get_int_not_null(&self, tag: &str) -> Result<i64> {
        match self.child_number_source(tag)? {
            Some(s) => parse_int(&s),
            None => Err(missing_child(tag)),
        }
    }

    /// Child `tag` as an integer, `None` if absent or empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if it is not an exact integer, plus
    /// the lookup errors of [`get`](Self::get).
    pub fn get_int_object(&self, tag: &str) -> Result<Option<i64>> {
        self.child_number_source(tag)?
            .map(|s| parse_int(&s))
            .transpose()
    }

    /// Child `tag` as an integer, `default` if absent or empty.
    ///
    /// # Errors
    ///
    /// See [`get_int_object`](Self::get_int_object).
    pub fn get_int(&self, tag: &str, default: i64) -> Result<i64> {
        Ok(self.get_int_object(tag)?.unwrap_or(default))
    }

    /// Child `tag` as a float.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if the child is absent or empty,
    /// [`FragmentError::ValueConversion`] if it is not numeric, plus the
    /// lookup errors of [`get`](Self::get).
    pub fn get_float_not_null(&self, tag: &str) -> Result<f64> {
        match self.child_number_source(tag)? {
            Some(s) => parse_float(&s),
            None => Err(missing_child(tag)),
        }
    }

    /// Child `tag` as a float, `None` if absent or empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if it is not numeric, plus the
    /// lookup errors of [`get`](Self::get).
    pub fn get_float_object(&self, tag: &str) -> Result<Option<f64>> {
        self.child_number_source(tag)?
            .map(|s| parse_float(&s))
            .transpose()
    }

    /// Child `tag` as a float, `default` if absent or empty.
    ///
    /// # Errors
    ///
    /// See [`get_float_object`](Self::get_float_object).
    pub fn get_float(&self, tag: &str, default: f64) -> Result<f64> {
        Ok(self.get_float_object(tag)?.unwrap_or(default))
    }

    // --- Attribute values ---

    /// Attribute `attr`, `None` if the element does not carry it.
    ///
    /// # Errors
    ///
    /// [`FragmentError::InternalConsistency`] on a text node.
    pub fn get_attr_string_object(&self, attr: &str) -> Result<Option<&str>> {
        let element = self.expect_element("get_attr_string_object")?;
        Ok(element.attributes.get(attr).map(String::as_str))
    }

    /// Attribute `attr`, which must be present.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if the attribute is absent.
    pub fn get_attr_string_not_null(&self, attr: &str) -> Result<&str> {
        self.get_attr_string_object(attr)?
            .ok_or_else(|| missing_attr(attr))
    }

    /// Attribute `attr`, or `default` if absent.
    ///
    /// # Errors
    ///
    /// [`FragmentError::InternalConsistency`] on a text node.
    pub fn get_attr_string<'a>(&'a self, attr: &str, default: &'a str) -> Result<&'a str> {
        Ok(self.get_attr_string_object(attr)?.unwrap_or(default))
    }

    fn attr_number_source(&self, attr: &str) -> Result<Option<&str>> {
        Ok(self.get_attr_string_object(attr)?.filter(|s| !is_blank(s)))
    }

    /// Attribute `attr` as an integer.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if absent or empty,
    /// [`FragmentError::ValueConversion`] if not an exact integer.
    pub fn get_attr_int_not_null(&self, attr: &str) -> Result<i64> {
        match self.attr_number_source(attr)? {
            Some(s) => parse_int(s),
            None => Err(missing_attr(attr)),
        }
    }

    /// Attribute `attr` as an integer, `None` if absent or empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if not an exact integer.
    pub fn get_attr_int_object(&self, attr: &str) -> Result<Option<i64>> {
        self.attr_number_source(attr)?.map(parse_int).transpose()
    }

    /// Attribute `attr` as an integer, `default` if absent or empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if not an exact integer.
    pub fn get_attr_int(&self, attr: &str, default: i64) -> Result<i64> {
        Ok(self.get_attr_int_object(attr)?.unwrap_or(default))
    }

    /// Attribute `attr` as a float.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueMissing`] if absent or empty,
    /// [`FragmentError::ValueConversion`] if not numeric.
    pub fn get_attr_float_not_null(&self, attr: &str) -> Result<f64> {
        match self.attr_number_source(attr)? {
            Some(s) => parse_float(s),
            None => Err(missing_attr(attr)),
        }
    }

    /// Attribute `attr` as a float, `None` if absent or empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if not numeric.
    pub fn get_attr_float_object(&self, attr: &str) -> Result<Option<f64>> {
        self.attr_number_source(attr)?.map(parse_float).transpose()
    }

    /// Attribute `attr` as a float, `default` if absent or empty.
    ///
    /// # Errors
    ///
    /// [`FragmentError::ValueConversion`] if not numeric.
    pub fn get_attr_float(&self, attr: &str, default: f64) -> Result<f64> {
        Ok(self.get_attr_float_object(attr)?.unwrap_or(default))
    }
}

fn missing_child(tag: &str) -> FragmentError {
    FragmentError::missing(format!("child <{tag}>"))
}

fn missing_attr(attr: &str) -> FragmentError {
    FragmentError::missing(format!("attribute {attr:?}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(tag: &str, text: &str) -> Element {
        Element::new(tag).with_child(FragmentNode::text(text))
    }

    fn customer() -> FragmentNode {
        Element::new("customer")
            .with_attribute("id", "7")
            .with_attribute("rating", "4.5")
            .with_attribute("note", "")
            .with_child(leaf("name", "Ada"))
            .with_child(leaf("accountCount", "3"))
            .with_child(leaf("totalBalance", "12.5"))
            .with_child(Element::new("nickname"))
            .with_child(leaf("code", "X1"))
            .into()
    }

    // --- Shape ---

    #[test]
    fn test_shape_getters() {
        let node = customer();
        assert!(node.is_element());
        assert!(!node.is_text());
        assert_eq!(node.tag(), Some("customer"));
        assert_eq!(node.attribute("id"), Some("7"));
        assert_eq!(node.children().len(), 5);

        let text = FragmentNode::text("hi");
        assert!(text.is_text());
        assert_eq!(text.tag(), None);
        assert_eq!(text.text_value(), Some("hi"));
        assert!(text.children().is_empty());
        assert!(text.attributes().is_none());
    }

    #[test]
    fn test_element_constructor_keeps_attribute_order() {
        let node = FragmentNode::element("item", [("b", "2"), ("a", "1")]);
        let keys: Vec<&str> = node
            .attributes()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_assert_tag() {
        let node = customer();
        assert!(node.assert_tag("customer").is_ok());
        assert!(matches!(
            node.assert_tag("order"),
            Err(FragmentError::InternalConsistency(_))
        ));
    }

    // --- Child lookup ---

    #[test]
    fn test_get_single_child() {
        let node = customer();
        let name = node.get("name").unwrap().unwrap();
        assert_eq!(name.get_this_text().unwrap(), "Ada");
    }

    #[test]
    fn test_get_absent_child() {
        assert!(customer().get("missing").unwrap().is_none());
    }

    #[test]
    fn test_get_duplicate_children_is_ambiguous() {
        let node: FragmentNode = Element::new("list")
            .with_child(leaf("entry", "same"))
            .with_child(leaf("entry", "same"))
            .into();
        let err = node.get("entry").unwrap_err();
        assert!(matches!(
            err,
            FragmentError::MultipleChildren { ref tag, count: 2 } if tag == "entry"
        ));
    }

    #[test]
    fn test_get_on_text_node_is_internal_error() {
        let text = FragmentNode::text("x");
        assert!(matches!(
            text.get("a"),
            Err(FragmentError::InternalConsistency(_))
        ));
    }

    #[test]
    fn test_get_not_null() {
        let node = customer();
        assert!(node.get_not_null("name").is_ok());
        assert!(matches!(
            node.get_not_null("missing"),
            Err(FragmentError::ValueMissing { .. })
        ));
    }

    #[test]
    fn test_children_named_allows_repeats() {
        let node: FragmentNode = Element::new("list")
            .with_child(leaf("entry", "a"))
            .with_child(FragmentNode::text(" "))
            .with_child(leaf("entry", "b"))
            .into();
        let values: Vec<String> = node
            .children_named("entry")
            .map(|c| c.get_this_text().unwrap())
            .collect();
        assert_eq!(values, vec!["a", "b"]);
        assert_eq!(node.elements().count(), 2);
    }

    // --- Own text ---

    #[test]
    fn test_this_text_concatenates_text_children() {
        let node: FragmentNode = Element::new("p")
            .with_child(FragmentNode::text("ab"))
            .with_child(FragmentNode::text("cd"))
            .into();
        assert_eq!(node.get_this_text().unwrap(), "abcd");
    }

    #[test]
    fn test_this_text_rejects_mixed_content() {
        let node: FragmentNode = Element::new("p")
            .with_child(FragmentNode::text("a"))
            .with_child(Element::new("b"))
            .into();
        assert!(matches!(
            node.get_this_text(),
            Err(FragmentError::InternalConsistency(_))
        ));
    }

    #[test]
    fn test_this_string_empty_is_null() {
        let empty: FragmentNode = Element::new("e").into();
        assert_eq!(empty.get_this_text().unwrap(), "");
        assert_eq!(empty.get_this_string_object().unwrap(), None);
        assert_eq!(empty.get_this_string("dflt").unwrap(), "dflt");
        assert!(matches!(
            empty.get_this_string_not_null(),
            Err(FragmentError::ValueMissing { .. })
        ));

        let full: FragmentNode = leaf("e", "v").into();
        assert_eq!(full.get_this_string_not_null().unwrap(), "v");
        assert_eq!(full.get_this_string("dflt").unwrap(), "v");
    }

    #[test]
    fn test_this_numbers() {
        let int: FragmentNode = leaf("n", "42").into();
        assert_eq!(int.get_this_int_not_null().unwrap(), 42);
        assert_eq!(int.get_this_int_object().unwrap(), Some(42));
        assert_eq!(int.get_this_float_not_null().unwrap(), 42.0);

        let empty: FragmentNode = Element::new("n").into();
        assert_eq!(empty.get_this_int(5).unwrap(), 5);
        assert_eq!(empty.get_this_int_object().unwrap(), None);
        assert_eq!(empty.get_this_float(1.5).unwrap(), 1.5);
        assert_eq!(empty.get_this_float_object().unwrap(), None);
        assert!(matches!(
            empty.get_this_int_not_null(),
            Err(FragmentError::ValueMissing { .. })
        ));
        assert!(matches!(
            empty.get_this_float_not_null(),
            Err(FragmentError::ValueMissing { .. })
        ));

        let frac: FragmentNode = leaf("n", "42.5").into();
        assert!(matches!(
            frac.get_this_int(0),
            Err(FragmentError::ValueConversion { .. })
        ));
        assert_eq!(frac.get_this_float(0.0).unwrap(), 42.5);
    }

    // --- Child values ---

    #[test]
    fn test_child_strings() {
        let node = customer();
        assert_eq!(node.get_string_not_null("name").unwrap(), "Ada");
        assert_eq!(node.get_string("missing", "none").unwrap(), "none");
        assert_eq!(node.get_string_object("missing").unwrap(), None);
        // A present but empty child is an empty string, not a missing value.
        assert_eq!(node.get_string_object("nickname").unwrap(), Some(String::new()));
        assert_eq!(node.get_string("nickname", "none").unwrap(), "");
        assert!(matches!(
            node.get_string_not_null("missing"),
            Err(FragmentError::ValueMissing { .. })
        ));
    }

    #[test]
    fn test_child_ints() {
        let node = customer();
        assert_eq!(node.get_int_not_null("accountCount").unwrap(), 3);
        assert_eq!(node.get_int_object("accountCount").unwrap(), Some(3));
        assert_eq!(node.get_int("missing", -1).unwrap(), -1);
        assert_eq!(node.get_int_object("nickname").unwrap(), None);
        assert!(matches!(
            node.get_int_not_null("nickname"),
            Err(FragmentError::ValueMissing { .. })
        ));
        assert!(matches!(
            node.get_int("code", 0),
            Err(FragmentError::ValueConversion { .. })
        ));
        assert!(matches!(
            node.get_int("totalBalance", 0),
            Err(FragmentError::ValueConversion { .. })
        ));
    }

    #[test]
    fn test_child_floats() {
        let node = customer();
        assert_eq!(node.get_float_not_null("totalBalance").unwrap(), 12.5);
        assert_eq!(node.get_float_object("accountCount").unwrap(), Some(3.0));
        assert_eq!(node.get_float("missing", 0.5).unwrap(), 0.5);
        assert!(matches!(
            node.get_float_object("code"),
            Err(FragmentError::ValueConversion { .. })
        ));
    }

    #[test]
    fn test_default_does_not_hide_ambiguity() {
        let node: FragmentNode = Element::new("order")
            .with_child(leaf("qty", "1"))
            .with_child(leaf("qty", "2"))
            .into();
        assert!(matches!(
            node.get_int("qty", 0),
            Err(FragmentError::MultipleChildren { .. })
        ));
        assert!(matches!(
            node.get_float_object("qty"),
            Err(FragmentError::MultipleChildren { .. })
        ));
        assert!(matches!(
            node.get_string("qty", ""),
            Err(FragmentError::MultipleChildren { .. })
        ));
    }

    #[test]
    fn test_default_does_not_hide_mixed_content() {
        let node: FragmentNode = Element::new("order")
            .with_child(Element::new("qty").with_child(Element::new("inner")))
            .into();
        assert!(matches!(
            node.get_int("qty", 0),
            Err(FragmentError::InternalConsistency(_))
        ));
    }

    // --- Attributes ---

    #[test]
    fn test_attr_strings() {
        let node = customer();
        assert_eq!(node.get_attr_string_not_null("id").unwrap(), "7");
        assert_eq!(node.get_attr_string_object("missing").unwrap(), None);
        assert_eq!(node.get_attr_string("missing", "x").unwrap(), "x");
        assert_eq!(node.get_attr_string("note", "x").unwrap(), "");
        assert!(matches!(
            node.get_attr_string_not_null("missing"),
            Err(FragmentError::ValueMissing { .. })
        ));
    }

    #[test]
    fn test_attr_numbers() {
        let node = customer();
        assert_eq!(node.get_attr_int_not_null("id").unwrap(), 7);
        assert_eq!(node.get_attr_int_object("missing").unwrap(), None);
        assert_eq!(node.get_attr_int("note", 9).unwrap(), 9);
        assert_eq!(node.get_attr_float_not_null("rating").unwrap(), 4.5);
        assert_eq!(node.get_attr_float_object("id").unwrap(), Some(7.0));
        assert_eq!(node.get_attr_float("missing", 2.0).unwrap(), 2.0);
        assert!(matches!(
            node.get_attr_int_object("rating"),
            Err(FragmentError::ValueConversion { .. })
        ));
        assert!(matches!(
            node.get_attr_float_not_null("missing"),
            Err(FragmentError::ValueMissing { .. })
        ));
    }

    #[test]
    fn test_attr_on_text_node_is_internal_error() {
        let text = FragmentNode::text("x");
        assert!(matches!(
            text.get_attr_int("id", 0),
            Err(FragmentError::InternalConsistency(_))
        ));
    }
}
