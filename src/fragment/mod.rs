//! Captured XML fragments.
//!
//! A fragment is a small owned tree materialized from one matched subtree of
//! a streamed document. [`FragmentBuilder`] assembles it from events;
//! [`FragmentNode`] is the result, read through presence-aware typed
//! accessors.
//!
//! ```
//! use xmlfrag::fragment::{Element, FragmentNode};
//!
//! let item: FragmentNode = Element::new("item")
//!     .with_attribute("id", "7")
//!     .with_child(Element::new("amount").with_child(FragmentNode::text("12.5")))
//!     .into();
//!
//! assert_eq!(item.get_attr_int_not_null("id").unwrap(), 7);
//! assert_eq!(item.get_float_not_null("amount").unwrap(), 12.5);
//! assert_eq!(item.get_int("quantity", 1).unwrap(), 1);
//! ```

mod builder;
mod node;

pub use builder::{
    CaptureLimits, FragmentBuilder, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, DEFAULT_MAX_TEXT_LENGTH,
};
pub use node::{Attributes, Element, FragmentNode};
