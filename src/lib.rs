//! # xmlfrag
//!
//! Selective materialization of XML fragments from a streaming parse.
//! Elements outside the subtrees you ask for are never built into a tree;
//! each subtree you do ask for is delivered as a small [`FragmentNode`] with
//! typed, presence-aware accessors and then dropped.
//!
//! ## Quick Start
//!
//! ```
//! use xmlfrag::{ElementContext, FragmentHandler, FragmentNode, Result, StreamDispatcher};
//!
//! struct Items(Vec<(i64, f64)>);
//!
//! impl FragmentHandler for Items {
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
//!             let id = item.get_attr_int_not_null("id")?;
//!             self.0.push((id, item.get_float_not_null("amount")?));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut dispatcher = StreamDispatcher::new(Items(Vec::new()));
//! xmlfrag::feed::feed_str(
//!     r#"<root><item id="7"><amount>12.5</amount></item></root>"#,
//!     &mut dispatcher,
//! )?;
//! assert_eq!(dispatcher.handler().0, vec![(7, 12.5)]);
//! # Ok::<(), xmlfrag::FragmentError>(())
//! ```
//!
//! Without the default `quick-xml` feature the dispatcher is driven directly
//! through [`StreamDispatcher::start_element`] and friends.

pub mod error;
#[cfg(feature = "quick-xml")]
pub mod feed;
pub mod fragment;
pub mod path;
pub mod stream;
pub mod util;

// Re-export primary types at the crate root for convenience.
pub use error::{FragmentError, Result};
pub use fragment::{CaptureLimits, Element, FragmentBuilder, FragmentNode};
pub use path::ElementPath;
pub use stream::{DispatchState, ElementContext, FragmentHandler, StreamDispatcher};
