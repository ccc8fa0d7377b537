#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlfrag::feed::{feed_str, feed_str_with_options, FeedOptions};
use xmlfrag::{ElementContext, FragmentHandler, FragmentNode, Result, StreamDispatcher};

/// Captures every second-level element and touches each accessor family.
struct AccessorSweep;

impl FragmentHandler for AccessorSweep {
    fn on_element_start(
        &mut self,
        ctx: &mut ElementContext<'_>,
        _name: &str,
        _attributes: &[(String, String)],
    ) -> Result<()> {
        if ctx.depth() == 2 {
            ctx.start_fragment_collection()?;
        }
        Ok(())
    }

    fn on_element_end(
        &mut self,
        _ctx: &mut ElementContext<'_>,
        _name: &str,
        fragment: Option<FragmentNode>,
    ) -> Result<()> {
        if let Some(node) = fragment {
            let _ = node.get_this_text();
            let _ = node.get_this_float_object();
            for child in node.elements() {
                if let Some(tag) = child.tag() {
                    let _ = node.get_int(tag, 0);
                    let _ = node.get_string_object(tag);
                }
            }
            if let Some(attrs) = node.attributes() {
                for key in attrs.keys() {
                    let _ = node.get_attr_float_object(key);
                }
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Neither feed mode should ever panic
        let mut d = StreamDispatcher::new(AccessorSweep);
        let _ = feed_str(s, &mut d);

        let opts = FeedOptions::default().local_names(true).check_end_names(false);
        let mut d = StreamDispatcher::new(AccessorSweep);
        let _ = feed_str_with_options(s, &opts, &mut d);
    }
});
