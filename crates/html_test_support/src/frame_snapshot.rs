use crate::escape_text;
use render_tree::{AttributeValue, RenderFrame, RenderTree};
use std::fmt::Write;

/// One line per frame, indented by subtree nesting. Not a stable format;
/// meant for readable test failures.
pub fn frame_lines(tree: &RenderTree) -> Vec<String> {
    let mut lines = Vec::with_capacity(tree.len());
    let mut open_ends: Vec<usize> = Vec::new();
    for (position, frame) in tree.frames().iter().enumerate() {
        while open_ends.last().is_some_and(|&end| end <= position) {
            open_ends.pop();
        }
        let mut line = "  ".repeat(open_ends.len());
        write_frame(&mut line, frame);
        lines.push(line);
        if matches!(
            frame,
            RenderFrame::Element { .. } | RenderFrame::Component { .. } | RenderFrame::Region { .. }
        ) {
            open_ends.push(position + frame.subtree_length());
        }
    }
    lines
}

fn write_frame(out: &mut String, frame: &RenderFrame) {
    match frame {
        RenderFrame::Element {
            name,
            subtree_length,
        } => {
            let _ = write!(out, "<{name}> len={subtree_length}");
        }
        RenderFrame::Attribute { name, value } => {
            let _ = write!(out, "@{name}=");
            match value {
                AttributeValue::Text(text) => {
                    let _ = write!(out, "\"{}\"", escape_text(text));
                }
                AttributeValue::Bool(flag) => {
                    let _ = write!(out, "{flag}");
                }
                AttributeValue::EventHandler(handler) => {
                    let _ = write!(out, "handler({})", handler.0);
                }
                AttributeValue::Opaque => out.push_str("opaque"),
            }
        }
        RenderFrame::Text(text) => {
            let _ = write!(out, "\"{}\"", escape_text(text));
        }
        RenderFrame::Markup(markup) => {
            let _ = write!(out, "markup \"{}\"", escape_text(markup));
        }
        RenderFrame::Component { id, subtree_length } => {
            let _ = write!(out, "component {id} len={subtree_length}");
        }
        RenderFrame::Region { subtree_length } => {
            let _ = write!(out, "region len={subtree_length}");
        }
        RenderFrame::ReferenceCapture => out.push_str("ref"),
    }
}

#[cfg(test)]
mod tests {
    use super::frame_lines;
    use render_tree::{ComponentId, EventHandlerId, RenderFrame, RenderTree};

    #[test]
    fn lines_are_indented_by_subtree() {
        let tree = RenderTree::new(vec![
            RenderFrame::element("div", 6),
            RenderFrame::attribute("onclick", EventHandlerId(3)),
            RenderFrame::region(2),
            RenderFrame::text("a\nb"),
            RenderFrame::component(ComponentId(2), 2),
            RenderFrame::attribute("Flag", true),
            RenderFrame::markup("<hr>"),
        ]);
        assert_eq!(
            frame_lines(&tree),
            vec![
                "<div> len=6",
                "  @onclick=handler(3)",
                "  region len=2",
                "    \"a\\nb\"",
                "  component #2 len=2",
                "    @Flag=true",
                "markup \"<hr>\"",
            ]
        );
    }
}
