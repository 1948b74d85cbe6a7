//! TOML serializer fixtures.
//!
//! A fixture file holds a `format` header and a list of cases. Each case
//! describes the trees a source would hold and either the exact expected HTML
//! or the expected error message:
//!
//! ```toml
//! format = "frameprint-serialize-v1"
//!
//! [[cases]]
//! name = "void element"
//! root = 1
//! expected = "<br />"
//!
//! [[cases.components]]
//! id = 1
//! frames = [{ kind = "element", name = "br", len = 1 }]
//! ```

use render_tree::{AttributeValue, ComponentId, EventHandlerId, FrameStore, RenderFrame, RenderTree};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const SERIALIZE_FIXTURE_FORMAT_V1: &str = "frameprint-serialize-v1";

#[derive(Debug)]
pub struct SerializeCase {
    pub name: String,
    pub root: ComponentId,
    pub store: FrameStore,
    pub expected: CaseExpectation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaseExpectation {
    Html(String),
    /// Display form of the expected serializer error.
    Error(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
    format: String,
    cases: Vec<FixtureCase>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureCase {
    name: String,
    root: u32,
    expected: Option<String>,
    error: Option<String>,
    components: Vec<FixtureComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureComponent {
    id: u32,
    frames: Vec<FixtureFrame>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum FixtureFrame {
    Element {
        name: String,
        len: usize,
    },
    Attribute {
        name: String,
        value: Option<FixtureValue>,
        handler: Option<u64>,
    },
    Text {
        text: String,
    },
    Markup {
        html: String,
    },
    Component {
        id: u32,
        len: usize,
    },
    Region {
        len: usize,
    },
    ReferenceCapture,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureValue {
    Bool(bool),
    Text(String),
}

pub fn load_serialize_cases(path: &Path) -> Vec<SerializeCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read serializer fixture {path:?}: {err}"));
    parse_serialize_cases(&content, &path.display().to_string())
}

/// Parses fixture TOML; `origin` only labels panic messages.
pub fn parse_serialize_cases(content: &str, origin: &str) -> Vec<SerializeCase> {
    let file: FixtureFile = toml::from_str(content)
        .unwrap_or_else(|err| panic!("failed to parse serializer fixture {origin}: {err}"));
    assert_eq!(
        file.format, SERIALIZE_FIXTURE_FORMAT_V1,
        "unsupported format in {origin}"
    );

    let mut names = BTreeSet::new();
    file.cases
        .into_iter()
        .map(|case| {
            assert!(
                names.insert(case.name.clone()),
                "duplicate case '{}' in {origin}",
                case.name
            );
            convert_case(case, origin)
        })
        .collect()
}

fn convert_case(case: FixtureCase, origin: &str) -> SerializeCase {
    let expected = match (case.expected, case.error) {
        (Some(html), None) => CaseExpectation::Html(html),
        (None, Some(message)) => CaseExpectation::Error(message),
        _ => panic!(
            "case '{}' in {origin} must set exactly one of `expected` or `error`",
            case.name
        ),
    };

    let mut store = FrameStore::new();
    for component in case.components {
        let id = ComponentId(component.id);
        let tree: RenderTree = component.frames.into_iter().map(convert_frame).collect();
        assert!(
            store.replace(id, tree).is_none(),
            "case '{}' in {origin} defines component {} twice",
            case.name,
            component.id
        );
    }

    SerializeCase {
        name: case.name,
        root: ComponentId(case.root),
        store,
        expected,
    }
}

fn convert_frame(frame: FixtureFrame) -> RenderFrame {
    match frame {
        FixtureFrame::Element { name, len } => RenderFrame::element(&name, len),
        FixtureFrame::Attribute {
            name,
            value,
            handler,
        } => {
            let value = match (handler, value) {
                (Some(id), _) => AttributeValue::EventHandler(EventHandlerId(id)),
                (None, Some(FixtureValue::Bool(flag))) => AttributeValue::Bool(flag),
                (None, Some(FixtureValue::Text(text))) => AttributeValue::Text(text),
                (None, None) => AttributeValue::Opaque,
            };
            RenderFrame::attribute(&name, value)
        }
        FixtureFrame::Text { text } => RenderFrame::Text(text),
        FixtureFrame::Markup { html } => RenderFrame::Markup(html),
        FixtureFrame::Component { id, len } => RenderFrame::component(ComponentId(id), len),
        FixtureFrame::Region { len } => RenderFrame::region(len),
        FixtureFrame::ReferenceCapture => RenderFrame::ReferenceCapture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_tree::TreeSource;

    const SAMPLE: &str = r#"
format = "frameprint-serialize-v1"

[[cases]]
name = "attrs"
root = 1
expected = "<input disabled />"

[[cases.components]]
id = 1
frames = [
  { kind = "element", name = "input", len = 5 },
  { kind = "attribute", name = "disabled", value = true },
  { kind = "attribute", name = "onclick", handler = 9 },
  { kind = "attribute", name = "model" },
  { kind = "attribute", name = "id", value = "a" },
]

[[cases]]
name = "missing child"
root = 1
error = "no render tree for component #2"

[[cases.components]]
id = 1
frames = [{ kind = "component", id = 2, len = 1 }, { kind = "reference_capture" }]
"#;

    #[test]
    fn sample_fixture_converts_every_frame_kind() {
        let cases = parse_serialize_cases(SAMPLE, "sample");
        assert_eq!(cases.len(), 2);

        let attrs = &cases[0];
        assert_eq!(attrs.expected, CaseExpectation::Html("<input disabled />".into()));
        let frames = attrs.store.frames(ComponentId(1)).expect("root tree").frames();
        assert_eq!(
            frames,
            &[
                RenderFrame::element("input", 5),
                RenderFrame::attribute("disabled", true),
                RenderFrame::attribute("onclick", EventHandlerId(9)),
                RenderFrame::attribute("model", AttributeValue::Opaque),
                RenderFrame::attribute("id", "a"),
            ][..]
        );

        let missing = &cases[1];
        assert_eq!(
            missing.expected,
            CaseExpectation::Error("no render tree for component #2".into())
        );
        assert_eq!(missing.root, ComponentId(1));
        assert_eq!(missing.store.len(), 1);
    }

    #[test]
    #[should_panic(expected = "exactly one of")]
    fn case_needs_one_expectation() {
        parse_serialize_cases(
            r#"
format = "frameprint-serialize-v1"

[[cases]]
name = "both"
root = 1
expected = ""
error = "x"
components = []
"#,
            "inline",
        );
    }
}
