#![no_main]

use frame_html::{HtmlSerializer, SerializerConfig};
use libfuzzer_sys::fuzz_target;
use render_tree::{ComponentId, EventHandlerId, FrameStore, RenderFrame, RenderTree};

const NAMES: [&str; 6] = ["div", "select", "option", "input", "br", "p"];
const VALUES: [&str; 4] = ["", "a", "<&\"'>", "b"];
const COMPONENTS: u32 = 4;

// Each frame takes two bytes: a kind selector and an operand. Subtree lengths
// come straight from the operand, so most inputs are malformed on purpose.
// Operands of 0xf0 and above claim every remaining frame, which lets inputs
// nest past the depth limit.
fn decode(bytes: &[u8]) -> RenderTree {
    let count = bytes.len() / 2;
    bytes
        .chunks_exact(2)
        .enumerate()
        .map(|(index, pair)| {
            let (kind, operand) = (pair[0], pair[1]);
            let length = if operand >= 0xf0 {
                count - index
            } else {
                usize::from(operand % 16)
            };
            let pick = usize::from(operand);
            match kind % 9 {
                0 => RenderFrame::element(NAMES[pick % NAMES.len()], length),
                1 => RenderFrame::attribute("value", VALUES[pick % VALUES.len()]),
                2 => RenderFrame::attribute("checked", operand % 2 == 0),
                3 => RenderFrame::attribute("onclick", EventHandlerId(u64::from(operand))),
                4 => RenderFrame::text(VALUES[pick % VALUES.len()]),
                5 => RenderFrame::markup("<hr>"),
                6 => RenderFrame::component(ComponentId(u32::from(operand) % COMPONENTS + 1), length),
                7 => RenderFrame::region(length),
                _ => RenderFrame::ReferenceCapture,
            }
        })
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let mut store = FrameStore::new();
    for (index, part) in data.split(|&b| b == 0xff).take(COMPONENTS as usize).enumerate() {
        store.replace(ComponentId(index as u32 + 1), decode(part));
    }

    let config = SerializerConfig {
        max_nesting_depth: 32,
        ..SerializerConfig::default()
    };
    let serializer = HtmlSerializer::with_config(&store, config);
    let first = serializer.serialize(ComponentId(1));
    let second = serializer.serialize(ComponentId(1));
    assert_eq!(first, second, "serialization must be deterministic");
});
