
use crate::Hierarchy;
use serde_json::json;

/// `Adam -> [Cain -> [Enoch], Seth -> [Enosh -> [Kenan]]]` with a few branch keys and flags.
pub(crate) fn sample() -> Hierarchy {
    Hierarchy::from_value(&json!({
        "name": "Adam",
        "branchKey": "ROOT",
        "flags": ["mainline"],
        "children": [
            {
                "name": "Cain",
                "branchKey": "CAIN",
                "children": [{ "name": "Enoch", "flags": ["uncertain"] }]
            },
            {
                "name": "Seth",
                "branchKey": "SETH",
                "flags": ["mainline"],
                "children": [{
                    "name": "Enosh",
                    "flags": ["mainline"],
                    "children": [{ "name": "Kenan", "flags": ["maternal"] }]
                }]
            }
        ]
    }))
    .unwrap()
}

pub(crate) fn three_level() -> Hierarchy {
    Hierarchy::from_value(&json!({
        "name": "A",
        "children": [{ "name": "B", "children": [{ "name": "C" }] }]
    }))
    .unwrap()
}

pub(crate) fn names(h: &Hierarchy, ids: &[crate::NodeId]) -> Vec<String> {
    ids.iter().map(|id| h.node(*id).name().to_string()).collect()
}
