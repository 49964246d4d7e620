use sha1::{Digest, Sha1};

use crate::dom::dom_model::{Dom, NodeId};
use crate::field::field_model::FieldIdentity;

/// Hex characters of the path fingerprint kept in a synthetic id.
const SYNTHETIC_ID_LEN: usize = 10;

/// Dedup identity of a control. Elements with neither `name` nor `id` get a
/// synthetic id derived from their DOM path, stable across runs.
pub fn field_identity(dom: &dyn Dom, node: NodeId) -> FieldIdentity {
    let name = dom.non_empty_attribute(node, "name").unwrap_or_default();
    let id = dom.non_empty_attribute(node, "id").unwrap_or_default();

    if name.is_empty() && id.is_empty() {
        return FieldIdentity {
            name: String::new(),
            id: synthetic_id(dom, node),
        };
    }

    FieldIdentity {
        name: name.to_string(),
        id: id.to_string(),
    }
}

pub fn synthetic_id(dom: &dyn Dom, node: NodeId) -> String {
    let digest = text_fingerprint(&dom.dom_path(node));
    format!("field-{}", &digest[..SYNTHETIC_ID_LEN])
}

pub fn text_fingerprint(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
