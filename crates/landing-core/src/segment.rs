use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a pickable region of the model.
///
/// The id is the glTF node name of the segment mesh; the set of valid ids is
/// whatever the region table declares.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// DOM id of the floating label for this segment (`text-<id>`).
    pub fn label_element_id(&self) -> String {
        format!("text-{}", self.0)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SegmentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
