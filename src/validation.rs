//! Pre-solve checks for UI feedback.

use std::fmt;

use crate::layer::Layer;
use crate::topology::Topology;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warn,
    Error,
}

/// A single finding about a mesh/layer setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationMessage {
    pub severity: Severity,
    /// Index of the layer the message is about, if any.
    pub layer: Option<usize>,
    pub text: String,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

/// Checks a mesh and layer stack without solving.
///
/// Pure: nothing is modified, so it is cheap enough to call while drawing UI.
pub fn validate(topology: &Topology, layers: &[Layer]) -> Vec<ValidationMessage> {
    let mut msgs = Vec::new();

    if !topology.has_uvs() {
        msgs.push(ValidationMessage {
            severity: Severity::Error,
            layer: None,
            text: "No UV map on mesh. Add a UV layer.".into(),
        });
    }
    if layers.is_empty() {
        msgs.push(ValidationMessage {
            severity: Severity::Warn,
            layer: None,
            text: "No layers. Add at least one layer to proceed.".into(),
        });
    }

    for (i, layer) in layers.iter().enumerate() {
        let prefix = format!("Layer {} / {}: ", i + 1, layer.name);
        let mut push = |severity, text: &str| {
            msgs.push(ValidationMessage {
                severity,
                layer: Some(i),
                text: format!("{prefix}{text}"),
            });
        };

        if !layer.enabled {
            push(Severity::Warn, "Layer disabled.");
            continue;
        }
        if layer.height.is_none() {
            push(Severity::Error, "No height map assigned.");
        }
        if layer.mask.is_none() {
            push(Severity::Warn, "No mask. Create one and fill or paint it.");
        }
    }

    msgs
}

/// Whether any message would block a solve.
pub fn has_errors(messages: &[ValidationMessage]) -> bool {
    messages.iter().any(|m| m.severity == Severity::Error)
}
