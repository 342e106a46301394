/// High‑level semantic role of a view, similar to ARIA roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Text,
    Button,
    Divider,
}

/// Semantics attached to a `View`, used to build the flattened node list a
/// headless driver queries.
#[derive(Clone, Debug)]
pub struct Semantics {
    pub role: Role,
    /// Human‑readable label. For buttons, this is the “name” that is announced.
    pub label: Option<String>,
    /// Disabled nodes remain in the tree but are marked not enabled.
    pub enabled: bool,
}

impl Semantics {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            label: None,
            enabled: true,
        }
    }
}
