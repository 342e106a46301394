/// Layout hints attached to a `View`. Interpreted by the layout pass in
/// `ripple-ui`; values are in dp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Modifier {
    pub padding: Option<f32>,
    pub padding_vertical: Option<f32>,
    pub fill_max_size: bool,
    pub fill_max_width: bool,
    pub center_children: bool,
    pub gap: Option<f32>,
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn padding(mut self, v: f32) -> Self {
        self.padding = Some(v);
        self
    }

    pub fn padding_vertical(mut self, v: f32) -> Self {
        self.padding_vertical = Some(v);
        self
    }

    pub fn fill_max_size(mut self) -> Self {
        self.fill_max_size = true;
        self
    }

    pub fn fill_max_width(mut self) -> Self {
        self.fill_max_width = true;
        self
    }

    /// Centers children on the cross axis.
    pub fn center_children(mut self) -> Self {
        self.center_children = true;
        self
    }

    pub fn gap(mut self, v: f32) -> Self {
        self.gap = Some(v);
        self
    }
}
