/// Static network indicator. Not wired to any service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPicker {
    label: String,
}

impl NetworkPicker {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
