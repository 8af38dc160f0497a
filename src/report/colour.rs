// Terminal emphasis for reporter text

use console::Style;

/// Applies dim styling when colour is enabled, otherwise passes text through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.enabled {
            Style::new()
                .dim()
                .force_styling(true)
                .apply_to(text)
                .to_string()
        } else {
            text.to_string()
        }
    }
}
