use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesConfig {
    pub content: String,
}

impl NotesConfig {
    /// Returns the replacement config only when the text actually changed, so
    /// callers can skip dispatching no-op updates.
    pub fn with_content(&self, content: &str) -> Option<Self> {
        if self.content == content {
            None
        } else {
            Some(Self {
                content: content.to_string(),
            })
        }
    }
}
