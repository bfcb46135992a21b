//! Named groups of tools that compete on a leaderboard.

use serde::{Deserialize, Serialize};

use crate::table::ToolName;

/// A named, ordered set of tools. Order is insertion order; a tool may belong
/// to several categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub tools: Vec<ToolName>,
}

impl Category {
    /// Build a category, dropping repeated tool names but keeping first-seen order.
    pub fn new<I, S>(name: impl Into<String>, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ToolName>,
    {
        let mut unique: Vec<ToolName> = Vec::new();
        for tool in tools {
            let tool = tool.into();
            if !unique.contains(&tool) {
                unique.push(tool);
            }
        }
        Self { name: name.into(), tools: unique }
    }

    pub fn contains(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }

    /// File-name friendly form of the category name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Whitespace and path separators become underscores.
pub fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dedups_in_order() {
        let c = Category::new("Dev", ["Cursor", "Claude", "Cursor"]);
        assert_eq!(c.tools, vec!["Cursor".to_string(), "Claude".to_string()]);
        assert!(c.contains("Claude"));
        assert!(!c.contains("claude"));
    }

    #[test]
    fn test_slug() {
        let c = Category::new("4. Development / Coding", Vec::<String>::new());
        assert_eq!(c.slug(), "4._Development___Coding");
    }
}
