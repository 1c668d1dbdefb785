//! The five dashboard pages and label-based routing.

use std::fmt;

use datafun_common::{DatafunError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Overview,
    Analysis,
    Game,
    Tools,
    Contact,
}

impl Page {
    /// Sidebar order.
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::Analysis,
        Page::Game,
        Page::Tools,
        Page::Contact,
    ];

    /// Human-readable label shown in the sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            Page::Overview => "Data Overview",
            Page::Analysis => "Sales Analysis",
            Page::Game     => "Mini Game",
            Page::Tools    => "Utilities",
            Page::Contact  => "Contact Us",
        }
    }

    /// URL path segment.
    pub fn slug(&self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Analysis => "analysis",
            Page::Game     => "game",
            Page::Tools    => "tools",
            Page::Contact  => "contact",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.slug())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolve a sidebar label or URL slug to its page.
pub fn route(selected: &str) -> Result<Page> {
    Page::ALL
        .iter()
        .copied()
        .find(|p| p.label() == selected || p.slug() == selected)
        .ok_or_else(|| DatafunError::UnknownPage(selected.to_string()))
}
