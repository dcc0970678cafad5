//! # Pages
//!
//! The fixed set of pages shown in the left-hand list, and the contract for
//! producing their content.
//!
//! ## Cache policy
//!
//! Each page declares a [`CachePolicy`]:
//!
//! - [`CachePolicy::CacheOnce`] pages do not depend on the viewport size. They
//!   are produced once when a session starts and the stored text is reused for
//!   the rest of that session.
//! - [`CachePolicy::Recompute`] pages center themselves in the viewport, so
//!   they are produced again every time they are displayed.
//!
//! The page table is immutable and shared by every session. The mutable part,
//! the [`ContentCache`], belongs to a single session.

pub mod cache;
pub mod content;
pub mod place;

pub use cache::ContentCache;
pub use content::PortfolioContent;

use crate::error::Result;
use ratatui::layout::Size;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// One of the five fixed pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    About,
    Projects,
    Contact,
    Resume,
}

/// Whether a page's content is memoized per session or produced per view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    CacheOnce,
    Recompute,
}

/// Immutable definition of a page.
#[derive(Debug)]
pub struct PageDef {
    pub page: Page,
    pub title: &'static str,
    pub policy: CachePolicy,
}

/// Page table in list order. Index 0 is the landing page.
pub static PAGES: [PageDef; 5] = [
    PageDef {
        page: Page::Home,
        title: "Home",
        policy: CachePolicy::Recompute,
    },
    PageDef {
        page: Page::About,
        title: "About",
        policy: CachePolicy::Recompute,
    },
    PageDef {
        page: Page::Projects,
        title: "Projects",
        policy: CachePolicy::CacheOnce,
    },
    PageDef {
        page: Page::Contact,
        title: "Contact",
        policy: CachePolicy::Recompute,
    },
    PageDef {
        page: Page::Resume,
        title: "Resume",
        policy: CachePolicy::CacheOnce,
    },
];

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::About,
        Page::Projects,
        Page::Contact,
        Page::Resume,
    ];

    /// The page shown before anything is selected.
    pub const LANDING: Page = Page::Home;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Page> {
        Self::ALL.get(index).copied()
    }

    pub fn def(self) -> &'static PageDef {
        &PAGES[self.index()]
    }

    pub fn title(self) -> &'static str {
        self.def().title
    }

    pub fn policy(self) -> CachePolicy {
        self.def().policy
    }
}

/// Produces page bodies.
///
/// Implementations are shared by every session and must not hold mutable
/// state that one session could use to influence another.
pub trait ContentProvider: Send + Sync {
    /// Produce the body of `page` for a viewport of the given content size.
    fn produce(&self, page: Page, viewport: Size) -> Result<Text<'static>>;
}

/// Text shown in place of a page whose content could not be produced.
pub fn placeholder(page: Page) -> Text<'static> {
    Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            format!("{} is unavailable right now.", page.title()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Try again in a moment."),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_table_matches_enum_order() {
        for (i, def) in PAGES.iter().enumerate() {
            assert_eq!(def.page.index(), i);
            assert_eq!(Page::from_index(i), Some(def.page));
        }
    }

    #[test]
    fn test_from_index_out_of_range() {
        assert_eq!(Page::from_index(5), None);
        assert_eq!(Page::from_index(usize::MAX), None);
    }

    #[test]
    fn test_landing_page_is_first() {
        assert_eq!(Page::LANDING.index(), 0);
        assert_eq!(Page::LANDING.title(), "Home");
    }

    #[test]
    fn test_width_dependent_pages_recompute() {
        assert_eq!(Page::Home.policy(), CachePolicy::Recompute);
        assert_eq!(Page::About.policy(), CachePolicy::Recompute);
        assert_eq!(Page::Contact.policy(), CachePolicy::Recompute);
        assert_eq!(Page::Projects.policy(), CachePolicy::CacheOnce);
        assert_eq!(Page::Resume.policy(), CachePolicy::CacheOnce);
    }

    #[test]
    fn test_placeholder_mentions_page() {
        let text = placeholder(Page::Contact);
        let joined: String = text
            .lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(joined.contains("Contact is unavailable"));
    }
}
