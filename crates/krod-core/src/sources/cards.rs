//! Source card selection
//!
//! A message shows its first few sources as cards and can be expanded to
//! show all of them.

use super::Source;

/// Cards shown while collapsed
pub const COLLAPSED_SOURCE_LIMIT: usize = 3;

/// First three sources, or all of them when expanded
pub fn visible_sources(sources: &[Source], expanded: bool) -> &[Source] {
    SourceCards {
        expanded,
        limit: COLLAPSED_SOURCE_LIMIT,
    }
    .visible(sources)
}

/// Transient expand/collapse state for one message's cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCards {
    expanded: bool,
    limit: usize,
}

impl Default for SourceCards {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceCards {
    pub fn new() -> Self {
        Self::with_limit(COLLAPSED_SOURCE_LIMIT)
    }

    /// Collapsed state showing `limit` cards
    pub fn with_limit(limit: usize) -> Self {
        Self {
            expanded: false,
            limit,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn visible<'a>(&self, sources: &'a [Source]) -> &'a [Source] {
        if self.expanded {
            sources
        } else {
            &sources[..sources.len().min(self.limit)]
        }
    }

    /// Whether a show all / show less control is offered at all
    pub fn has_hidden(&self, sources: &[Source]) -> bool {
        sources.len() > self.limit
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.expanded {
            "Show less"
        } else {
            "Show all"
        }
    }

    pub fn header(sources: &[Source]) -> String {
        format!("Sources ({})", sources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(n: usize) -> Vec<Source> {
        (0..n)
            .map(|i| Source {
                id: format!("s{}", i),
                title: format!("T{}", i),
                url: format!("https://example.com/{}", i),
                domain: None,
                snippet: None,
                favicon: None,
            })
            .collect()
    }

    #[test]
    fn test_collapsed_shows_first_three() {
        let all = sources(5);
        let visible = visible_sources(&all, false);
        assert_eq!(visible.len(), 3);
        assert_eq!(visible[0].id, "s0");
        assert_eq!(visible[2].id, "s2");
        assert_eq!(visible_sources(&all, true).len(), 5);
    }

    #[test]
    fn test_toggle_round_trip() {
        let all = sources(5);
        let mut cards = SourceCards::new();
        assert_eq!(cards.visible(&all).len(), 3);
        cards.toggle();
        assert_eq!(cards.visible(&all).len(), 5);
        assert_eq!(cards.toggle_label(), "Show less");
        cards.toggle();
        assert_eq!(cards.visible(&all).len(), 3);
        assert_eq!(cards.toggle_label(), "Show all");
    }

    #[test]
    fn test_short_lists() {
        let cards = SourceCards::new();
        assert!(cards.visible(&[]).is_empty());
        assert_eq!(cards.visible(&sources(2)).len(), 2);
        assert!(!cards.has_hidden(&sources(3)));
        assert!(cards.has_hidden(&sources(4)));
    }

    #[test]
    fn test_custom_limit() {
        let cards = SourceCards::with_limit(1);
        assert_eq!(cards.visible(&sources(4)).len(), 1);
        assert_eq!(SourceCards::header(&sources(4)), "Sources (4)");
    }
}
