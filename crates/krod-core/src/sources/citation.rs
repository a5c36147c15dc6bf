//! Citation markers and the citation linker
//!
//! A `[n]` marker refers to `sources[n - 1]`. Activating a marker asks the
//! host to bring the matching source card into view through a registry the
//! host supplies, rather than by searching whatever is on screen.

use super::Source;

/// A resolved `[n]` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CitationMarker {
    /// The `n` shown to the reader (1-based)
    pub display_number: usize,
    /// Index into the source list (0-based)
    pub source_index: usize,
}

impl CitationMarker {
    /// Resolve `[display_number]` against a list of `source_count` sources
    ///
    /// Valid iff `1 <= display_number <= source_count`.
    pub fn resolve(display_number: usize, source_count: usize) -> Option<Self> {
        if (1..=source_count).contains(&display_number) {
            Some(Self {
                display_number,
                source_index: display_number - 1,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Where the card should land relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlignment {
    /// Scroll the minimum distance needed to show the card
    #[default]
    Nearest,
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollRequest {
    pub behavior: ScrollBehavior,
    pub alignment: ScrollAlignment,
}

/// Host-side lookup from source id to a rendered card
pub trait CardRegistry {
    /// Bring the card for `source_id` into view
    ///
    /// Returns false when no such card is currently rendered.
    fn scroll_card_into_view(&mut self, source_id: &str, request: ScrollRequest) -> bool;
}

/// Maps activated citations to card scroll requests
#[derive(Debug, Clone, Copy)]
pub struct CitationLinker<'a> {
    sources: &'a [Source],
}

impl<'a> CitationLinker<'a> {
    pub fn new(sources: &'a [Source]) -> Self {
        Self { sources }
    }

    /// Activate the citation pointing at `source_index`
    ///
    /// Missing sources and cards that are not rendered are ignored.
    pub fn activate<R>(&self, source_index: usize, registry: &mut R)
    where
        R: CardRegistry + ?Sized,
    {
        let Some(source) = self.sources.get(source_index) else {
            tracing::debug!(source_index, "Citation points past the source list");
            return;
        };

        if !registry.scroll_card_into_view(&source.id, ScrollRequest::default()) {
            tracing::debug!(source_id = %source.id, "Citation target card not rendered");
        }
    }
}
