//! Scroll state for the message view
//!
//! Also the terminal's card registry: citations scroll cards into view
//! through it.

use krod_core::{CardRegistry, ScrollAlignment, ScrollBehavior, ScrollRequest};

use crate::tui::message::CardAnchor;

#[derive(Debug, Clone, Default)]
pub struct Viewport {
    offset: usize,
    /// Destination of an in-flight smooth scroll
    target: Option<usize>,
    height: usize,
    total_lines: usize,
    cards: Vec<CardAnchor>,
    /// Card most recently scrolled to, drawn highlighted
    focused_card: Option<String>,
}

impl Viewport {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn focused_card(&self) -> Option<&str> {
        self.focused_card.as_deref()
    }

    /// Update geometry after a redraw
    pub fn set_layout(&mut self, height: usize, total_lines: usize, cards: Vec<CardAnchor>) {
        self.height = height;
        self.total_lines = total_lines;
        self.cards = cards;
        self.offset = self.offset.min(self.max_offset());
        if let Some(target) = self.target {
            self.target = Some(target.min(self.max_offset()));
        }
        if let Some(id) = &self.focused_card {
            if !self.cards.iter().any(|c| &c.source_id == id) {
                self.focused_card = None;
            }
        }
    }

    fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height)
    }

    fn jump_to(&mut self, offset: usize) {
        self.target = None;
        self.offset = offset.min(self.max_offset());
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.jump_to(self.offset.saturating_sub(lines));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.jump_to(self.offset + lines);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height.saturating_sub(2).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height.saturating_sub(2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.jump_to(0);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.jump_to(self.max_offset());
    }

    /// Smallest scroll that shows `top..top + height`, clamped to the content
    ///
    /// Content taller than the view is aligned to its top.
    pub fn reveal(&mut self, top: usize, height: usize) {
        let offset = self.nearest_offset(top, height);
        self.jump_to(offset);
    }

    fn nearest_offset(&self, top: usize, height: usize) -> usize {
        if top < self.offset || height > self.height {
            top
        } else if top + height > self.offset + self.height {
            top + height - self.height
        } else {
            self.offset
        }
    }

    fn aligned_offset(&self, top: usize, height: usize, alignment: ScrollAlignment) -> usize {
        let offset = match alignment {
            ScrollAlignment::Nearest => self.nearest_offset(top, height),
            ScrollAlignment::Start => top,
            ScrollAlignment::Center => (top + height / 2).saturating_sub(self.height / 2),
            ScrollAlignment::End => (top + height).saturating_sub(self.height),
        };
        offset.min(self.max_offset())
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// Advance a smooth scroll by one frame
    ///
    /// Returns true while still moving.
    pub fn tick(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        // Faster when far from target
        let remaining = target.abs_diff(self.offset);
        let step = (remaining / 5).clamp(2, 8);

        if self.offset < target {
            self.offset = (self.offset + step).min(target);
        } else {
            self.offset = self.offset.saturating_sub(step).max(target);
        }

        if self.offset == target {
            self.target = None;
        }
        self.target.is_some()
    }
}

impl CardRegistry for Viewport {
    fn scroll_card_into_view(&mut self, source_id: &str, request: ScrollRequest) -> bool {
        let Some(card) = self.cards.iter().find(|c| c.source_id == source_id) else {
            return false;
        };
        let destination = self.aligned_offset(card.top, card.height, request.alignment);
        self.focused_card = Some(source_id.to_string());

        match request.behavior {
            ScrollBehavior::Instant => self.jump_to(destination),
            ScrollBehavior::Smooth if destination != self.offset => {
                self.target = Some(destination);
            }
            ScrollBehavior::Smooth => self.target = None,
        }
        tracing::debug!(source_id, destination, "Scrolling source card into view");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut viewport = Viewport::default();
        viewport.set_layout(
            10,
            100,
            vec![
                CardAnchor {
                    source_id: "near".to_string(),
                    top: 4,
                    height: 4,
                },
                CardAnchor {
                    source_id: "far".to_string(),
                    top: 60,
                    height: 4,
                },
            ],
        );
        viewport
    }

    fn run_to_rest(viewport: &mut Viewport) -> usize {
        let mut frames = 0;
        while viewport.tick() {
            frames += 1;
            assert!(frames < 100, "smooth scroll never settled");
        }
        frames
    }

    #[test]
    fn test_scrolling_clamps_to_content() {
        let mut viewport = viewport();
        viewport.scroll_up(5);
        assert_eq!(viewport.offset(), 0);
        viewport.scroll_down(500);
        assert_eq!(viewport.offset(), 90);
        viewport.page_up();
        assert_eq!(viewport.offset(), 82);
        viewport.scroll_to_top();
        assert_eq!(viewport.offset(), 0);
        viewport.scroll_to_bottom();
        assert_eq!(viewport.offset(), 90);
    }

    #[test]
    fn test_visible_card_does_not_move() {
        let mut viewport = viewport();
        assert!(viewport.scroll_card_into_view("near", ScrollRequest::default()));
        assert!(!viewport.is_animating());
        assert_eq!(viewport.offset(), 0);
        assert_eq!(viewport.focused_card(), Some("near"));
    }

    #[test]
    fn test_smooth_scroll_reaches_nearest_position() {
        let mut viewport = viewport();
        assert!(viewport.scroll_card_into_view("far", ScrollRequest::default()));
        assert!(viewport.is_animating());
        assert_eq!(viewport.offset(), 0);

        let frames = run_to_rest(&mut viewport);
        assert!(frames > 1);
        // Card bottom lands on the last visible line
        assert_eq!(viewport.offset(), 54);
    }

    #[test]
    fn test_instant_start_alignment() {
        let mut viewport = viewport();
        let request = ScrollRequest {
            behavior: ScrollBehavior::Instant,
            alignment: ScrollAlignment::Start,
        };
        assert!(viewport.scroll_card_into_view("far", request));
        assert!(!viewport.is_animating());
        assert_eq!(viewport.offset(), 60);
    }

    #[test]
    fn test_center_alignment() {
        let mut viewport = viewport();
        let request = ScrollRequest {
            behavior: ScrollBehavior::Instant,
            alignment: ScrollAlignment::Center,
        };
        viewport.scroll_card_into_view("far", request);
        assert_eq!(viewport.offset(), 57);
    }

    #[test]
    fn test_unknown_card_is_not_rendered() {
        let mut viewport = viewport();
        assert!(!viewport.scroll_card_into_view("missing", ScrollRequest::default()));
        assert_eq!(viewport.focused_card(), None);
    }

    #[test]
    fn test_manual_scroll_cancels_animation() {
        let mut viewport = viewport();
        viewport.scroll_card_into_view("far", ScrollRequest::default());
        viewport.scroll_down(1);
        assert!(!viewport.is_animating());
        assert_eq!(viewport.offset(), 1);
    }

    #[test]
    fn test_reveal_brings_block_into_view() {
        let mut viewport = viewport();
        viewport.reveal(30, 3);
        assert_eq!(viewport.offset(), 23);
        viewport.reveal(25, 2);
        assert_eq!(viewport.offset(), 23);
        viewport.reveal(5, 2);
        assert_eq!(viewport.offset(), 5);
    }
}
