use super::animator::ScrollAnimator;
use super::cards::{CardSet, CardStyle, ImageRequest};
use super::layout::{self, Camera, Viewport, WheelParams};
use crate::menu::MenuItem;
use gdk_pixbuf::Pixbuf;

/// Everything one mounted wheel owns: the scroll animator, the camera rig and
/// the card set. Frame updates go animator, then layout, then draw.
pub struct WheelScene {
    animator: ScrollAnimator,
    params: WheelParams,
    viewport: Viewport,
    left: f64,
    cards: CardSet,
    style: CardStyle,
}

impl WheelScene {
    pub fn new(params: WheelParams, style: CardStyle, viewport: Viewport) -> Self {
        Self {
            animator: ScrollAnimator::new(params.smoothing),
            left: layout::left_edge(viewport, &params),
            params,
            viewport,
            cards: CardSet::default(),
            style,
        }
    }

    pub fn params(&self) -> &WheelParams {
        &self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> Camera {
        Camera::new(&self.params, self.viewport)
    }

    pub fn cards(&self) -> &CardSet {
        &self.cards
    }

    pub fn offset(&self) -> f64 {
        self.animator.offset()
    }

    pub fn is_mounted(&self) -> bool {
        !self.cards.cards().is_empty()
    }

    /// Swaps in a new item list. The scroll jumps to `selected` so the new
    /// list appears settled.
    pub fn rebuild(&mut self, items: &[MenuItem], selected: usize) -> Vec<ImageRequest> {
        self.animator.reset(selected.min(items.len().saturating_sub(1)));
        self.cards.rebuild(
            items,
            &self.style,
            self.animator.offset(),
            self.left,
            &self.params,
        )
    }

    /// One frame: step the scroll toward `selected`, then place every card.
    /// Returns whether anything is still moving.
    pub fn advance(&mut self, selected: usize) -> bool {
        let count = self.cards.cards().len();
        let moving = self.animator.update(selected, count);
        self.relayout();
        moving
    }

    fn relayout(&mut self) {
        let offset = self.animator.offset();
        let count = self.cards.cards().len();
        for card in self.cards.cards_mut() {
            card.transform = layout::layout(card.index, count, offset, self.left, &self.params);
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.left = layout::left_edge(viewport, &self.params);
        self.relayout();
    }

    /// Applies new parameters in place. Cards keep their textures; the caller
    /// rebuilds only when the style changed.
    pub fn set_params(&mut self, params: WheelParams) {
        self.animator.set_smoothing(params.smoothing);
        self.left = layout::left_edge(self.viewport, &params);
        self.params = params;
        self.relayout();
    }

    pub fn set_style(&mut self, style: CardStyle) -> bool {
        let changed = self.style != style;
        self.style = style;
        changed
    }

    pub fn attach_image(&mut self, generation: u64, index: usize, result: Result<Pixbuf, String>) -> bool {
        self.cards.attach_image(generation, index, result)
    }

    /// Drops every card and texture. The scene can be rebuilt afterwards.
    pub fn unmount(&mut self) {
        self.cards.dispose();
        self.animator.reset(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<MenuItem> {
        (0..n)
            .map(|i| MenuItem::submenu(&format!("s{i}"), &format!("System {i}"), Vec::new()))
            .collect()
    }

    #[test]
    fn test_rebuild_settles_on_selection() {
        let mut scene = WheelScene::new(WheelParams::default(), CardStyle::default(), Viewport::default());
        scene.rebuild(&items(17), 5);
        assert_eq!(scene.offset(), 5.0);
        assert!(scene.cards().cards()[5].transform.selected);
        assert!(!scene.advance(5));
    }

    #[test]
    fn test_advance_moves_toward_selection() {
        let mut scene = WheelScene::new(WheelParams::default(), CardStyle::default(), Viewport::default());
        scene.rebuild(&items(17), 16);
        assert!(scene.advance(0));
        assert!(scene.offset() > 16.0);

        let mut frames = 0;
        while scene.advance(0) {
            frames += 1;
            assert!(frames < 500);
        }
        assert_eq!(scene.offset(), 0.0);
        assert!(scene.cards().cards()[0].transform.selected);
    }

    #[test]
    fn test_resize_moves_column() {
        let mut scene = WheelScene::new(WheelParams::default(), CardStyle::default(), Viewport::default());
        scene.rebuild(&items(3), 0);
        let before = scene.cards().cards()[0].transform.position.x;
        scene.resize(1920.0, 720.0);
        let after = scene.cards().cards()[0].transform.position.x;
        assert!(after < before);
    }

    #[test]
    fn test_unmount_releases_cards() {
        let mut scene = WheelScene::new(WheelParams::default(), CardStyle::default(), Viewport::default());
        scene.rebuild(&items(4), 2);
        assert!(scene.is_mounted());
        scene.unmount();
        assert!(!scene.is_mounted());
        assert!(scene.cards().pool().is_empty());
        assert!(!scene.advance(0));
    }
}
