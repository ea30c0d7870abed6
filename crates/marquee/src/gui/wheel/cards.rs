use super::layout::{self, CardTransform, WheelParams};
use super::{LABEL_FONT_SIZE, LABEL_HEIGHT, LABEL_STROKE_WIDTH, LABEL_WIDTH};
use crate::gui::theme;
use crate::menu::{ItemId, MenuItem};
use derive_more::Display;
use gdk_pixbuf::Pixbuf;
use palette::Srgba;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("texture#{_0}")]
pub struct TextureId(u64);

pub enum Texture {
    Label(cairo::ImageSurface),
    Image(Pixbuf),
}

/// Owns every bitmap the wheel draws. Cards refer to textures by id only, so
/// releasing an id is the single point where a resource goes away.
#[derive(Default)]
pub struct TexturePool {
    textures: HashMap<TextureId, Texture>,
    next: u64,
}

impl TexturePool {
    pub fn insert(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.next);
        self.next += 1;
        self.textures.insert(id, texture);
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    pub fn release(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("Image load failed: {0}")]
    Image(String),
}

/// Colors baked into new cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStyle {
    pub fill: Srgba<f64>,
    pub text: Srgba<f64>,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            fill: Srgba::new(0.2, 0.24, 0.32, 1.0),
            text: Srgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub item_id: ItemId,
    pub index: usize,
    pub color: Srgba<f64>,
    pub label: Option<TextureId>,
    pub image: Option<TextureId>,
    pub image_pending: bool,
    pub transform: CardTransform,
}

/// A picture a card wants decoded off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub generation: u64,
    pub index: usize,
    pub path: PathBuf,
}

/// The live cards of the mounted wheel, one per item of the active list.
#[derive(Default)]
pub struct CardSet {
    pool: TexturePool,
    cards: Vec<Card>,
    generation: u64,
}

impl CardSet {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }

    pub fn pool(&self) -> &TexturePool {
        &self.pool
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Releases every texture and drops every card.
    pub fn dispose(&mut self) {
        for card in self.cards.drain(..) {
            for id in card.label.into_iter().chain(card.image) {
                self.pool.release(id);
            }
        }
        debug_assert!(self.pool.is_empty());
    }

    /// Replaces the set with one card per item, each placed at its layout for
    /// `offset`. Returns the images to load for the new set.
    pub fn rebuild(
        &mut self,
        items: &[MenuItem],
        style: &CardStyle,
        offset: f64,
        left: f64,
        params: &WheelParams,
    ) -> Vec<ImageRequest> {
        self.dispose();
        self.generation += 1;

        let count = items.len();
        let mut requests = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let label = match render_label(&item.label, style.text) {
                Ok(surface) => Some(self.pool.insert(Texture::Label(surface))),
                Err(e) => {
                    log::error!("Failed to render label for '{}': {}", item.id, e);
                    None
                }
            };
            if let Some(path) = &item.icon {
                requests.push(ImageRequest {
                    generation: self.generation,
                    index,
                    path: path.clone(),
                });
            }
            self.cards.push(Card {
                item_id: item.id.clone(),
                index,
                color: item
                    .color
                    .as_deref()
                    .and_then(theme::parse_hex)
                    .unwrap_or(style.fill),
                label,
                image: None,
                image_pending: item.icon.is_some(),
                transform: layout::layout(index, count, offset, left, params),
            });
        }
        log::debug!(
            "Built {} cards, generation {}, {} images queued",
            count,
            self.generation,
            requests.len()
        );
        requests
    }

    /// Hands a finished image load to its card. Results for an older set or
    /// an unknown card are dropped. A failure leaves the flat fill in place.
    pub fn attach_image(&mut self, generation: u64, index: usize, result: Result<Pixbuf, String>) -> bool {
        if generation != self.generation {
            log::debug!("Dropping image for stale generation {}", generation);
            return false;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        if !card.image_pending {
            return false;
        }
        card.image_pending = false;

        match result {
            Ok(pixbuf) => {
                card.image = Some(self.pool.insert(Texture::Image(pixbuf)));
                true
            }
            Err(message) => {
                log::warn!("{} for '{}'", CardError::Image(message), card.item_id);
                false
            }
        }
    }
}

impl Drop for CardSet {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Renders `text` centered on a transparent bitmap, shrinking the font until
/// it fits, with a dark outline so it reads over any fill.
pub fn render_label(text: &str, color: Srgba<f64>) -> Result<cairo::ImageSurface, CardError> {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, LABEL_WIDTH, LABEL_HEIGHT)?;
    {
        let cr = cairo::Context::new(&surface)?;
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);

        let max_width = LABEL_WIDTH as f64 - 2.0 * LABEL_STROKE_WIDTH;
        let mut size = LABEL_FONT_SIZE;
        cr.set_font_size(size);
        let mut extents = cr.text_extents(text)?;
        while extents.width() > max_width && size > 12.0 {
            size -= 4.0;
            cr.set_font_size(size);
            extents = cr.text_extents(text)?;
        }

        cr.move_to(
            (LABEL_WIDTH as f64 - extents.width()) / 2.0 - extents.x_bearing(),
            (LABEL_HEIGHT as f64 - extents.height()) / 2.0 - extents.y_bearing(),
        );
        cr.text_path(text);
        cr.set_source_rgba(0.0, 0.0, 0.0, 0.8);
        cr.set_line_width(LABEL_STROKE_WIDTH);
        cr.stroke_preserve()?;
        let (r, g, b, a) = color.into_components();
        cr.set_source_rgba(r, g, b, a);
        cr.fill()?;
    }
    surface.flush();
    Ok(surface)
}
