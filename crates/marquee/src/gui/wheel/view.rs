use super::cards::{Card, Texture, TexturePool};
use super::layout::Projected;
use super::scene::WheelScene;
use super::{CARD_CORNER_RADIUS, SELECTED_BORDER_WIDTH};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use std::f64::consts::PI;

struct CardRenderer<'a> {
    card: &'a Card,
    pool: &'a TexturePool,
    /// Top-left corner and size on screen, in pixels.
    rect: (f64, f64, f64, f64),
    radius: f64,
}

impl<'a> CardRenderer<'a> {
    fn new(card: &'a Card, pool: &'a TexturePool, projected: &Projected, width: f64, height: f64) -> Self {
        let scale = projected.scale * card.transform.scale;
        let (w, h) = (width * scale, height * scale);
        Self {
            card,
            pool,
            rect: (projected.x - w / 2.0, projected.y - h / 2.0, w, h),
            radius: CARD_CORNER_RADIUS * scale,
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        cr.save()?;
        self.draw_fill(cr)?;
        if let Some(Texture::Image(pixbuf)) = self.card.image.and_then(|id| self.pool.get(id)) {
            self.draw_image(cr, pixbuf)?;
        }
        // the name stays on top of the artwork
        self.draw_label(cr)?;
        if self.card.transform.selected {
            self.draw_border(cr, colors)?;
        }
        cr.restore()
    }

    fn path(&self, cr: &Context) {
        let (x, y, w, h) = self.rect;
        let r = self.radius.min(w / 2.0).min(h / 2.0);
        cr.new_sub_path();
        cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
        cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
        cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
        cr.arc(x + r, y + r, r, PI, 3.0 * PI / 2.0);
        cr.close_path();
    }

    fn draw_fill(&self, cr: &Context) -> Result<(), cairo::Error> {
        let (r, g, b, a) = self.card.color.into_components();
        cr.set_source_rgba(r, g, b, a * self.card.transform.opacity);
        self.path(cr);
        cr.fill()
    }

    fn draw_image(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        let (x, y, w, h) = self.rect;
        let (pw, ph) = (pixbuf.width() as f64, pixbuf.height() as f64);
        if pw <= 0.0 || ph <= 0.0 {
            return Ok(());
        }
        // fit inside the card, keeping aspect
        let fit = (w / pw).min(h / ph);
        let (iw, ih) = (pw * fit, ph * fit);

        cr.save()?;
        self.path(cr);
        cr.clip();
        cr.translate(x + (w - iw) / 2.0, y + (h - ih) / 2.0);
        cr.scale(fit, fit);
        cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
        cr.paint_with_alpha(self.card.transform.opacity)?;
        cr.restore()
    }

    fn draw_label(&self, cr: &Context) -> Result<(), cairo::Error> {
        let Some(Texture::Label(surface)) = self.card.label.and_then(|id| self.pool.get(id)) else {
            return Ok(());
        };
        let (x, y, w, h) = self.rect;
        cr.save()?;
        cr.translate(x, y);
        cr.scale(w / surface.width() as f64, h / surface.height() as f64);
        cr.set_source_surface(surface, 0.0, 0.0)?;
        cr.paint_with_alpha(self.card.transform.opacity)?;
        cr.restore()
    }

    fn draw_border(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let (r, g, b, a) = colors.selected.into_components();
        cr.set_source_rgba(r, g, b, a);
        cr.set_line_width(SELECTED_BORDER_WIDTH);
        self.path(cr);
        cr.stroke()
    }
}

/// Paints the wheel back to front.
pub fn draw(cr: &Context, scene: &WheelScene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let camera = scene.camera();
    let params = scene.params();
    let pool = scene.cards().pool();

    let mut visible: Vec<(&Card, Projected)> = scene
        .cards()
        .cards()
        .iter()
        .filter(|card| card.transform.visible)
        .filter_map(|card| camera.project(card.transform.position).map(|p| (card, p)))
        .collect();
    visible.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

    for (card, projected) in &visible {
        CardRenderer::new(card, pool, projected, params.item_width, params.item_height)
            .draw(cr, colors)?;
    }
    Ok(())
}
