use crate::gui::theme::ThemeColors;
use crate::gui::wheel::Viewport;
use crate::menu::{ItemKind, MenuItem, Navigator};
use cairo::Context;
use std::ops::Range;

const ROW_HEIGHT: f64 = 56.0;
const HEADER_HEIGHT: f64 = 96.0;
const FOOTER_HEIGHT: f64 = 120.0;
const SIDE_MARGIN: f64 = 0.12; // fraction of the width
const FONT_SIZE: f64 = 24.0;

/// Right-hand column of a settings row.
pub fn row_value(item: &MenuItem) -> String {
    match &item.kind {
        ItemKind::Toggle(true) => "ON".to_string(),
        ItemKind::Toggle(false) => "OFF".to_string(),
        ItemKind::List { options, selected } => options.get(*selected).cloned().unwrap_or_default(),
        ItemKind::Input(text) if text.is_empty() => "(empty)".to_string(),
        ItemKind::Input(text) => text.clone(),
        ItemKind::Submenu(_) | ItemKind::Action(_) => "›".to_string(),
        ItemKind::Game { .. } => String::new(),
    }
}

/// The slice of rows to show so that `selected` stays on screen, scrolled to
/// keep it near the middle.
pub fn visible_rows(total: usize, selected: usize, capacity: usize) -> Range<usize> {
    let capacity = capacity.max(1);
    if total <= capacity {
        return 0..total;
    }
    let selected = selected.min(total - 1);
    let start = selected.saturating_sub(capacity / 2).min(total - capacity);
    start..start + capacity
}

fn set_color(cr: &Context, color: palette::Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Flat settings page: one row per item with its value, selection
/// highlighted, description of the selected item below.
pub fn draw(
    cr: &Context,
    nav: &Navigator,
    colors: &ThemeColors,
    viewport: Viewport,
) -> Result<(), cairo::Error> {
    let items = nav.items();
    let left = viewport.width * SIDE_MARGIN;
    let right = viewport.width * (1.0 - SIDE_MARGIN);
    let capacity = ((viewport.height - HEADER_HEIGHT - FOOTER_HEIGHT) / ROW_HEIGHT).floor() as usize;
    let rows = visible_rows(items.len(), nav.selected(), capacity);

    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(FONT_SIZE);

    for (slot, index) in rows.enumerate() {
        let item = &items[index];
        let top = HEADER_HEIGHT + slot as f64 * ROW_HEIGHT;
        let baseline = top + ROW_HEIGHT / 2.0 + FONT_SIZE / 3.0;

        if index == nav.selected() {
            set_color(cr, colors.accent);
            cr.rectangle(left - 16.0, top + 4.0, right - left + 32.0, ROW_HEIGHT - 8.0);
            cr.fill()?;
        }

        set_color(cr, colors.text);
        cr.move_to(left, baseline);
        cr.show_text(&item.label)?;

        let value = row_value(item);
        if !value.is_empty() {
            let extents = cr.text_extents(&value)?;
            set_color(cr, if index == nav.selected() { colors.text } else { colors.dim_text });
            cr.move_to(right - extents.x_advance(), baseline);
            cr.show_text(&value)?;
        }
    }

    if let Some(description) = nav.selected_item().and_then(|i| i.description.as_deref()) {
        set_color(cr, colors.dim_text);
        cr.set_font_size(FONT_SIZE * 0.75);
        cr.move_to(left, viewport.height - FOOTER_HEIGHT + 24.0);
        cr.show_text(description)?;
    }
    Ok(())
}
