use crate::gui::theme::ThemeColors;
use crate::gui::wheel::Viewport;
use crate::menu::{LevelStyle, TextEntry};
use cairo::Context;
use palette::Srgba;
use romkit::scraper::{ScrapePhase, ScrapeProgress};

const TITLE_SIZE: f64 = 32.0;
const HELP_SIZE: f64 = 18.0;
const MARGIN: f64 = 32.0;
const BAR_HEIGHT: f64 = 8.0;
const DESCRIPTION_CHARS: usize = 48;
const DESCRIPTION_LINES: usize = 6;

/// What the overlays show this frame, borrowed from the session.
pub struct Overlay<'a> {
    pub breadcrumb: Vec<&'a str>,
    pub style: LevelStyle,
    pub entry: Option<&'a TextEntry>,
    pub notice: Option<&'a str>,
    /// Shown beside the wheel for the selected card; list levels draw their own.
    pub description: Option<&'a str>,
    pub scrape: Option<&'a ScrapeProgress>,
}

pub fn help_text(style: LevelStyle, editing: bool) -> &'static str {
    match (editing, style) {
        (true, _) => "↑↓ Character   → Add   ← Delete   Enter Save   Esc Cancel",
        (false, LevelStyle::Wheel) => "↑↓ Navigate   Enter Select   Esc Back",
        (false, LevelStyle::List) => "↑↓ Navigate   ←→ Change   Enter Select   Esc Back",
    }
}

/// Greedy word wrap to at most `max_lines` lines of `max_chars`. Text that
/// does not fit ends in an ellipsis.
pub fn wrap_lines(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let fits = current.chars().count() + 1 + word.chars().count() <= max_chars;
        if !current.is_empty() && !fits {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

pub fn scrape_line(progress: &ScrapeProgress) -> String {
    match progress.phase {
        ScrapePhase::Idle => String::new(),
        ScrapePhase::Scanning => "Scanning library…".to_string(),
        ScrapePhase::Scraping | ScrapePhase::Downloading => format!(
            "{} {}/{}: {}",
            progress.phase,
            progress.current,
            progress.total,
            progress.current_game.as_deref().unwrap_or("")
        ),
        ScrapePhase::Complete => format!(
            "Scrape complete: {} scraped, {} failed, {} skipped",
            progress.scraped, progress.failed, progress.skipped
        ),
        ScrapePhase::Error => format!(
            "Scrape failed: {}",
            progress.errors.last().map(String::as_str).unwrap_or("unknown error")
        ),
    }
}

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn centered_text(cr: &Context, text: &str, center_x: f64, baseline: f64) -> Result<(), cairo::Error> {
    let extents = cr.text_extents(text)?;
    cr.move_to(center_x - extents.x_advance() / 2.0, baseline);
    cr.show_text(text)
}

impl Overlay<'_> {
    pub fn draw(&self, cr: &Context, colors: &ThemeColors, viewport: Viewport) -> Result<(), cairo::Error> {
        self.draw_title(cr, colors, viewport)?;
        self.draw_help(cr, colors, viewport)?;
        if let Some(description) = self.description {
            self.draw_description(cr, colors, viewport, description)?;
        }
        if let Some(progress) = self.scrape {
            self.draw_scrape(cr, colors, viewport, progress)?;
        }
        if let Some(notice) = self.notice {
            self.draw_notice(cr, colors, viewport, notice)?;
        }
        if let Some(entry) = self.entry {
            self.draw_entry(cr, colors, viewport, entry)?;
        }
        Ok(())
    }

    fn draw_title(&self, cr: &Context, colors: &ThemeColors, viewport: Viewport) -> Result<(), cairo::Error> {
        let title = self.breadcrumb.join("  ›  ");
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(TITLE_SIZE);
        set_color(cr, colors.text);
        let extents = cr.text_extents(&title)?;
        cr.move_to(viewport.width - MARGIN - extents.x_advance(), MARGIN + TITLE_SIZE);
        cr.show_text(&title)
    }

    fn draw_help(&self, cr: &Context, colors: &ThemeColors, viewport: Viewport) -> Result<(), cairo::Error> {
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        cr.set_font_size(HELP_SIZE);
        set_color(cr, colors.dim_text);
        centered_text(
            cr,
            help_text(self.style, self.entry.is_some()),
            viewport.width / 2.0,
            viewport.height - MARGIN,
        )
    }

    fn draw_description(
        &self,
        cr: &Context,
        colors: &ThemeColors,
        viewport: Viewport,
        description: &str,
    ) -> Result<(), cairo::Error> {
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        cr.set_font_size(HELP_SIZE);
        set_color(cr, colors.dim_text);
        let x = viewport.width * 0.55;
        let mut y = MARGIN * 2.0 + TITLE_SIZE * 2.0;
        for line in wrap_lines(description, DESCRIPTION_CHARS, DESCRIPTION_LINES) {
            cr.move_to(x, y);
            cr.show_text(&line)?;
            y += HELP_SIZE * 1.4;
        }
        Ok(())
    }

    fn draw_scrape(
        &self,
        cr: &Context,
        colors: &ThemeColors,
        viewport: Viewport,
        progress: &ScrapeProgress,
    ) -> Result<(), cairo::Error> {
        let width = viewport.width / 3.0;
        let x = viewport.width - MARGIN - width;
        let y = viewport.height - MARGIN * 3.0;

        set_color(cr, colors.panel);
        cr.rectangle(x - 12.0, y - HELP_SIZE - 16.0, width + 24.0, HELP_SIZE + BAR_HEIGHT + 36.0);
        cr.fill()?;

        set_color(cr, colors.text);
        cr.set_font_size(HELP_SIZE);
        cr.move_to(x, y - 8.0);
        cr.show_text(&scrape_line(progress))?;

        set_color(cr, colors.dim_text);
        cr.rectangle(x, y, width, BAR_HEIGHT);
        cr.fill()?;
        set_color(cr, colors.accent);
        cr.rectangle(x, y, width * progress.fraction(), BAR_HEIGHT);
        cr.fill()
    }

    fn draw_notice(
        &self,
        cr: &Context,
        colors: &ThemeColors,
        viewport: Viewport,
        notice: &str,
    ) -> Result<(), cairo::Error> {
        cr.set_font_size(HELP_SIZE * 1.2);
        let extents = cr.text_extents(notice)?;
        let (w, h) = (extents.x_advance() + 48.0, HELP_SIZE * 1.2 + 32.0);
        let (x, y) = ((viewport.width - w) / 2.0, viewport.height - MARGIN * 2.0 - h - 24.0);

        set_color(cr, colors.panel);
        cr.rectangle(x, y, w, h);
        cr.fill()?;
        set_color(cr, colors.text);
        centered_text(cr, notice, viewport.width / 2.0, y + h / 2.0 + HELP_SIZE * 0.4)
    }

    fn draw_entry(
        &self,
        cr: &Context,
        colors: &ThemeColors,
        viewport: Viewport,
        entry: &TextEntry,
    ) -> Result<(), cairo::Error> {
        let (w, h) = (viewport.width * 0.5, 160.0);
        let (x, y) = ((viewport.width - w) / 2.0, (viewport.height - h) / 2.0);

        set_color(cr, Srgba::new(0.0, 0.0, 0.0, 0.85));
        cr.rectangle(x, y, w, h);
        cr.fill()?;

        set_color(cr, colors.dim_text);
        cr.set_font_size(HELP_SIZE);
        centered_text(cr, entry.label(), viewport.width / 2.0, y + 40.0)?;

        set_color(cr, colors.text);
        cr.set_font_size(TITLE_SIZE);
        centered_text(cr, &format!("{}▏", entry.text()), viewport.width / 2.0, y + 100.0)
    }
}
