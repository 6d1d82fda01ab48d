//! Survey-report rendering: structured feedback → paginated A4 PDF.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};
use tracing::{debug, instrument};

use dossier_shared::{DossierError, FeedbackInput, Result};

use crate::theme::{DocTheme, PAGE_HEIGHT, PAGE_WIDTH};

/// Cursor heights below this trigger a page break.
const PAGE_BREAK_Y: f32 = 80.0;

/// Free-text lines are truncated (not wrapped) past this many characters.
const MAX_LINE_CHARS: usize = 110;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

const TITLE_STEP: f32 = 40.0;
const SCORE_STEP: f32 = 30.0;
const HEADING_STEP: f32 = 20.0;
const RATING_STEP: f32 = 15.0;
const FEEDBACK_TITLE_STEP: f32 = 14.0;
const LINE_STEP: f32 = 14.0;
const SECTION_GAP: f32 = 10.0;
const BODY_INDENT: f32 = 10.0;

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Approximate advance width for builtin Helvetica (no metrics exposed).
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

fn truncate_chars(line: &str, max: usize) -> String {
    line.chars().take(max).collect()
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the satisfaction-survey report.
///
/// Always produces at least one page (title and score); ratings and
/// feedback sections paginate independently whenever the cursor would
/// drop into the footer zone. No network or storage access.
#[instrument(skip_all, fields(ratings = input.ratings.len(), sections = input.feedback.len()))]
pub fn render_survey_report(input: &FeedbackInput, theme: &DocTheme) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Satisfaction Survey",
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DossierError::Report(format!("font: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DossierError::Report(format!("font: {e}")))?;

    let mut writer = PageWriter {
        doc: &doc,
        theme,
        font,
        bold,
        layer: doc.get_page(page).get_layer(layer),
        y: theme.content_top(),
        pages: 1,
    };
    writer.draw_chrome();

    // Title and score.
    writer.line("Satisfaction Survey", TITLE_SIZE, 0.0, true);
    writer.advance(TITLE_STEP);
    writer.line(&format!("Score: {}", input.score), HEADING_SIZE, 0.0, false);
    writer.advance(SCORE_STEP);

    // Ratings section: one line per entry, paginated per line.
    writer.line("Ratings", HEADING_SIZE, 0.0, true);
    writer.advance(HEADING_STEP);
    for (label, value) in &input.ratings {
        writer.line(
            &format!("{label}: {}", scalar_text(value)),
            BODY_SIZE,
            0.0,
            false,
        );
        writer.advance(RATING_STEP);
        writer.break_page_if_needed();
    }

    // Feedback section: title plus body lines, paginated per body line.
    writer.advance(HEADING_STEP);
    writer.line("Feedback", HEADING_SIZE, 0.0, true);
    writer.advance(HEADING_STEP);
    for (title, body) in &input.feedback {
        writer.line(&format!("{title}:"), BODY_SIZE, 0.0, false);
        writer.advance(FEEDBACK_TITLE_STEP);

        for raw_line in body.split('\n') {
            writer.line(
                &truncate_chars(raw_line, MAX_LINE_CHARS),
                BODY_SIZE,
                BODY_INDENT,
                false,
            );
            writer.advance(LINE_STEP);
            writer.break_page_if_needed();
        }

        writer.advance(SECTION_GAP);
    }

    let pages = writer.pages;
    drop(writer);
    debug!(pages, "survey report rendered");

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| DossierError::Report(format!("save: {e}")))?;
    buf.into_inner()
        .map_err(|e| DossierError::Report(format!("buffer: {e}")))
}

// ---------------------------------------------------------------------------
// Page cursor
// ---------------------------------------------------------------------------

/// Tracks the vertical cursor on the current page and opens fresh pages
/// (with chrome) when the content would run into the footer zone.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    theme: &'a DocTheme,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn line(&self, text: &str, size: f32, x_offset: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(
            text,
            size,
            mm(self.theme.margin_x + x_offset),
            mm(self.y),
            font,
        );
    }

    fn advance(&mut self, step: f32) {
        self.y -= step;
    }

    fn break_page_if_needed(&mut self) {
        if self.y < PAGE_BREAK_Y {
            let (page, layer) = self
                .doc
                .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = self.theme.content_top();
            self.pages += 1;
            self.draw_chrome();
        }
    }

    /// Wordmarks and footer line, drawn once per page.
    fn draw_chrome(&self) {
        let theme = self.theme;
        let header_y = PAGE_HEIGHT - theme.header_margin_top - theme.wordmark_size;

        if let Some(mark) = &theme.wordmark_left {
            self.layer
                .use_text(mark, theme.wordmark_size, mm(theme.margin_x), mm(header_y), &self.bold);
        }
        if let Some(mark) = &theme.wordmark_right {
            let x = PAGE_WIDTH - theme.margin_x - text_width(mark, theme.wordmark_size);
            self.layer
                .use_text(mark, theme.wordmark_size, mm(x), mm(header_y), &self.bold);
        }

        let x = (PAGE_WIDTH - text_width(&theme.footer_text, theme.footer_size)) / 2.0;
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.54, 0.54, 0.54, None)));
        self.layer.use_text(
            &theme.footer_text,
            theme.footer_size,
            mm(x),
            mm(theme.footer_y),
            &self.font,
        );
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }
}
