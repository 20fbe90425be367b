use crate::config::RenderConfig;
use crate::error::{ReportError, Result};
use crate::pipeline::window::ReportingWindow;
use crate::types::{AggregateStats, ComposedArtifact};
use ab_glyph::{Font, FontVec, PxScale};
use image::{DynamicImage, ImageFormat, Rgba};
use imageproc::drawing::draw_text_mut;
use std::fs;
use std::io::Cursor;
use tracing::debug;

/// Renders aggregate statistics into the publishable text + image pair.
///
/// The background template and font are injected configuration, so rendering
/// is exercisable with substitute assets. Output is deterministic for
/// identical inputs: fixed template, fixed anchors, fixed style.
pub struct Composer {
    render: RenderConfig,
    text_limit: usize,
}

impl Composer {
    pub fn new(render: &RenderConfig, text_limit: usize) -> Self {
        Self {
            render: render.clone(),
            text_limit,
        }
    }

    pub fn compose(
        &self,
        stats: &AggregateStats,
        window: &ReportingWindow,
    ) -> Result<ComposedArtifact> {
        let text = self.compose_text(stats, window)?;
        let image = self.compose_image(stats, window)?;
        Ok(ComposedArtifact { text, image })
    }

    /// Fills the fixed status template. Overflowing the platform ceiling is
    /// an error, never a truncation.
    pub fn compose_text(&self, stats: &AggregateStats, window: &ReportingWindow) -> Result<String> {
        let text = format!(
            "Crash report {window}: {} crashes, {} killed, {} injured. \
             Year to date: {} crashes, {} killed, {} injured.",
            stats.weekly_crashes,
            stats.weekly_fatalities,
            stats.weekly_injuries,
            stats.ytd_crashes,
            stats.ytd_fatalities,
            stats.ytd_injuries,
        );
        let len = text.chars().count();
        if len > self.text_limit {
            return Err(ReportError::ContentTooLong {
                len,
                limit: self.text_limit,
            });
        }
        Ok(text)
    }

    /// Overlays the window string and the six statistics onto the background
    /// template and encodes the result as PNG.
    pub fn compose_image(
        &self,
        stats: &AggregateStats,
        window: &ReportingWindow,
    ) -> Result<Vec<u8>> {
        let template = image::open(&self.render.template_path).map_err(|e| {
            ReportError::Render(format!(
                "failed to load template '{}': {e}",
                self.render.template_path
            ))
        })?;
        let mut canvas = template.to_rgba8();

        let font_bytes = fs::read(&self.render.font_path).map_err(|e| {
            ReportError::Render(format!("failed to read font '{}': {e}", self.render.font_path))
        })?;
        let font = FontVec::try_from_vec(font_bytes).map_err(|e| {
            ReportError::Render(format!("failed to parse font '{}': {e}", self.render.font_path))
        })?;

        let [r, g, b] = self.render.text_color;
        let color = Rgba([r, g, b, 255]);
        let scale = PxScale::from(self.render.font_scale);
        let [x, mut y] = self.render.anchor;

        for line in self.overlay_lines(stats, window) {
            ensure_glyph_coverage(&font, &line)?;
            draw_text_mut(&mut canvas, color, x, y, scale, &font, &line);
            y += self.render.line_height;
        }

        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| ReportError::Render(format!("failed to encode PNG: {e}")))?;
        debug!(bytes = buf.len(), "rendered report image");
        Ok(buf)
    }

    fn overlay_lines(&self, stats: &AggregateStats, window: &ReportingWindow) -> Vec<String> {
        vec![
            window.to_string(),
            stats.weekly_crashes.to_string(),
            stats.weekly_fatalities.to_string(),
            stats.weekly_injuries.to_string(),
            stats.ytd_crashes.to_string(),
            stats.ytd_fatalities.to_string(),
            stats.ytd_injuries.to_string(),
        ]
    }
}

fn ensure_glyph_coverage(font: &FontVec, text: &str) -> Result<()> {
    if let Some(ch) = text
        .chars()
        .find(|&c| !c.is_whitespace() && font.glyph_id(c).0 == 0)
    {
        return Err(ReportError::Render(format!(
            "font has no glyph for {ch:?}"
        )));
    }
    Ok(())
}
