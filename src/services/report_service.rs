use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::models::quiz_attempt::QuizAttempt;
use crate::models::scale::{default_scale, ScaleBand};
use crate::models::template::{ImageDisplayStyle, ReportTemplate, TextDisplayPosition};
use crate::services::scale_service::{resolve_level, LevelArtwork, PerformanceLevel};
use base64::Engine;
use chrono::{DateTime, Utc};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Rgb,
};
use std::io::Cursor;
use uuid::Uuid;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;
const FOOTER_ZONE: f32 = 20.0;

// ── Color palette ──
const PRIMARY: &str = "#2563eb"; // Blue 600
const INK: &str = "#1e293b"; // Slate 800
const MUTED: &str = "#64748b"; // Slate 500
const CARD_BG: &str = "#f8fafc"; // Slate 50
const CARD_BORDER: &str = "#e2e8f0"; // Slate 200
const TRACK: &str = "#e5e7eb"; // Gray 200

// Cycled through by the pie chart and its legend.
const CHART_COLORS: [&str; 6] = [
    "#2563eb", "#059669", "#d97706", "#dc2626", "#7c3aed", "#0891b2",
];

/// Per-packet data the renderer works from: the attempt's stored marks joined
/// with the packet's current questions and scale.
#[derive(Debug, Clone)]
pub struct ReportPacket {
    pub id: Uuid,
    pub name: String,
    pub scale: Option<Vec<ScaleBand>>,
    pub marks: i32,
    pub questions_answered: i32,
    pub question_count: i32,
    pub max_marks: i32,
}

#[derive(Debug, Clone)]
pub struct ReportLearner {
    pub name: String,
    pub email: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

pub struct ReportService;

impl ReportService {
    /// Renders one attempt into a complete PDF byte stream. Identical inputs
    /// produce identical layout; the only run-dependent bytes are the ones
    /// the PDF container itself inserts.
    pub fn render(
        quiz: &Quiz,
        learner: &ReportLearner,
        attempt: &QuizAttempt,
        packets: &[ReportPacket],
        template: &ReportTemplate,
    ) -> Result<Vec<u8>> {
        let mut pdf = PdfWriter::new(&quiz.name)?;

        Self::add_header(&mut pdf, quiz);
        Self::add_learner_card(&mut pdf, learner, attempt);
        Self::add_overall_score(&mut pdf, attempt, packets);
        Self::add_packet_cards(&mut pdf, packets, template)?;
        Self::add_insights(&mut pdf, attempt);
        Self::add_recommendations(&mut pdf, attempt);
        Self::add_summary_page(&mut pdf, attempt, packets);
        if let Some(footer) = quiz.report_footer.as_deref() {
            pdf.ensure_space(12.0);
            pdf.text(&strip_html(footer), 8.0, MARGIN, MUTED, false);
            pdf.advance(5.0);
        }
        pdf.finish_pages();

        pdf.doc
            .save_to_bytes()
            .map_err(|e| Error::Report(e.to_string()))
    }

    // ── Header band ──
    fn add_header(pdf: &mut PdfWriter, quiz: &Quiz) {
        pdf.filled_rect(0.0, 0.0, PAGE_W, 34.0, PRIMARY);
        pdf.text_at(&quiz.name, 18.0, MARGIN, 14.0, "#ffffff", true);
        pdf.text_at(
            "Assessment Performance Report",
            10.0,
            MARGIN,
            22.0,
            "#dbeafe",
            false,
        );
        pdf.y = 42.0;

        if let Some(header) = quiz.report_header.as_deref() {
            let text = strip_html(header);
            if !text.is_empty() {
                for line in wrap_text(&text, 9.0, CONTENT_W) {
                    pdf.text(&line, 9.0, MARGIN, MUTED, false);
                    pdf.advance(4.5);
                }
                pdf.advance(3.0);
            }
        }
    }

    // ── Learner card ──
    fn add_learner_card(pdf: &mut PdfWriter, learner: &ReportLearner, attempt: &QuizAttempt) {
        pdf.ensure_space(26.0);
        let top = pdf.y;
        pdf.filled_rect(MARGIN, top, CONTENT_W, 22.0, CARD_BG);
        pdf.stroke_rect(MARGIN, top, CONTENT_W, 22.0, CARD_BORDER, 0.4);

        pdf.text_at(&learner.name, 12.0, MARGIN + 5.0, top + 8.0, INK, true);
        if let Some(email) = learner.email.as_deref() {
            pdf.text_at(email, 8.5, MARGIN + 5.0, top + 14.5, MUTED, false);
        }

        let completed = learner
            .completed_at
            .map(|d| d.format("%d %b %Y, %H:%M UTC").to_string())
            .unwrap_or_else(|| "in progress".to_string());
        let right = format!("Completed: {completed}");
        let rx = PAGE_W - MARGIN - 5.0 - text_width(&right, 8.5);
        pdf.text_at(&right, 8.5, rx, top + 8.0, MUTED, false);
        let answered = format!("Questions answered: {}", attempt.total_questions);
        let ax = PAGE_W - MARGIN - 5.0 - text_width(&answered, 8.5);
        pdf.text_at(&answered, 8.5, ax, top + 14.5, MUTED, false);

        pdf.y = top + 28.0;
    }

    // ── Overall score ──
    fn add_overall_score(pdf: &mut PdfWriter, attempt: &QuizAttempt, packets: &[ReportPacket]) {
        pdf.ensure_space(40.0);
        let top = pdf.y;
        pdf.filled_rect(MARGIN, top, CONTENT_W, 34.0, CARD_BG);
        pdf.stroke_rect(MARGIN, top, CONTENT_W, 34.0, CARD_BORDER, 0.4);

        let level = overall_level(attempt, packets);

        let pct = format!("{}%", attempt.score);
        pdf.text_at(&pct, 26.0, MARGIN + 8.0, top + 15.0, &level.color, true);
        let marks = format!("{} / {} points", attempt.total_marks, attempt.max_marks);
        pdf.text_at(&marks, 10.0, MARGIN + 8.0, top + 24.0, INK, false);

        pdf.text_at(&level.label, 14.0, MARGIN + 70.0, top + 13.0, &level.color, true);
        for (i, line) in wrap_text(&level.large_text, 9.0, CONTENT_W - 80.0)
            .into_iter()
            .take(3)
            .enumerate()
        {
            pdf.text_at(&line, 9.0, MARGIN + 70.0, top + 20.0 + i as f32 * 4.5, MUTED, false);
        }

        // Score bar along the card bottom.
        let fraction = if attempt.max_marks > 0 {
            (attempt.total_marks as f32 / attempt.max_marks as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };
        pdf.filled_rect(MARGIN + 8.0, top + 28.0, CONTENT_W - 16.0, 2.5, TRACK);
        if fraction > 0.0 {
            pdf.filled_rect(
                MARGIN + 8.0,
                top + 28.0,
                (CONTENT_W - 16.0) * fraction,
                2.5,
                &level.color,
            );
        }

        pdf.y = top + 40.0;
    }

    // ── Packet cards ──
    fn add_packet_cards(
        pdf: &mut PdfWriter,
        packets: &[ReportPacket],
        template: &ReportTemplate,
    ) -> Result<()> {
        let visible = visible_packets(packets, template);
        if visible.is_empty() {
            return Ok(());
        }

        pdf.section_title("Section Results");
        for packet in visible {
            Self::add_packet_card(pdf, packet, template)?;
        }
        Ok(())
    }

    fn add_packet_card(
        pdf: &mut PdfWriter,
        packet: &ReportPacket,
        template: &ReportTemplate,
    ) -> Result<()> {
        let cfg = template.config_for(&packet.id);
        let level = resolve_level(packet.marks, packet.scale.as_deref());

        let mut height = 10.0;
        if cfg.show_header {
            height += 8.0;
        }
        if cfg.show_score_breakdown {
            height += 6.0;
        }
        if cfg.show_scaling_level {
            height += 7.0;
        }
        if cfg.show_scaling_image {
            height += image_height_mm(cfg.image_display_style) + 4.0;
        }
        if cfg.show_scaling_text && !level.large_text.is_empty() {
            height += 10.0;
        }
        if cfg.show_all_scale_levels {
            height += 5.0 * scale_for(packet).len() as f32 + 4.0;
        }
        if cfg.show_scale_comparison {
            height += 12.0;
        }
        if cfg.show_recommendations {
            height += 6.0;
        }
        pdf.ensure_space(height + 6.0);

        let top = pdf.y;
        let bg = cfg.background_color.as_deref().unwrap_or(CARD_BG);
        let border = cfg.border_color.as_deref().unwrap_or(CARD_BORDER);
        pdf.filled_rect(MARGIN, top, CONTENT_W, height, bg);
        pdf.stroke_rect(MARGIN, top, CONTENT_W, height, border, 0.4);
        pdf.filled_rect(MARGIN, top, 2.0, height, &level.color);

        let x = MARGIN + 7.0;
        let mut cy = top + 8.0;

        if cfg.show_header {
            pdf.text_at(&packet.name, 12.0, x, cy, INK, true);
            let score = format!("{} / {}", packet.marks, packet.max_marks);
            let sx = PAGE_W - MARGIN - 7.0 - text_width(&score, 12.0);
            pdf.text_at(&score, 12.0, sx, cy, &level.color, true);
            cy += 8.0;
        }

        if cfg.show_score_breakdown {
            let breakdown = format!(
                "{} of {} questions answered, {} points earned",
                packet.questions_answered, packet.question_count, packet.marks
            );
            pdf.text_at(&breakdown, 8.5, x, cy, MUTED, false);
            cy += 6.0;
        }

        let show_text_above = cfg.show_scaling_text
            && !level.large_text.is_empty()
            && cfg.text_display_position == TextDisplayPosition::Above;
        if show_text_above {
            cy = Self::add_scaling_text(pdf, &level, x, cy);
        }

        if cfg.show_scaling_level {
            pdf.filled_circle(x + 1.5, cy - 1.2, 1.5, &level.color);
            let inline = cfg.show_scaling_text
                && !level.large_text.is_empty()
                && cfg.text_display_position == TextDisplayPosition::Inline;
            pdf.text_at(&level.label, 10.0, x + 5.0, cy, &level.color, true);
            if inline {
                let lx = x + 5.0 + text_width(&level.label, 10.0) + 4.0;
                let rest = truncate_to_width(&level.large_text, 8.5, PAGE_W - MARGIN - 7.0 - lx);
                pdf.text_at(&rest, 8.5, lx, cy, MUTED, false);
            }
            cy += 7.0;
        }

        if cfg.show_scaling_image {
            let size = image_height_mm(cfg.image_display_style);
            // Banner images stretch across the card; the rest stay square.
            let max_w = if cfg.image_display_style == ImageDisplayStyle::Banner {
                CONTENT_W - 14.0
            } else {
                size
            };
            match &level.artwork {
                LevelArtwork::Image(data_uri) => {
                    if Self::embed_data_uri(pdf, data_uri, x, cy, max_w, size).is_err() {
                        Self::draw_glyph_badge(pdf, &level, x, cy, size);
                    }
                }
                LevelArtwork::Glyph(_) => Self::draw_glyph_badge(pdf, &level, x, cy, size),
            }
            cy += size + 4.0;
        }

        if cfg.show_scaling_text
            && !level.large_text.is_empty()
            && matches!(
                cfg.text_display_position,
                TextDisplayPosition::Below | TextDisplayPosition::Separate
            )
        {
            cy = Self::add_scaling_text(pdf, &level, x, cy);
        }

        if cfg.show_all_scale_levels {
            let bands = scale_for(packet);
            for band in &bands {
                let marker = if band.contains(packet.marks) { ">" } else { " " };
                let row = format!("{marker} {}-{}  {}", band.min, band.max, band.label);
                let color = if band.contains(packet.marks) {
                    band.color.as_str()
                } else {
                    MUTED
                };
                pdf.text_at(&row, 8.5, x, cy, color, band.contains(packet.marks));
                cy += 5.0;
            }
            cy += 4.0;
        }

        if cfg.show_scale_comparison {
            cy = Self::add_scale_comparison(pdf, packet, x, cy);
        }

        if cfg.show_recommendations {
            let tip = packet_tip(packet.marks, packet.max_marks);
            pdf.text_at(&format!("Suggested focus: {tip}"), 8.5, x, cy, MUTED, false);
            cy += 6.0;
        }

        pdf.y = (top + height).max(cy) + 5.0;
        Ok(())
    }

    fn add_scaling_text(pdf: &mut PdfWriter, level: &PerformanceLevel, x: f32, mut cy: f32) -> f32 {
        for line in wrap_text(&level.large_text, 8.5, CONTENT_W - 14.0).into_iter().take(2) {
            pdf.text_at(&line, 8.5, x, cy, INK, false);
            cy += 4.5;
        }
        cy + 1.0
    }

    /// A horizontal track spanning the packet's scale with a marker at the
    /// earned score.
    fn add_scale_comparison(pdf: &mut PdfWriter, packet: &ReportPacket, x: f32, cy: f32) -> f32 {
        let bands = scale_for(packet);
        let lo = bands.iter().map(|b| b.min).min().unwrap_or(0);
        let hi = bands.iter().map(|b| b.max).max().unwrap_or(1).max(lo + 1);
        let width = CONTENT_W - 14.0;
        let span = (hi - lo) as f32;

        for band in &bands {
            let bx = x + (band.min - lo) as f32 / span * width;
            let bw = (band.max - band.min + 1) as f32 / span * width;
            pdf.filled_rect(bx, cy, bw.min(x + width - bx), 3.0, &band.color);
        }
        let marker = x + ((packet.marks - lo).max(0) as f32 / span * width).min(width);
        pdf.filled_circle(marker, cy + 1.5, 2.2, INK);
        pdf.text_at(&packet.marks.to_string(), 7.0, marker + 3.0, cy + 2.5, INK, true);
        cy + 10.0
    }

    fn draw_glyph_badge(pdf: &mut PdfWriter, level: &PerformanceLevel, x: f32, cy: f32, size: f32) {
        let r = size / 2.0;
        pdf.filled_circle(x + r, cy + r, r, &level.color);
        if let LevelArtwork::Glyph(glyph) = &level.artwork {
            let font_size = size * 1.2;
            let tx = x + r - text_width(glyph, font_size) / 2.0;
            pdf.text_at(glyph, font_size, tx, cy + r + size * 0.15, "#ffffff", true);
        }
    }

    fn embed_data_uri(
        pdf: &mut PdfWriter,
        data_uri: &str,
        x: f32,
        cy: f32,
        max_w: f32,
        max_h: f32,
    ) -> Result<()> {
        let encoded = data_uri
            .strip_prefix("data:image/png;base64,")
            .ok_or_else(|| Error::Report("unsupported image encoding".into()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::Report(e.to_string()))?;

        let decoder = printpdf::image_crate::codecs::png::PngDecoder::new(Cursor::new(bytes))
            .map_err(|e| Error::Report(e.to_string()))?;
        let image = printpdf::Image::try_from(decoder).map_err(|e| Error::Report(e.to_string()))?;

        // Native size at 300 dpi, scaled to fit the given box.
        let px_w = image.image.width.0.max(1) as f32;
        let px_h = image.image.height.0.max(1) as f32;
        let native_w = px_w * 25.4 / 300.0;
        let native_h = px_h * 25.4 / 300.0;
        let scale = (max_w / native_w).min(max_h / native_h);

        image.add_to_layer(
            pdf.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_H - cy - native_h * scale)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(300.0),
                ..Default::default()
            },
        );
        Ok(())
    }

    // ── Performance insights ──
    fn add_insights(pdf: &mut PdfWriter, attempt: &QuizAttempt) {
        pdf.ensure_space(30.0);
        pdf.section_title("Performance Insights");

        let insight = if attempt.total_marks >= 9 {
            "Excellent performance across the assessed areas. The results show consistent mastery of the material."
        } else if attempt.total_marks >= 6 {
            "Good overall performance. A few areas would benefit from targeted review."
        } else if attempt.total_marks >= 3 {
            "Average performance. Revisiting the core material is recommended before moving on."
        } else {
            "The results suggest the fundamentals need more attention. A structured review plan would help."
        };
        for line in wrap_text(insight, 9.5, CONTENT_W) {
            pdf.text(&line, 9.5, MARGIN, INK, false);
            pdf.advance(5.0);
        }
        pdf.advance(3.0);
    }

    // ── Recommendations ──
    fn add_recommendations(pdf: &mut PdfWriter, attempt: &QuizAttempt) {
        pdf.ensure_space(35.0);
        pdf.section_title("Recommendations");

        let first = if attempt.total_marks >= 6 {
            "Keep building on the strongest sections; stretch goals will maintain momentum."
        } else {
            "Prioritize the weakest sections first; small, regular practice sessions work best."
        };
        let mut items = vec![
            first.to_string(),
            "Review the sections with the lowest point totals and retake the quiz after practice.".to_string(),
        ];
        if attempt.total_marks < 3 {
            items.push(
                "Consider pairing with a mentor or study group before the next attempt.".to_string(),
            );
        } else {
            items.push(
                "Schedule a follow-up assessment in a few weeks to confirm progress.".to_string(),
            );
        }

        for (i, item) in items.iter().enumerate() {
            let bullet = format!("{}.", i + 1);
            pdf.text(&bullet, 9.5, MARGIN, PRIMARY, true);
            for (j, line) in wrap_text(item, 9.5, CONTENT_W - 8.0).into_iter().enumerate() {
                if j > 0 {
                    pdf.advance(5.0);
                }
                pdf.text(&line, 9.5, MARGIN + 8.0, INK, false);
            }
            pdf.advance(6.0);
        }
        pdf.advance(2.0);
    }

    // ── Summary page with charts ──
    fn add_summary_page(pdf: &mut PdfWriter, attempt: &QuizAttempt, packets: &[ReportPacket]) {
        pdf.new_page();
        pdf.section_title("Score Summary");

        // All packets appear here regardless of template visibility.
        Self::add_bar_chart(pdf, packets);
        Self::add_gauge(pdf, attempt);
        Self::add_pie_chart(pdf, packets);
        Self::add_percentage_bars(pdf, packets);
        Self::add_summary_table(pdf, packets);
    }

    /// Horizontal bars, one per packet, marks against the packet maximum.
    fn add_bar_chart(pdf: &mut PdfWriter, packets: &[ReportPacket]) {
        if packets.is_empty() {
            return;
        }
        pdf.ensure_space(packets.len() as f32 * 9.0 + 14.0);
        pdf.text("Points by section", 10.0, MARGIN, INK, true);
        pdf.advance(7.0);

        let label_w = 45.0;
        let track_w = CONTENT_W - label_w - 18.0;
        for packet in packets {
            let label = truncate_to_width(&packet.name, 8.5, label_w - 2.0);
            pdf.text(&label, 8.5, MARGIN, INK, false);

            let y = pdf.y - 3.0;
            pdf.filled_rect(MARGIN + label_w, y, track_w, 4.0, TRACK);
            let fraction = if packet.max_marks > 0 {
                (packet.marks as f32 / packet.max_marks as f32).clamp(0.0, 1.0)
            } else {
                0.0
            };
            if fraction > 0.0 {
                let level = resolve_level(packet.marks, packet.scale.as_deref());
                pdf.filled_rect(MARGIN + label_w, y, track_w * fraction, 4.0, &level.color);
            }
            let value = format!("{}/{}", packet.marks, packet.max_marks);
            pdf.text_at(&value, 8.0, MARGIN + label_w + track_w + 2.0, pdf.y, MUTED, false);
            pdf.advance(9.0);
        }
        pdf.advance(4.0);
    }

    /// A semicircular gauge for the overall score.
    fn add_gauge(pdf: &mut PdfWriter, attempt: &QuizAttempt) {
        pdf.ensure_space(50.0);
        pdf.text("Overall score", 10.0, MARGIN, INK, true);
        pdf.advance(6.0);

        let cx = PAGE_W / 2.0;
        let cy = pdf.y + 32.0;
        let radius = 28.0;
        let fraction = if attempt.max_marks > 0 {
            (attempt.total_marks as f32 / attempt.max_marks as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };

        pdf.arc(cx, cy, radius, 180.0, 360.0, 1.8, TRACK);
        if fraction > 0.0 {
            pdf.arc(cx, cy, radius, 180.0, 180.0 + 180.0 * fraction, 1.8, PRIMARY);
        }

        let pct = format!("{}%", attempt.score);
        pdf.text_at(&pct, 18.0, cx - text_width(&pct, 18.0) / 2.0, cy - 4.0, INK, true);
        let marks = format!("{} of {} points", attempt.total_marks, attempt.max_marks);
        pdf.text_at(&marks, 8.5, cx - text_width(&marks, 8.5) / 2.0, cy + 3.0, MUTED, false);

        pdf.y = cy + 10.0;
    }

    /// Share of earned points per packet, drawn as filled pie slices with a
    /// legend alongside. Zero-mark packets appear in the legend only.
    fn add_pie_chart(pdf: &mut PdfWriter, packets: &[ReportPacket]) {
        let total: i32 = packets.iter().map(|p| p.marks).sum();
        if packets.is_empty() {
            return;
        }
        pdf.ensure_space(58.0);
        pdf.text("Points distribution", 10.0, MARGIN, INK, true);
        pdf.advance(6.0);

        let radius = 22.0;
        let cx = MARGIN + radius + 8.0;
        let cy = pdf.y + radius + 2.0;

        if total > 0 {
            let mut start = 0.0_f32;
            for (i, packet) in packets.iter().enumerate() {
                if packet.marks <= 0 {
                    continue;
                }
                let sweep = packet.marks as f32 / total as f32 * 360.0;
                pdf.pie_slice(cx, cy, radius, start, start + sweep, slice_color(i));
                start += sweep;
            }
        } else {
            pdf.filled_circle(cx, cy, radius, TRACK);
        }

        let legend_x = cx + radius + 14.0;
        let mut ly = pdf.y + 4.0;
        for (i, packet) in packets.iter().enumerate() {
            pdf.filled_rect(legend_x, ly - 2.5, 3.5, 3.5, slice_color(i));
            let share = if total > 0 {
                ((packet.marks as f64 / total as f64) * 100.0).round() as i32
            } else {
                0
            };
            let entry = format!("{} ({} pts, {share}%)", packet.name, packet.marks);
            let entry = truncate_to_width(&entry, 8.5, PAGE_W - MARGIN - legend_x - 6.0);
            pdf.text_at(&entry, 8.5, legend_x + 5.5, ly, INK, false);
            ly += 6.0;
        }

        pdf.y = (cy + radius).max(ly) + 6.0;
    }

    /// Percent-of-maximum per packet, the radar view flattened into bars.
    fn add_percentage_bars(pdf: &mut PdfWriter, packets: &[ReportPacket]) {
        if packets.is_empty() {
            return;
        }
        pdf.ensure_space(packets.len() as f32 * 9.0 + 14.0);
        pdf.text("Percent of maximum by section", 10.0, MARGIN, INK, true);
        pdf.advance(7.0);

        let label_w = 45.0;
        let track_w = CONTENT_W - label_w - 18.0;
        for packet in packets {
            let label = truncate_to_width(&packet.name, 8.5, label_w - 2.0);
            pdf.text(&label, 8.5, MARGIN, INK, false);

            let percent = if packet.max_marks > 0 {
                ((packet.marks as f64 / packet.max_marks as f64) * 100.0).round() as i32
            } else {
                0
            };
            let y = pdf.y - 3.0;
            pdf.filled_rect(MARGIN + label_w, y, track_w, 4.0, TRACK);
            if percent > 0 {
                let fill = track_w * (percent.min(100) as f32 / 100.0);
                pdf.filled_rect(MARGIN + label_w, y, fill, 4.0, PRIMARY);
            }
            let value = format!("{percent}%");
            pdf.text_at(&value, 8.0, MARGIN + label_w + track_w + 2.0, pdf.y, MUTED, false);
            pdf.advance(9.0);
        }
        pdf.advance(4.0);
    }

    fn add_summary_table(pdf: &mut PdfWriter, packets: &[ReportPacket]) {
        if packets.is_empty() {
            return;
        }
        pdf.ensure_space(packets.len() as f32 * 7.0 + 20.0);
        pdf.text("Section breakdown", 10.0, MARGIN, INK, true);
        pdf.advance(7.0);

        let cols = [MARGIN, MARGIN + 80.0, MARGIN + 110.0, MARGIN + 140.0];
        let top = pdf.y;
        pdf.filled_rect(MARGIN, top - 4.5, CONTENT_W, 6.5, "#0f172a");
        for (header, x) in ["Section", "Points", "Percent", "Level"].iter().zip(cols) {
            pdf.text_at(header, 8.5, x + 2.0, top, "#ffffff", true);
        }
        pdf.advance(7.0);

        for (i, packet) in packets.iter().enumerate() {
            let row_y = pdf.y;
            if i % 2 == 0 {
                pdf.filled_rect(MARGIN, row_y - 4.5, CONTENT_W, 6.5, CARD_BG);
            }
            let level = resolve_level(packet.marks, packet.scale.as_deref());
            let percent = if packet.max_marks > 0 {
                format!(
                    "{}%",
                    ((packet.marks as f64 / packet.max_marks as f64) * 100.0).round() as i32
                )
            } else {
                "0%".to_string()
            };

            let name = truncate_to_width(&packet.name, 8.5, 76.0);
            pdf.text_at(&name, 8.5, cols[0] + 2.0, row_y, INK, false);
            let points = format!("{}/{}", packet.marks, packet.max_marks);
            pdf.text_at(&points, 8.5, cols[1] + 2.0, row_y, INK, false);
            pdf.text_at(&percent, 8.5, cols[2] + 2.0, row_y, INK, false);
            pdf.text_at(&level.label, 8.5, cols[3] + 2.0, row_y, &level.color, true);
            pdf.advance(7.0);
        }
        pdf.advance(3.0);
    }
}

/// The packets that get an analysis card: template-enabled only, sorted by
/// the template's order with ties keeping quiz order. The summary charts are
/// built from the full packet list and never pass through this filter.
fn visible_packets<'a>(
    packets: &'a [ReportPacket],
    template: &ReportTemplate,
) -> Vec<&'a ReportPacket> {
    let mut visible: Vec<(usize, &ReportPacket)> = packets
        .iter()
        .enumerate()
        .filter(|(_, p)| template.config_for(&p.id).enabled)
        .collect();
    visible.sort_by_key(|(idx, p)| (template.config_for(&p.id).order, *idx));
    visible.into_iter().map(|(_, p)| p).collect()
}

fn slice_color(index: usize) -> &'static str {
    CHART_COLORS[index % CHART_COLORS.len()]
}

fn overall_level(attempt: &QuizAttempt, packets: &[ReportPacket]) -> PerformanceLevel {
    let scale = packets.iter().find_map(|p| p.scale.as_deref());
    resolve_level(attempt.total_marks, scale)
}

fn scale_for(packet: &ReportPacket) -> Vec<ScaleBand> {
    packet.scale.clone().unwrap_or_else(default_scale)
}

/// One-line study suggestion for a section, keyed off its percent of maximum.
fn packet_tip(marks: i32, max_marks: i32) -> &'static str {
    if max_marks <= 0 {
        return "no scored questions in this section yet.";
    }
    let percent = marks * 100 / max_marks;
    if percent >= 80 {
        "strength area, keep it sharp with occasional practice."
    } else if percent >= 50 {
        "solid base, targeted review will close the gap."
    } else {
        "revisit this section's material first."
    }
}

fn image_height_mm(size: ImageDisplayStyle) -> f32 {
    match size {
        ImageDisplayStyle::Small => 12.0,
        ImageDisplayStyle::Medium => 20.0,
        ImageDisplayStyle::Large => 32.0,
        ImageDisplayStyle::Banner => 20.0,
    }
}

/// Drops markup tags and the handful of entities the quiz editor emits.
fn strip_html(input: &str) -> String {
    let mut result = String::new();
    let mut inside_tag = false;
    for c in input.chars() {
        if c == '<' {
            inside_tag = true;
        } else if c == '>' {
            inside_tag = false;
        } else if !inside_tag {
            result.push(c);
        }
    }
    result
        .trim()
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .to_string()
}

/// Helvetica metrics are not embedded, so width is approximated from the
/// average glyph advance. Good enough for centering and right-alignment.
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5 * 0.352778
}

fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size) > max_width && !current.is_empty() {
            lines.push(current);
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn truncate_to_width(text: &str, font_size: f32, max_width: f32) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width(&out, font_size) > max_width - text_width("...", font_size) {
            out.pop();
            out.push_str("...");
            return out;
        }
    }
    out
}

fn parse_hex(color: &str) -> Rgb {
    let hex = color.trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None);
        }
    }
    Rgb::new(0.4, 0.45, 0.5, None)
}

/// Page-oriented wrapper over printpdf. The cursor runs top-down in
/// millimeters; conversion to the PDF's bottom-left origin happens here.
struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    layers: Vec<PdfLayerReference>,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "content");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::Report(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::Report(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer: layer.clone(),
            layers: vec![layer],
            font,
            font_bold,
            y: MARGIN,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.layers.push(self.layer.clone());
        self.y = MARGIN;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - FOOTER_ZONE {
            self.new_page();
        }
    }

    fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    fn section_title(&mut self, title: &str) {
        self.ensure_space(14.0);
        self.text(title, 13.0, MARGIN, INK, true);
        self.advance(2.0);
        self.filled_rect(MARGIN, self.y, 18.0, 1.0, PRIMARY);
        self.advance(6.0);
    }

    /// Text at the current cursor line.
    fn text(&mut self, s: &str, size: f32, x: f32, color: &str, bold: bool) {
        let y = self.y;
        self.text_at(s, size, x, y, color, bold);
    }

    /// Text at an absolute position, `y` measured from the top of the page.
    fn text_at(&mut self, s: &str, size: f32, x: f32, y: f32, color: &str, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer.set_fill_color(Color::Rgb(parse_hex(color)));
        self.layer.use_text(s, size, Mm(x), Mm(PAGE_H - y), font);
    }

    fn filled_rect(&mut self, x: f32, y_top: f32, w: f32, h: f32, color: &str) {
        self.layer.set_fill_color(Color::Rgb(parse_hex(color)));
        let y = PAGE_H - y_top;
        let ring = vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y - h)), false),
            (Point::new(Mm(x), Mm(y - h)), false),
        ];
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke_rect(&mut self, x: f32, y_top: f32, w: f32, h: f32, color: &str, thickness: f32) {
        self.layer.set_outline_color(Color::Rgb(parse_hex(color)));
        self.layer.set_outline_thickness(thickness);
        let y = PAGE_H - y_top;
        let points = vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y - h)), false),
            (Point::new(Mm(x), Mm(y - h)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    fn filled_circle(&mut self, cx: f32, cy_top: f32, r: f32, color: &str) {
        self.layer.set_fill_color(Color::Rgb(parse_hex(color)));
        let cy = PAGE_H - cy_top;
        let ring: Vec<(Point, bool)> = (0..48)
            .map(|i| {
                let angle = i as f32 / 48.0 * std::f32::consts::TAU;
                (
                    Point::new(Mm(cx + r * angle.cos()), Mm(cy + r * angle.sin())),
                    false,
                )
            })
            .collect();
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    /// Filled pie slice, angles in degrees measured clockwise from twelve
    /// o'clock, `cy_top` from the top of the page.
    fn pie_slice(&mut self, cx: f32, cy_top: f32, r: f32, start_deg: f32, end_deg: f32, color: &str) {
        self.layer.set_fill_color(Color::Rgb(parse_hex(color)));
        let cy = PAGE_H - cy_top;
        let steps = 32;
        let mut ring = Vec::with_capacity(steps + 2);
        ring.push((Point::new(Mm(cx), Mm(cy)), false));
        for i in 0..=steps {
            let t = start_deg + (end_deg - start_deg) * i as f32 / steps as f32;
            let rad = (90.0 - t).to_radians();
            ring.push((
                Point::new(Mm(cx + r * rad.cos()), Mm(cy + r * rad.sin())),
                false,
            ));
        }
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    /// Stroked arc between two angles in degrees, 0 pointing right, counter
    /// clockwise, `cy_top` measured from the top of the page.
    fn arc(
        &mut self,
        cx: f32,
        cy_top: f32,
        r: f32,
        start_deg: f32,
        end_deg: f32,
        thickness: f32,
        color: &str,
    ) {
        self.layer.set_outline_color(Color::Rgb(parse_hex(color)));
        self.layer.set_outline_thickness(thickness);
        let cy = PAGE_H - cy_top;
        let steps = 48;
        let points: Vec<(Point, bool)> = (0..=steps)
            .map(|i| {
                let t = start_deg + (end_deg - start_deg) * i as f32 / steps as f32;
                let rad = t.to_radians();
                // Degrees run clockwise from the left horizontal here, so the
                // gauge sweeps over the top of the circle.
                (
                    Point::new(Mm(cx - r * rad.cos()), Mm(cy + r * (rad.sin()).abs())),
                    false,
                )
            })
            .collect();
        self.layer.add_line(Line {
            points,
            is_closed: false,
        });
    }

    /// Footers go on last so the page count is final.
    fn finish_pages(&mut self) {
        let total = self.layers.len();
        let generated = format!(
            "Generated by Assessment System on {}",
            Utc::now().format("%d %b %Y, %H:%M UTC")
        );
        for (i, layer) in self.layers.clone().into_iter().enumerate() {
            layer.set_fill_color(Color::Rgb(parse_hex(MUTED)));
            layer.use_text(generated.as_str(), 7.5, Mm(MARGIN), Mm(10.0), &self.font);
            let page_label = format!("Page {} of {}", i + 1, total);
            let x = PAGE_W - MARGIN - text_width(&page_label, 7.5);
            layer.use_text(page_label, 7.5, Mm(x), Mm(10.0), &self.font);
        }
    }
}
