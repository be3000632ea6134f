// Career brief PDF generation
//
// Renders a fixed-layout, deterministic brief for one candidate: header band,
// trust-score gauge, risk badge, score breakdown table, optional summary with
// overflow pagination, disclaimer, and page-number footers. No AI step.

use anyhow::Result;
use chrono::Utc;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::io::BufWriter;

/// Everything the brief needs, resolved by the caller from a candidate record
#[derive(Debug, Clone)]
pub struct CareerBriefData {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub career_consistency_score: i64,
    pub skill_proof_score: i64,
    pub role_alignment_score: i64,
    pub professional_presence_score: i64,
    pub data_completeness_score: i64,
    pub trust_score: i64,
    pub risk_level: Option<String>,
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT_MARGIN: f32 = 20.0;
const BOTTOM_MARGIN: f32 = 25.0;

const DISCLAIMER: &str = "This brief is generated automatically from submitted career data and \
third-party verification signals. Scores are advisory and should be weighed alongside interviews \
and reference checks, not in place of them.";

#[derive(Debug, Default)]
pub struct CareerBriefService;

impl CareerBriefService {
    pub fn new() -> Self {
        Self
    }

    /// Generate the brief as PDF bytes. Deterministic given the input data
    /// (apart from the generation date in the header).
    pub fn generate(&self, data: &CareerBriefData) -> Result<Vec<u8>> {
        let (doc, page1, layer1) = PdfDocument::new(
            "Career Brief",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );

        let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let font_regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        let mut pages = vec![(page1, layer1)];
        let mut layer = doc.get_page(page1).get_layer(layer1);

        // Header band
        self.filled_rect(
            &layer,
            0.0,
            PAGE_HEIGHT - 32.0,
            PAGE_WIDTH,
            32.0,
            Rgb::new(0.11, 0.16, 0.29, None),
        );
        layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
        layer.use_text(&data.full_name, 20.0, Mm(LEFT_MARGIN), Mm(PAGE_HEIGHT - 18.0), &font_bold);
        let contact_line = [
            data.email.as_deref(),
            data.phone.as_deref(),
            data.location.as_deref(),
        ]
        .iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join("  |  ");
        if !contact_line.is_empty() {
            layer.use_text(
                &contact_line,
                10.0,
                Mm(LEFT_MARGIN),
                Mm(PAGE_HEIGHT - 26.0),
                &font_regular,
            );
        }
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

        let mut current_y = PAGE_HEIGHT - 45.0;

        layer.use_text(
            &format!("Generated {}", Utc::now().format("%B %d, %Y")),
            9.0,
            Mm(LEFT_MARGIN),
            Mm(current_y),
            &font_regular,
        );

        // Trust score gauge
        current_y -= 15.0;
        layer.use_text("Trust Score", 13.0, Mm(LEFT_MARGIN), Mm(current_y), &font_bold);
        current_y -= 10.0;

        let gauge_width = 120.0;
        let score = data.trust_score.clamp(0, 100) as f32;
        self.filled_rect(
            &layer,
            LEFT_MARGIN,
            current_y - 2.0,
            gauge_width,
            6.0,
            Rgb::new(0.88, 0.89, 0.91, None),
        );
        self.filled_rect(
            &layer,
            LEFT_MARGIN,
            current_y - 2.0,
            gauge_width * score / 100.0,
            6.0,
            self.risk_color(data.risk_level.as_deref()),
        );
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        layer.use_text(
            &format!("{}/100", data.trust_score.clamp(0, 100)),
            12.0,
            Mm(LEFT_MARGIN + gauge_width + 6.0),
            Mm(current_y - 1.0),
            &font_bold,
        );

        // Risk badge
        current_y -= 14.0;
        let risk_label = data.risk_level.as_deref().unwrap_or("Not assessed");
        self.filled_rect(
            &layer,
            LEFT_MARGIN,
            current_y - 2.5,
            38.0,
            8.0,
            self.risk_color(data.risk_level.as_deref()),
        );
        layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
        layer.use_text(
            &format!("Risk: {}", risk_label),
            10.0,
            Mm(LEFT_MARGIN + 3.0),
            Mm(current_y),
            &font_bold,
        );
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

        // Score breakdown table
        current_y -= 16.0;
        layer.use_text("Score Breakdown", 13.0, Mm(LEFT_MARGIN), Mm(current_y), &font_bold);
        current_y -= 8.0;

        let rows: [(&str, i64, i64); 5] = [
            ("Career Consistency", data.career_consistency_score, 25),
            ("Skill Proof", data.skill_proof_score, 25),
            ("Role Alignment", data.role_alignment_score, 20),
            ("Professional Presence", data.professional_presence_score, 15),
            ("Data Completeness", data.data_completeness_score, 15),
        ];

        layer.use_text("Dimension", 10.0, Mm(LEFT_MARGIN), Mm(current_y), &font_bold);
        layer.use_text("Score", 10.0, Mm(140.0), Mm(current_y), &font_bold);
        layer.use_text("Max", 10.0, Mm(165.0), Mm(current_y), &font_bold);
        current_y -= 7.0;

        for (label, value, max) in rows {
            layer.use_text(label, 10.0, Mm(LEFT_MARGIN), Mm(current_y), &font_regular);
            layer.use_text(&value.to_string(), 10.0, Mm(140.0), Mm(current_y), &font_regular);
            layer.use_text(&max.to_string(), 10.0, Mm(165.0), Mm(current_y), &font_regular);
            current_y -= 6.0;
        }

        layer.use_text("Total", 10.0, Mm(LEFT_MARGIN), Mm(current_y), &font_bold);
        layer.use_text(
            &data.trust_score.to_string(),
            10.0,
            Mm(140.0),
            Mm(current_y),
            &font_bold,
        );
        layer.use_text("100", 10.0, Mm(165.0), Mm(current_y), &font_bold);

        // Summary paragraph, paginated when it overflows
        if let Some(summary) = data.summary.as_deref().filter(|s| !s.is_empty()) {
            current_y -= 14.0;
            layer.use_text("Summary", 13.0, Mm(LEFT_MARGIN), Mm(current_y), &font_bold);
            current_y -= 8.0;

            for line in self.wrap_text(summary, 95) {
                if current_y < BOTTOM_MARGIN {
                    let (page, new_layer) = doc.add_page(
                        Mm(PAGE_WIDTH),
                        Mm(PAGE_HEIGHT),
                        format!("Layer {}", pages.len() + 1),
                    );
                    pages.push((page, new_layer));
                    layer = doc.get_page(page).get_layer(new_layer);
                    current_y = PAGE_HEIGHT - 30.0;
                    layer.use_text(
                        "Summary (continued)",
                        11.0,
                        Mm(LEFT_MARGIN),
                        Mm(current_y),
                        &font_bold,
                    );
                    current_y -= 8.0;
                }
                layer.use_text(&line, 10.0, Mm(LEFT_MARGIN), Mm(current_y), &font_regular);
                current_y -= 5.0;
            }
        }

        // Disclaimer block
        if current_y < BOTTOM_MARGIN + 25.0 {
            let (page, new_layer) = doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Layer {}", pages.len() + 1),
            );
            pages.push((page, new_layer));
            layer = doc.get_page(page).get_layer(new_layer);
            current_y = PAGE_HEIGHT - 30.0;
        }
        current_y -= 12.0;
        layer.set_fill_color(Color::Rgb(Rgb::new(0.35, 0.35, 0.35, None)));
        for line in self.wrap_text(DISCLAIMER, 105) {
            layer.use_text(&line, 8.0, Mm(LEFT_MARGIN), Mm(current_y), &font_regular);
            current_y -= 4.0;
        }
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

        // Footer with page numbers on every page
        let total = pages.len();
        for (index, (page, layer_index)) in pages.iter().enumerate() {
            let footer_layer = doc.get_page(*page).get_layer(*layer_index);
            footer_layer.use_text(
                &format!("Page {} of {}", index + 1, total),
                9.0,
                Mm(PAGE_WIDTH / 2.0 - 10.0),
                Mm(12.0),
                &font_regular,
            );
        }

        let mut buffer = BufWriter::new(Vec::new());
        doc.save(&mut buffer)?;
        Ok(buffer.into_inner()?)
    }

    fn risk_color(&self, risk: Option<&str>) -> Rgb {
        match risk {
            Some("Green") => Rgb::new(0.13, 0.55, 0.29, None),
            Some("Yellow") => Rgb::new(0.85, 0.65, 0.13, None),
            Some("Red") => Rgb::new(0.77, 0.19, 0.19, None),
            _ => Rgb::new(0.45, 0.45, 0.50, None),
        }
    }

    fn filled_rect(&self, layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        layer.set_fill_color(Color::Rgb(color));
        let ring = vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y + height)), false),
            (Point::new(Mm(x), Mm(y + height)), false),
        ];
        layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    /// Wrap text to fit within specified character width
    fn wrap_text(&self, text: &str, max_chars: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current_line = String::new();

        for word in text.split_whitespace() {
            if current_line.len() + word.len() + 1 > max_chars {
                if !current_line.is_empty() {
                    lines.push(current_line.clone());
                    current_line.clear();
                }
            }

            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> CareerBriefData {
        CareerBriefData {
            full_name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: None,
            location: Some("Austin, TX".to_string()),
            summary: Some("Enterprise AE with a consistent quota record.".to_string()),
            career_consistency_score: 22,
            skill_proof_score: 20,
            role_alignment_score: 18,
            professional_presence_score: 12,
            data_completeness_score: 13,
            trust_score: 85,
            risk_level: Some("Green".to_string()),
        }
    }

    #[test]
    fn test_generates_nonempty_pdf() {
        let service = CareerBriefService::new();
        let bytes = service.generate(&sample_data()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn test_long_summary_paginates() {
        let service = CareerBriefService::new();
        let mut data = sample_data();
        data.summary = Some("Closed seven-figure renewals. ".repeat(300));
        let bytes = service.generate(&data).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_missing_summary_and_risk_still_renders() {
        let service = CareerBriefService::new();
        let mut data = sample_data();
        data.summary = None;
        data.risk_level = None;
        let bytes = service.generate(&data).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let service = CareerBriefService::new();
        let lines = service.wrap_text("one two three four five six seven eight", 12);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 12));
    }
}
