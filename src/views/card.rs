//! 標本カード

use leaf_id_common::{SaveOutcome, SavedSpecimen, Specimen};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────";

/// 画像の概要（Data URLそのものは長すぎるので出さない）
pub fn image_summary(image: &str) -> String {
    if image.is_empty() {
        return "(no image)".to_string();
    }
    let mime = crate::identify::extract_mime_type_from_data_url(image);
    format!("{} ({:.1} KB)", mime, image.len() as f64 / 1024.0)
}

fn write_body(out: &mut String, specimen: &Specimen) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  {}", specimen.common_name);
    let _ = writeln!(out, "  {}", specimen.scientific_name);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  Native region: {}", specimen.native_region);
    if !specimen.properties.is_empty() {
        let tags: Vec<String> = specimen.properties.iter().map(|p| format!("[{}]", p)).collect();
        let _ = writeln!(out, "  Properties:    {}", tags.join(" "));
    }
    let _ = writeln!(out, "  Image:         {}", image_summary(&specimen.image));
    let _ = writeln!(out);
    for line in wrap(&specimen.description, 60) {
        let _ = writeln!(out, "  {}", line);
    }
}

/// 識別結果カード
pub fn render_card(specimen: &Specimen) -> String {
    let mut out = String::new();
    write_body(&mut out, specimen);
    let _ = writeln!(out, "{}", RULE);
    out
}

/// 保存済み標本のカード（場所・日付付き）
pub fn render_saved_card(record: &SavedSpecimen) -> String {
    let mut out = String::new();
    write_body(&mut out, &record.specimen);
    let _ = writeln!(out);
    let _ = writeln!(out, "  📍 {}", record.location);
    if let Some(c) = record.coordinates {
        let _ = writeln!(out, "     {:.5}, {:.5}", c.latitude, c.longitude);
    }
    let _ = writeln!(out, "  📅 {}", super::display_date(&record.timestamp));
    let _ = writeln!(out, "  #{}", record.id);
    let _ = writeln!(out, "{}", RULE);
    out
}

/// 保存完了メッセージ
pub fn render_save_outcome(outcome: &SaveOutcome) -> String {
    let record = outcome.record();
    match outcome {
        SaveOutcome::SavedWithLocation(_) => {
            format!("✔ Saved to Herbarium! 📍 {}", record.location)
        }
        SaveOutcome::SavedWithoutLocation(_) => {
            format!("✔ Saved to Herbarium! ({})", record.location)
        }
    }
}

/// 単語単位の折り返し
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
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
    lines
}
