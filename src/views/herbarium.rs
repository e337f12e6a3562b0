//! ハーバリウム（保存済み標本の一覧）

use leaf_id_common::{newest_first, SavedSpecimen};
use std::fmt::Write;

pub fn render_herbarium(records: &[SavedSpecimen]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🌿 Herbarium ({} specimens)", records.len());

    if records.is_empty() {
        let _ = writeln!(out, "\n  No specimens yet. Scan a leaf to start your collection.");
        return out;
    }

    let _ = writeln!(out);
    for record in newest_first(records) {
        let _ = writeln!(
            out,
            "  #{:<14} {} ({})",
            record.id, record.specimen.common_name, record.specimen.scientific_name
        );
        let _ = writeln!(
            out,
            "  {:15} 📍 {} | 📅 {}",
            "",
            record.location,
            super::display_date(&record.timestamp)
        );
    }
    out
}
