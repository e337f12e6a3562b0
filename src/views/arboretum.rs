//! アーボレタム（地図表示）
//!
//! 埋め込み地図のURLと、ピン位置を文字グリッドに落とした簡易マップを出す。

use leaf_id_common::{located, map_center, map_pins, BoundingBox, SavedSpecimen};
use std::fmt::Write;

const GRID_WIDTH: usize = 48;
const GRID_HEIGHT: usize = 16;

/// ピン位置（%）→ グリッド上の文字
pub fn render_grid(pins: &[(f64, f64)]) -> Vec<String> {
    let mut grid = vec![vec!['·'; GRID_WIDTH]; GRID_HEIGHT];

    for &(x, y) in pins {
        let col = ((x / 100.0) * (GRID_WIDTH - 1) as f64).round() as usize;
        let row = ((y / 100.0) * (GRID_HEIGHT - 1) as f64).round() as usize;
        let cell = &mut grid[row.min(GRID_HEIGHT - 1)][col.min(GRID_WIDTH - 1)];
        *cell = if *cell == '·' { '●' } else { '◉' };
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}

pub fn render_arboretum(records: &[SavedSpecimen]) -> String {
    let center = map_center(records);
    let bbox = BoundingBox::around(center);
    let pins = map_pins(records, center);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "🗺️  Arboretum ({} of {} specimens located)",
        located(records).len(),
        records.len()
    );
    let _ = writeln!(out, "  Center: {:.5}, {:.5}", center.latitude, center.longitude);
    let _ = writeln!(out, "  Map:    {}", bbox.embed_url());
    let _ = writeln!(out);

    let positions: Vec<(f64, f64)> = pins.iter().map(|p| (p.x_percent, p.y_percent)).collect();
    for line in render_grid(&positions) {
        let _ = writeln!(out, "  {}", line);
    }
    let _ = writeln!(out);

    if pins.is_empty() {
        let _ = writeln!(out, "  No specimens with location yet.");
    }
    for pin in &pins {
        let record = pin.specimen;
        let _ = writeln!(
            out,
            "  ● {} ({}) at {:.1}%, {:.1}% | 📍 {}",
            record.specimen.common_name,
            record.specimen.scientific_name,
            pin.x_percent,
            pin.y_percent,
            record.location
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use leaf_id_common::{Coordinates, Specimen};

    fn at(name: &str, coords: Option<Coordinates>) -> SavedSpecimen {
        SavedSpecimen {
            specimen: Specimen {
                common_name: name.to_string(),
                ..Default::default()
            },
            id: name.to_string(),
            coordinates: coords,
            location: "Somewhere".to_string(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_grid_places_pins() {
        let grid = render_grid(&[(0.0, 0.0), (100.0, 100.0), (100.0, 100.0)]);
        assert_eq!(grid.len(), GRID_HEIGHT);
        assert!(grid[0].starts_with('●'));
        assert!(grid[GRID_HEIGHT - 1].ends_with('◉'));
    }

    #[test]
    fn test_fallback_center_without_locations() {
        let out = render_arboretum(&[at("Oak", None)]);
        assert!(out.contains("(0 of 1 specimens located)"));
        assert!(out.contains("-34.60370, -58.38160"));
        assert!(out.contains("No specimens with location yet."));
    }

    #[test]
    fn test_lists_only_located() {
        let records = vec![
            at("Oak", Some(Coordinates::new(-34.6, -58.4))),
            at("Birch", None),
        ];
        let out = render_arboretum(&records);
        assert!(out.contains("(1 of 2 specimens located)"));
        assert!(out.contains("● Oak"));
        assert!(!out.contains("Birch"));
        assert!(out.contains("50.0%, 50.0%"));
    }
}
