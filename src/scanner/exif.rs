use leaf_id_common::Coordinates;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn extract_date(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let exif = read_exif(path)?;

    // DateTimeOriginal を探す
    if let Some(field) = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY) {
        return Ok(field.display_value().to_string());
    }

    // DateTime を探す
    if let Some(field) = exif.get_field(exif::Tag::DateTime, exif::In::PRIMARY) {
        return Ok(field.display_value().to_string());
    }

    Err("No date found in EXIF".into())
}

/// EXIFのGPS位置（度・分・秒 + N/S, E/W）
pub fn extract_gps(path: &Path) -> Result<Coordinates, Box<dyn std::error::Error>> {
    let exif = read_exif(path)?;

    let latitude = gps_degrees(&exif, exif::Tag::GPSLatitude, exif::Tag::GPSLatitudeRef, b'S')
        .ok_or("No GPS latitude in EXIF")?;
    let longitude = gps_degrees(&exif, exif::Tag::GPSLongitude, exif::Tag::GPSLongitudeRef, b'W')
        .ok_or("No GPS longitude in EXIF")?;

    Ok(Coordinates::new(latitude, longitude))
}

fn read_exif(path: &Path) -> Result<exif::Exif, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);
    let exif_reader = exif::Reader::new();
    Ok(exif_reader.read_from_container(&mut bufreader)?)
}

fn gps_degrees(exif: &exif::Exif, tag: exif::Tag, ref_tag: exif::Tag, negative: u8) -> Option<f64> {
    let field = exif.get_field(tag, exif::In::PRIMARY)?;
    let exif::Value::Rational(ref parts) = field.value else {
        return None;
    };
    let dms: Vec<f64> = parts.iter().map(|r| r.to_f64()).collect();
    let degrees = dms_to_degrees(&dms)?;

    let is_negative = exif
        .get_field(ref_tag, exif::In::PRIMARY)
        .and_then(|f| match f.value {
            exif::Value::Ascii(ref v) => v.first().and_then(|s| s.first().copied()),
            _ => None,
        })
        .map(|c| c.to_ascii_uppercase() == negative)
        .unwrap_or(false);

    Some(if is_negative { -degrees } else { degrees })
}

/// [度, 分, 秒] → 十進の度
pub fn dms_to_degrees(dms: &[f64]) -> Option<f64> {
    let degrees = *dms.first()?;
    let minutes = dms.get(1).copied().unwrap_or(0.0);
    let seconds = dms.get(2).copied().unwrap_or(0.0);
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms_to_degrees() {
        let value = dms_to_degrees(&[34.0, 36.0, 13.32]).unwrap();
        assert!((value - 34.6037).abs() < 1e-6);
        assert_eq!(dms_to_degrees(&[12.5]), Some(12.5));
        assert_eq!(dms_to_degrees(&[]), None);
        assert_eq!(dms_to_degrees(&[f64::NAN]), None);
    }

    #[test]
    fn test_gps_from_non_image_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(extract_gps(&path).is_err());
        assert!(extract_date(&path).is_err());
    }
}
