//! 識別レスポンスパーサー
//!
//! モデルの出力は構造化が保証されないため、取れる項目だけを拾い、
//! 欠けた項目はバリアントごとのデフォルト値で埋める。パース自体は失敗しない。
//!
//! 抽出優先順位（項目ごと）:
//! 1. テキスト中の最初の `{` から最後の `}` までのJSONオブジェクト
//! 2. `KEY: value` 行（最初のコロンで分割）
//! 3. "Common Name:" のようなラベル（大文字小文字無視、装飾記号除去）
//! 4. デフォルト値

use crate::prompts::PromptVariant;
use crate::types::{Specimen, SpecimenField};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 欠損項目のデフォルト値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackDefaults {
    pub common_name: &'static str,
    pub scientific_name: &'static str,
    pub native_region: &'static str,
    pub properties: &'static [&'static str],
    pub description: &'static str,
}

/// 特徴タグのデフォルト（両バリアント共通）
pub const DEFAULT_PROPERTIES: &[&str] = &["Deciduous", "Native species"];

impl FallbackDefaults {
    pub const FIELD_LINES: FallbackDefaults = FallbackDefaults {
        common_name: "Unknown Tree",
        scientific_name: "Species unknown",
        native_region: "Unknown region",
        properties: DEFAULT_PROPERTIES,
        description: "Properties unavailable",
    };

    pub const JSON: FallbackDefaults = FallbackDefaults {
        common_name: "Unknown Plant",
        scientific_name: "Unknown Species",
        native_region: "Unknown Origin",
        properties: DEFAULT_PROPERTIES,
        description: "Botanical information being processed...",
    };

    pub fn for_variant(variant: PromptVariant) -> Self {
        match variant {
            PromptVariant::FieldLines => Self::FIELD_LINES,
            PromptVariant::Json => Self::JSON,
        }
    }
}

/// パース結果（全項目埋まっている）と、デフォルトを使った項目の一覧
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIdentification {
    pub common_name: String,
    pub scientific_name: String,
    pub native_region: String,
    pub properties: Vec<String>,
    pub description: String,
    pub defaulted: Vec<SpecimenField>,
}

impl ParsedIdentification {
    pub fn is_defaulted(&self, field: SpecimenField) -> bool {
        self.defaulted.contains(&field)
    }

    /// 画像を付けて標本にする
    pub fn into_specimen(self, image: String) -> Specimen {
        Specimen {
            common_name: self.common_name,
            scientific_name: self.scientific_name,
            native_region: self.native_region,
            properties: self.properties,
            description: self.description,
            image,
        }
    }
}

/// テキストからJSONオブジェクト部分を抽出
///
/// 最初の `{` から最後の `}` まで。見つからなければ None。
///
/// # Examples
/// ```
/// use leaf_id_common::extract_json_object;
///
/// let text = "Sure! {\"commonName\": \"Oak\"} Hope this helps.";
/// assert_eq!(extract_json_object(text), Some("{\"commonName\": \"Oak\"}"));
/// ```
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// `KEY: value` 行をマップに集める
///
/// 空行・コロンなし行・ラベルが空の行は無視。同じキーは後勝ち。
pub fn parse_field_lines(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), value.trim().to_string());
    }

    map
}

/// 識別レスポンスをパース（欠損はデフォルトで補完）
pub fn parse_identification(text: &str, variant: PromptVariant) -> ParsedIdentification {
    let defaults = FallbackDefaults::for_variant(variant);
    let json = extract_json_object(text).and_then(|s| {
        match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    });
    let lines = parse_field_lines(text);
    let mut defaulted = Vec::new();

    let mut text_field = |field: SpecimenField, default: &str| -> String {
        match lookup_text(field, json.as_ref(), &lines, text) {
            Some(value) => value,
            None => {
                defaulted.push(field);
                default.to_string()
            }
        }
    };

    let common_name = text_field(SpecimenField::CommonName, defaults.common_name);
    let scientific_name = text_field(SpecimenField::ScientificName, defaults.scientific_name);
    let native_region = text_field(SpecimenField::NativeRegion, defaults.native_region);

    let properties = match lookup_properties(json.as_ref(), &lines, text) {
        Some(tags) => tags,
        None => {
            defaulted.push(SpecimenField::Properties);
            defaults.properties.iter().map(|s| s.to_string()).collect()
        }
    };

    let description = match lookup_text(SpecimenField::Description, json.as_ref(), &lines, text) {
        Some(value) => value,
        None => {
            defaulted.push(SpecimenField::Description);
            defaults.description.to_string()
        }
    };

    ParsedIdentification {
        common_name,
        scientific_name,
        native_region,
        properties,
        description,
        defaulted,
    }
}

/// JSON側で受け付けるキー
fn json_keys(field: SpecimenField) -> &'static [&'static str] {
    match field {
        SpecimenField::CommonName => &["commonName", "common_name", "COMMON_NAME"],
        SpecimenField::ScientificName => &["scientificName", "scientific_name", "SCIENTIFIC_NAME"],
        SpecimenField::NativeRegion => &["nativeRegion", "origin", "native_region", "NATIVE_REGION"],
        SpecimenField::Properties => &["properties", "tags", "PROPERTIES"],
        SpecimenField::Description => &["description", "botanicalProperties", "DESCRIPTION"],
    }
}

/// 行形式のラベル
fn line_key(field: SpecimenField) -> &'static str {
    match field {
        SpecimenField::CommonName => "COMMON_NAME",
        SpecimenField::ScientificName => "SCIENTIFIC_NAME",
        SpecimenField::NativeRegion => "NATIVE_REGION",
        SpecimenField::Properties => "PROPERTIES",
        SpecimenField::Description => "DESCRIPTION",
    }
}

fn lookup_text(
    field: SpecimenField,
    json: Option<&Map<String, Value>>,
    lines: &HashMap<String, String>,
    text: &str,
) -> Option<String> {
    json.and_then(|map| json_keys(field).iter().find_map(|key| get_string(map, key)))
        .or_else(|| lines.get(line_key(field)).cloned().filter(|v| !v.is_empty()))
        .or_else(|| labeled_value(field, text))
}

fn lookup_properties(
    json: Option<&Map<String, Value>>,
    lines: &HashMap<String, String>,
    text: &str,
) -> Option<Vec<String>> {
    let from_json = json.and_then(|map| {
        json_keys(SpecimenField::Properties)
            .iter()
            .find_map(|key| get_tags(map, key))
    });
    if from_json.is_some() {
        return from_json;
    }

    lines
        .get(line_key(SpecimenField::Properties))
        .filter(|v| !v.is_empty())
        .map(|v| split_tags(v))
        .or_else(|| labeled_value(SpecimenField::Properties, text).map(|v| split_tags(&v)))
}

/// カンマ区切りタグを分割（各タグをtrim）
pub fn split_tags(value: &str) -> Vec<String> {
    value.split(',').map(|t| t.trim().to_string()).collect()
}

fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    let value = map.get(key)?;
    let s = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn get_tags(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match map.get(key)? {
        Value::Array(items) => {
            let tags: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .collect();
            if tags.is_empty() {
                None
            } else {
                Some(tags)
            }
        }
        Value::String(s) if !s.trim().is_empty() => Some(split_tags(s)),
        _ => None,
    }
}

/// ラベル表記（"Common Name:" 等）からの抽出
fn labeled_value(field: SpecimenField, text: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref COMMON_NAME_RE: Regex =
            Regex::new(r"(?im)^[ \t*_`#>\-\d.]*common[ _]name[*_` \t]*:[ \t]*(.+)$").unwrap();
        static ref SCIENTIFIC_NAME_RE: Regex =
            Regex::new(r"(?im)^[ \t*_`#>\-\d.]*scientific[ _]name[*_` \t]*:[ \t]*(.+)$").unwrap();
        static ref NATIVE_REGION_RE: Regex =
            Regex::new(r"(?im)^[ \t*_`#>\-\d.]*(?:native[ _]region|origin)[*_` \t]*:[ \t]*(.+)$").unwrap();
        static ref PROPERTIES_RE: Regex =
            Regex::new(r"(?im)^[ \t*_`#>\-\d.]*(?:key[ _])?properties[*_` \t]*:[ \t]*(.+)$").unwrap();
        static ref DESCRIPTION_RE: Regex =
            Regex::new(r"(?im)^[ \t*_`#>\-\d.]*description[*_` \t]*:[ \t]*(.+)$").unwrap();
    }

    let re: &Regex = match field {
        SpecimenField::CommonName => &COMMON_NAME_RE,
        SpecimenField::ScientificName => &SCIENTIFIC_NAME_RE,
        SpecimenField::NativeRegion => &NATIVE_REGION_RE,
        SpecimenField::Properties => &PROPERTIES_RE,
        SpecimenField::Description => &DESCRIPTION_RE,
    };

    let captured = re.captures(text)?.get(1)?.as_str();
    let cleaned = strip_markup(captured);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Markdown装飾（* _ `）を除去してtrim
fn strip_markup(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json_object テスト
    // =============================================

    #[test]
    fn test_extract_json_object_with_fence() {
        let text = "```json\n{\"commonName\": \"Oak\"}\n```";
        assert_eq!(extract_json_object(text), Some("{\"commonName\": \"Oak\"}"));
    }

    #[test]
    fn test_extract_json_object_spans_first_to_last_brace() {
        let text = r#"{"a": {"b": 1}} trailing"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn test_extract_json_object_missing() {
        assert_eq!(extract_json_object("COMMON_NAME: Oak"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
        assert_eq!(extract_json_object(""), None);
    }

    // =============================================
    // parse_field_lines テスト
    // =============================================

    #[test]
    fn test_parse_field_lines_splits_on_first_colon() {
        let map = parse_field_lines("DESCRIPTION: Ratio 1:2 leaves.\n\nNOTE no colon\n: empty key");
        assert_eq!(map.get("DESCRIPTION").map(String::as_str), Some("Ratio 1:2 leaves."));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_parse_field_lines_later_duplicate_wins() {
        let map = parse_field_lines("COMMON_NAME: Oak\nCOMMON_NAME: Red Oak");
        assert_eq!(map.get("COMMON_NAME").map(String::as_str), Some("Red Oak"));
    }

    #[test]
    fn test_parse_field_lines_trims_keys_and_values() {
        let map = parse_field_lines("  COMMON_NAME  :   Ginkgo   \r\n");
        assert_eq!(map.get("COMMON_NAME").map(String::as_str), Some("Ginkgo"));
    }

    // =============================================
    // parse_identification テスト
    // =============================================

    #[test]
    fn test_parse_full_field_lines_no_defaults() {
        let text = "COMMON_NAME: Paper Birch\nSCIENTIFIC_NAME: Betula papyrifera\nNATIVE_REGION: North America\nPROPERTIES: Deciduous, Cold hardy\nDESCRIPTION: A hardy tree.";

        let parsed = parse_identification(text, PromptVariant::FieldLines);
        assert_eq!(parsed.common_name, "Paper Birch");
        assert_eq!(parsed.scientific_name, "Betula papyrifera");
        assert_eq!(parsed.native_region, "North America");
        assert_eq!(parsed.properties, vec!["Deciduous", "Cold hardy"]);
        assert_eq!(parsed.description, "A hardy tree.");
        assert!(parsed.defaulted.is_empty());
    }

    #[test]
    fn test_parse_only_common_name_defaults_rest() {
        let parsed = parse_identification("COMMON_NAME: Oak", PromptVariant::FieldLines);
        assert_eq!(parsed.common_name, "Oak");
        assert_eq!(parsed.scientific_name, "Species unknown");
        assert_eq!(parsed.native_region, "Unknown region");
        assert_eq!(parsed.properties, vec!["Deciduous", "Native species"]);
        assert_eq!(parsed.description, "Properties unavailable");
        assert_eq!(
            parsed.defaulted,
            vec![
                SpecimenField::ScientificName,
                SpecimenField::NativeRegion,
                SpecimenField::Properties,
                SpecimenField::Description,
            ]
        );
        assert!(!parsed.is_defaulted(SpecimenField::CommonName));
    }

    #[test]
    fn test_parse_empty_text_defaults_everything() {
        let parsed = parse_identification("", PromptVariant::FieldLines);
        assert_eq!(parsed.common_name, "Unknown Tree");
        assert_eq!(parsed.defaulted.len(), 5);
    }

    #[test]
    fn test_parse_json_variant_defaults() {
        let parsed = parse_identification("I could not identify this.", PromptVariant::Json);
        assert_eq!(parsed.common_name, "Unknown Plant");
        assert_eq!(parsed.scientific_name, "Unknown Species");
        assert_eq!(parsed.native_region, "Unknown Origin");
        assert_eq!(parsed.properties, vec!["Deciduous", "Native species"]);
        assert_eq!(parsed.description, "Botanical information being processed...");
    }

    #[test]
    fn test_parse_json_object() {
        let text = r#"```json
{
  "commonName": "Yerba Mate",
  "scientificName": "Ilex paraguariensis",
  "origin": "South America",
  "botanicalProperties": "Leaves are brewed into mate. Rich in caffeine."
}
```"#;

        let parsed = parse_identification(text, PromptVariant::Json);
        assert_eq!(parsed.common_name, "Yerba Mate");
        assert_eq!(parsed.scientific_name, "Ilex paraguariensis");
        assert_eq!(parsed.native_region, "South America");
        assert_eq!(parsed.description, "Leaves are brewed into mate. Rich in caffeine.");
        assert_eq!(parsed.defaulted, vec![SpecimenField::Properties]);
    }

    #[test]
    fn test_parse_json_properties_array_and_string() {
        let parsed = parse_identification(
            r#"{"commonName": "Ceibo", "properties": ["Deciduous", " Red flowers "]}"#,
            PromptVariant::Json,
        );
        assert_eq!(parsed.properties, vec!["Deciduous", "Red flowers"]);

        let parsed = parse_identification(
            r#"{"commonName": "Ceibo", "properties": "Thorny, National flower"}"#,
            PromptVariant::Json,
        );
        assert_eq!(parsed.properties, vec!["Thorny", "National flower"]);
    }

    #[test]
    fn test_json_wins_over_lines() {
        let text = "COMMON_NAME: Line Oak\n{\"commonName\": \"Json Oak\"}";
        let parsed = parse_identification(text, PromptVariant::FieldLines);
        assert_eq!(parsed.common_name, "Json Oak");
    }

    #[test]
    fn test_invalid_json_falls_back_to_lines() {
        let text = "COMMON_NAME: Willow\nNOTE: {not json}";
        let parsed = parse_identification(text, PromptVariant::FieldLines);
        assert_eq!(parsed.common_name, "Willow");
    }

    #[test]
    fn test_empty_json_value_counts_as_missing() {
        let parsed = parse_identification(r#"{"commonName": "", "origin": null}"#, PromptVariant::Json);
        assert_eq!(parsed.common_name, "Unknown Plant");
        assert_eq!(parsed.native_region, "Unknown Origin");
    }

    #[test]
    fn test_empty_line_value_counts_as_missing() {
        let parsed = parse_identification("COMMON_NAME:\nPROPERTIES:", PromptVariant::FieldLines);
        assert_eq!(parsed.common_name, "Unknown Tree");
        assert_eq!(parsed.properties, vec!["Deciduous", "Native species"]);
    }

    #[test]
    fn test_labeled_free_text_path() {
        let text = "Here is what I found:\n**Common Name:** Silver Maple\n**Scientific Name:** *Acer saccharinum*\nOrigin: Eastern North America\nKey Properties: Deciduous, Fast growing";

        let parsed = parse_identification(text, PromptVariant::Json);
        assert_eq!(parsed.common_name, "Silver Maple");
        assert_eq!(parsed.scientific_name, "Acer saccharinum");
        assert_eq!(parsed.native_region, "Eastern North America");
        assert_eq!(parsed.properties, vec!["Deciduous", "Fast growing"]);
        assert_eq!(parsed.defaulted, vec![SpecimenField::Description]);
    }

    #[test]
    fn test_labeled_path_is_case_insensitive() {
        let parsed = parse_identification("1. common name: Linden", PromptVariant::FieldLines);
        assert_eq!(parsed.common_name, "Linden");
    }

    #[test]
    fn test_properties_keep_loose_split() {
        let parsed = parse_identification("PROPERTIES: Evergreen,  , Aromatic", PromptVariant::FieldLines);
        assert_eq!(parsed.properties, vec!["Evergreen", "", "Aromatic"]);
    }

    #[test]
    fn test_into_specimen_attaches_image() {
        let parsed = parse_identification("COMMON_NAME: Oak", PromptVariant::FieldLines);
        let specimen = parsed.into_specimen("data:image/png;base64,AAAA".to_string());
        assert_eq!(specimen.common_name, "Oak");
        assert_eq!(specimen.image, "data:image/png;base64,AAAA");
        assert_eq!(specimen.description, "Properties unavailable");
    }
}
