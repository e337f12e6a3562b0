//! 識別プロンプト
//!
//! エンドポイントのバリアントごとに固定の指示文を持つ:
//! - FieldLines: `FIELD: value` 行形式で返させる葉の識別プロンプト
//! - Json: JSONオブジェクトで返させる植物識別プロンプト

use serde::{Deserialize, Serialize};

/// `FIELD: value` 形式の葉識別プロンプト
pub const LEAF_PROMPT: &str = r#"Identify this tree leaf. Provide the following information in a structured format:

1. Common Name (just the name)
2. Scientific Name (just the name in italics format)
3. Native Region (where it's naturally from)
4. Key Properties (2-4 key characteristics as comma-separated tags like "Deciduous", "Cold hardy", "Fast growing")
5. Description (2 sentences about the tree's properties and characteristics)

Format your response exactly like this:
COMMON_NAME: [name]
SCIENTIFIC_NAME: [name]
NATIVE_REGION: [region]
PROPERTIES: [property1, property2, property3]
DESCRIPTION: [2 sentences]"#;

/// JSON形式の植物識別プロンプト
pub const PLANT_JSON_PROMPT: &str = r#"Identify this plant and return the result as JSON with these exact fields:
{
  "commonName": "Common name of the plant",
  "scientificName": "Scientific name in italics",
  "origin": "Geographic origin or native region",
  "properties": "2-4 key characteristics as comma-separated tags",
  "botanicalProperties": "Detailed medicinal, ecological, or botanical information (2-3 sentences)"
}"#;

/// エンドポイントのバリアント
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptVariant {
    /// 行形式（デフォルト）
    #[default]
    FieldLines,
    /// JSON形式
    Json,
}

impl PromptVariant {
    /// 指示文
    pub fn prompt(&self) -> &'static str {
        match self {
            PromptVariant::FieldLines => LEAF_PROMPT,
            PromptVariant::Json => PLANT_JSON_PROMPT,
        }
    }

    /// generationConfig.responseMimeType に指定する値
    pub fn response_mime_type(&self) -> Option<&'static str> {
        match self {
            PromptVariant::FieldLines => None,
            PromptVariant::Json => Some("application/json"),
        }
    }
}

impl std::str::FromStr for PromptVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lines" | "field-lines" | "fieldlines" | "text" => Ok(PromptVariant::FieldLines),
            "json" => Ok(PromptVariant::Json),
            _ => Err(format!("Unknown prompt variant: {}. Use lines or json", s)),
        }
    }
}

impl std::fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptVariant::FieldLines => write!(f, "lines"),
            PromptVariant::Json => write!(f, "json"),
        }
    }
}
