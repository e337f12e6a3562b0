//! Leaf ID Common Library
//!
//! CLIと各ビューで共有される型とロジック（I/Oなし）

pub mod arboretum;
pub mod collection;
pub mod error;
pub mod flow;
pub mod geocode;
pub mod parser;
pub mod prompts;
pub mod tabs;
pub mod types;

pub use arboretum::{located, map_center, map_pins, BoundingBox, MapPin, FALLBACK_CENTER};
pub use collection::{
    decode_collection, encode_collection, find_by_id, newest_first, next_record_id, API_KEY_KEY,
    COLLECTION_KEY, COLLECTION_UPDATED_EVENT, LARGE_IMAGE_WARN_CHARS, STORE_CAPACITY_BYTES,
};
pub use error::{Error, Result};
pub use flow::{CaptureFlow, CaptureState};
pub use geocode::{place_label_from_body, select_place_label, ReverseResponse, UNKNOWN_LOCATION};
pub use parser::{extract_json_object, parse_identification, FallbackDefaults, ParsedIdentification};
pub use prompts::PromptVariant;
pub use tabs::{Swipe, Tab};
pub use types::{
    Coordinates, SaveOutcome, SavedSpecimen, Specimen, SpecimenField, LOCATION_NOT_AVAILABLE,
};
