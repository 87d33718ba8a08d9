use serde::{Deserialize, Serialize};

/// Full record for one pill, as served by the detail endpoint.
///
/// The backend keys this payload by its own localized field names, so every
/// field carries an explicit rename. All fields default to empty strings:
/// a partially filled record must render, never fail deserialization, and
/// an unrecognized code deserializes to the all-empty default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PillDetail {
    #[serde(default, rename = "품목명")]
    pub name: String,
    #[serde(default, rename = "업체명")]
    pub company: String,
    #[serde(default, rename = "효능")]
    pub effects: String,
    #[serde(default, rename = "사용법")]
    pub usage: String,
    #[serde(default, rename = "주의사항")]
    pub warnings: String,
    #[serde(default, rename = "부작용")]
    pub side_effects: String,
    #[serde(default, rename = "보관법")]
    pub storage: String,
    #[serde(default, rename = "이미지")]
    pub image_url: String,
    #[serde(default, rename = "표시앞")]
    pub imprint_front: String,
    #[serde(default, rename = "표시뒤")]
    pub imprint_back: String,
    #[serde(default, rename = "크기장축")]
    pub size_long: String,
    #[serde(default, rename = "크기단축")]
    pub size_short: String,
    #[serde(default, rename = "크기두께")]
    pub size_thick: String,
    #[serde(default, rename = "모양")]
    pub shape: String,
    #[serde(default, rename = "제형")]
    pub form: String,
    #[serde(default, rename = "색상앞")]
    pub color_front: String,
    #[serde(default, rename = "색상뒤")]
    pub color_back: String,
}
