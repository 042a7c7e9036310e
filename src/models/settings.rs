use serde::{Deserialize, Serialize};

/// Fixed id of the singleton settings document.
pub const SETTINGS_DOC_ID: &str = "global";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromotionSlot {
    pub title: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SiteSettings {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub promotion_board: Vec<PromotionSlot>,
    #[serde(default)]
    pub ads_enabled: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default = "default_true")]
    pub registration_open: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            id: SETTINGS_DOC_ID.to_string(),
            promotion_board: Vec::new(),
            ads_enabled: false,
            maintenance_mode: false,
            registration_open: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSiteSettings {
    pub promotion_board: Option<Vec<PromotionSlot>>,
    pub ads_enabled: Option<bool>,
    pub maintenance_mode: Option<bool>,
    pub registration_open: Option<bool>,
}
