use anyhow::Context;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

use crate::Result;

/// A web page the weather report was grounded on.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// The most recently fetched weather report. It is replaced wholesale on every successful fetch
/// and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub location: String,
    #[serde(deserialize_with = "temperature")]
    pub current_temp: f64,
    #[serde(deserialize_with = "temperature")]
    pub low_temp: f64,
    #[serde(deserialize_with = "temperature")]
    pub high_temp: f64,
    pub condition: String,
    pub comment: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_link: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl WeatherSnapshot {
    /// The snapshot shown when the weather service could not be reached and nothing better has
    /// been fetched yet.
    pub fn fallback(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            current_temp: 0.0,
            low_temp: 0.0,
            high_temp: 0.0,
            condition: "Cloudy".to_string(),
            comment: "날씨 정보를 불러올 수 없습니다.".to_string(),
            image_prompt: "A cute character standing in cloudy weather with grey sky background, \
                heavy clouds"
                .to_string(),
            news_link: None,
            sources: Vec::new(),
        }
    }

    pub fn kind(&self) -> WeatherKind {
        WeatherKind::from_condition(&self.condition)
    }
}

/// Accepts a JSON number or a numeric string such as `"18"` or `"18.5°C"`.
fn temperature<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Temperature {
        Number(f64),
        Text(String),
    }

    match Temperature::deserialize(deserializer)? {
        Temperature::Number(value) => Ok(value),
        Temperature::Text(text) => text
            .trim()
            .trim_end_matches(|c: char| c == '°' || c == 'C' || c == 'c')
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("'{text}' is not a temperature"))),
    }
}

/// A coarse classification of the free-text weather condition, used to pick an icon.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Rain,
    Snow,
    Cloudy,
    Sunny,
}

serde_plain::derive_display_from_serialize!(WeatherKind);

impl WeatherKind {
    pub fn from_condition(condition: &str) -> Self {
        let c = condition.to_lowercase();
        if c.contains("rain") || c.contains("shower") {
            WeatherKind::Rain
        } else if c.contains("snow") {
            WeatherKind::Snow
        } else if c.contains("cloud") || c.contains("overcast") {
            WeatherKind::Cloudy
        } else {
            WeatherKind::Sunny
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherKind::Rain => "🌧",
            WeatherKind::Snow => "❄",
            WeatherKind::Cloudy => "☁",
            WeatherKind::Sunny => "☀",
        }
    }
}

/// The weather fetch status: `idle -> loading -> {success, error}`, returning to `loading` each
/// time a new fetch cycle begins.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

serde_plain::derive_display_from_serialize!(WeatherStatus);

/// An image returned inline by the image generation service.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    mime_type: String,
    /// Base64 encoded image bytes, exactly as returned by the service.
    data: String,
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// A displayable `data:` URI for the image.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decodes the image bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .context("The generated image is not valid base64")
    }

    /// A file extension matching the MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}
