use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tipo de material reciclable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapType {
    Metal,
    Paper,
    Plastic,
    Glass,
    Ewaste,
}

impl ScrapType {
    pub const ALL: [ScrapType; 5] = [
        ScrapType::Metal,
        ScrapType::Paper,
        ScrapType::Plastic,
        ScrapType::Glass,
        ScrapType::Ewaste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapType::Metal => "metal",
            ScrapType::Paper => "paper",
            ScrapType::Plastic => "plastic",
            ScrapType::Glass => "glass",
            ScrapType::Ewaste => "ewaste",
        }
    }

    /// Etiqueta visible para el usuario
    pub fn label(&self) -> &'static str {
        match self {
            ScrapType::Metal => "Metal",
            ScrapType::Paper => "Paper",
            ScrapType::Plastic => "Plastic",
            ScrapType::Glass => "Glass",
            ScrapType::Ewaste => "E-Waste",
        }
    }

    /// Familia de color del badge en la consola
    pub fn tone(&self) -> &'static str {
        match self {
            ScrapType::Metal => "gray",
            ScrapType::Paper => "amber",
            ScrapType::Plastic => "blue",
            ScrapType::Glass => "green",
            ScrapType::Ewaste => "purple",
        }
    }
}

impl fmt::Display for ScrapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScrapType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown scrap type '{}'", s))
    }
}

/// Imagen codificada como data URL (`data:image/<tipo>;base64,<payload>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageBlob(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageBlobError {
    #[error("image must be a base64 data URL with an image/* media type")]
    NotAnImageDataUrl,
    #[error("image payload is not valid base64")]
    InvalidPayload,
    #[error("image is empty")]
    Empty,
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

impl ImageBlob {
    /// Valida el data URL y el tamaño decodificado
    pub fn parse(data_url: &str, max_bytes: usize) -> Result<Self, ImageBlobError> {
        let rest = data_url
            .strip_prefix("data:image/")
            .ok_or(ImageBlobError::NotAnImageDataUrl)?;
        let (media, payload) = rest
            .split_once(',')
            .ok_or(ImageBlobError::NotAnImageDataUrl)?;
        if !media.ends_with(";base64") || media.len() == ";base64".len() {
            return Err(ImageBlobError::NotAnImageDataUrl);
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| ImageBlobError::InvalidPayload)?;
        if bytes.is_empty() {
            return Err(ImageBlobError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(ImageBlobError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        Ok(Self(data_url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Un tipo de material dentro de una solicitud
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapItem {
    #[serde(rename = "type")]
    pub scrap_type: ScrapType,
    /// Se guarda como número JSON; también se aceptan registros con texto
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
    #[serde(default)]
    pub images: Vec<ImageBlob>,
}

impl ScrapItem {
    pub fn empty(scrap_type: ScrapType) -> Self {
        Self {
            scrap_type,
            weight: Decimal::ZERO,
            images: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_scrap_type_serde_is_lowercase() {
        let json = serde_json::to_string(&ScrapType::Ewaste).unwrap();
        assert_eq!(json, "\"ewaste\"");
        let parsed: ScrapType = serde_json::from_str("\"plastic\"").unwrap();
        assert_eq!(parsed, ScrapType::Plastic);
        assert!(serde_json::from_str::<ScrapType>("\"wood\"").is_err());
    }

    #[test]
    fn test_labels_and_tones_cover_every_type() {
        for t in ScrapType::ALL {
            assert!(!t.label().is_empty());
            assert!(!t.tone().is_empty());
            assert_eq!(t.as_str().parse::<ScrapType>().unwrap(), t);
        }
        assert_eq!(ScrapType::Ewaste.label(), "E-Waste");
    }

    #[test]
    fn test_image_blob_parse() {
        assert!(ImageBlob::parse(PIXEL, 1024).is_ok());
        assert_eq!(
            ImageBlob::parse("https://example.com/a.png", 1024),
            Err(ImageBlobError::NotAnImageDataUrl)
        );
        assert_eq!(
            ImageBlob::parse("data:image/png;base64,@@@", 1024),
            Err(ImageBlobError::InvalidPayload)
        );
        assert!(matches!(
            ImageBlob::parse(PIXEL, 2),
            Err(ImageBlobError::TooLarge { limit: 2, .. })
        ));
    }

    #[test]
    fn test_scrap_item_wire_format() {
        let item = ScrapItem::empty(ScrapType::Metal);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "metal");
        assert!(value["images"].as_array().unwrap().is_empty());

        let item = ScrapItem {
            weight: Decimal::new(105, 1),
            ..ScrapItem::empty(ScrapType::Glass)
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["weight"].as_f64(), Some(10.5));
    }

    #[test]
    fn test_scrap_item_reads_numeric_and_text_weights() {
        let numeric: ScrapItem = serde_json::from_str(r#"{"type":"metal","weight":4}"#).unwrap();
        assert_eq!(numeric.weight, Decimal::new(4, 0));

        let text: ScrapItem = serde_json::from_str(r#"{"type":"metal","weight":"2.5","images":[]}"#).unwrap();
        assert_eq!(text.weight, Decimal::new(25, 1));
    }
}
