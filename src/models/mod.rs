use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Business type partition of the portal. Each category drives its own
/// pagination sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Venta")]
    Sale,
    #[serde(rename = "Arrendamiento")]
    Rent,
}

impl Category {
    /// Value of the `bussines_type` query parameter on listing pages.
    pub fn query_param(&self) -> &'static str {
        match self {
            Category::Sale => "Venta",
            Category::Rent => "Arrendar",
        }
    }

    /// Label persisted in the `Tipo` column.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Sale => "Venta",
            Category::Rent => "Arrendamiento",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimal record produced by the pagination stage, before detail
/// extraction. Field order is the column order of the intermediate CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingReference {
    #[serde(rename = "Índice Propiedad")]
    pub index: u32,
    #[serde(rename = "URL Propiedad")]
    pub url: String,
    #[serde(rename = "URL Imagen")]
    pub image_url: String,
    #[serde(rename = "Tipo")]
    pub category: Category,
}

/// Fully extracted data for one listing. Every field except `url` is
/// optional: absence means "not found on the page", not an error.
/// Field order is the column order of the historical CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    #[serde(rename = "URL Propiedad")]
    pub url: String,
    #[serde(rename = "URL Imagen")]
    pub image_url: String,
    #[serde(rename = "Fecha de Consulta", with = "consulta_timestamp")]
    pub queried_at: NaiveDateTime,
    #[serde(rename = "Referencia")]
    pub reference: Option<String>,
    #[serde(rename = "Estrato")]
    pub stratum: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Precio")]
    pub price: Option<String>,
    #[serde(rename = "Área")]
    pub area: Option<String>,
    #[serde(rename = "Tipo de Piso")]
    pub floor_type: Option<String>,
    #[serde(rename = "Cocina")]
    pub kitchen_type: Option<String>,
    #[serde(rename = "Zona de Ropa")]
    pub laundry_area: Option<String>,
    #[serde(rename = "Garaje")]
    pub garage: Option<String>,
    /// Free-text section body, or the literal placeholder "No especificada"
    /// when the section is missing.
    #[serde(rename = "Información adicional")]
    pub additional_info: String,
    #[serde(rename = "Latitud")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitud")]
    pub longitude: Option<f64>,
    #[serde(rename = "Dirección")]
    pub address: Option<String>,
    #[serde(rename = "Ciudad")]
    pub city: Option<String>,
    #[serde(rename = "Barrio")]
    pub neighborhood: Option<String>,
    #[serde(rename = "Teléfono")]
    pub phone: Option<String>,
    #[serde(rename = "WhatsApp")]
    pub whatsapp: Option<String>,
    #[serde(rename = "Facebook")]
    pub facebook: Option<String>,
    #[serde(rename = "Instagram")]
    pub instagram: Option<String>,
    #[serde(rename = "Tipo")]
    pub category: Category,
}

/// Serde adapter for the `Fecha de Consulta` column ("YYYY-MM-DD HH:MM:SS",
/// local wall-clock time).
mod consulta_timestamp {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_query_params_differ_from_labels_for_rent() {
        assert_eq!(Category::Sale.query_param(), "Venta");
        assert_eq!(Category::Rent.query_param(), "Arrendar");
        assert_eq!(Category::Rent.label(), "Arrendamiento");
    }

    #[test]
    fn listing_reference_serializes_spanish_headers() {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(ListingReference {
            index: 1,
            url: "https://example.com/p/1".into(),
            image_url: "https://example.com/i/1.jpg".into(),
            category: Category::Rent,
        })
        .unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("Índice Propiedad,URL Propiedad,URL Imagen,Tipo"));
        assert!(out.contains("Arrendamiento"));
    }
}
