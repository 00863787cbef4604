use crate::models::{ListingReference, PropertyRecord};
use chrono::Local;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Placeholder stored when a detail page has no additional-info section.
/// This is a deliberate literal value, not an absent field.
const NO_ADDITIONAL_INFO: &str = "No especificada";

/// A field located in two steps: a labeled node found by (tag, classes,
/// exact caption), then the nearest following node matching (tag, classes).
struct LabeledField {
    label_tag: &'static str,
    label_classes: &'static [&'static str],
    caption: &'static str,
    value_tag: &'static str,
    value_classes: &'static [&'static str],
}

const FLOOR_TYPE: LabeledField = LabeledField {
    label_tag: "div",
    label_classes: &["text-left", "titulo"],
    caption: "Tipo de Piso",
    value_tag: "span",
    value_classes: &["attr-name", "text"],
};

const KITCHEN_TYPE: LabeledField = LabeledField {
    label_tag: "div",
    label_classes: &["text-left", "titulo"],
    caption: "Cocina",
    value_tag: "span",
    value_classes: &["attr-name", "text"],
};

const LAUNDRY_AREA: LabeledField = LabeledField {
    label_tag: "div",
    label_classes: &["attr-name", "titulo"],
    caption: "Zona de ropa",
    value_tag: "span",
    value_classes: &["attr-value", "text"],
};

const GARAGE: LabeledField = LabeledField {
    label_tag: "div",
    label_classes: &["attr-name", "titulo"],
    caption: "Garaje",
    value_tag: "span",
    value_classes: &["attr-value", "text"],
};

/// Pulls one structured property record out of a parsed detail document.
/// Every field is attempted independently; a missing structural element
/// leaves that field absent instead of failing the extraction.
pub struct FieldExtractor {
    any_element: Selector,
    anchor: Selector,
    script: Selector,
    reference: Selector,
    stratum: Selector,
    sector: Selector,
    price: Selector,
    area: Selector,
    info_title: Selector,
    latitude_re: Regex,
    longitude_re: Regex,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            any_element: Selector::parse("*").unwrap(),
            anchor: Selector::parse("a[href]").unwrap(),
            script: Selector::parse("script").unwrap(),
            reference: Selector::parse("li.list-group-item.property-code span.second").unwrap(),
            stratum: Selector::parse("li.list-group-item.estrato span.second").unwrap(),
            sector: Selector::parse("li.list-group-item.sector span.second").unwrap(),
            price: Selector::parse("li.list-group-item.precio span.second").unwrap(),
            area: Selector::parse("li.list-group-item.area span.second").unwrap(),
            info_title: Selector::parse("div.titulo-informacion").unwrap(),
            latitude_re: Regex::new(r"latitude\s*=\s*([\d.-]+);").unwrap(),
            longitude_re: Regex::new(r"longitude\s*=\s*([\d.-]+);").unwrap(),
        }
    }

    /// Build a record for one listing, stamping the query time with the
    /// local wall clock. Geocoded address fields start absent; the enricher
    /// fills them in when coordinates were found.
    pub fn extract(&self, document: &Html, reference: &ListingReference) -> PropertyRecord {
        let (latitude, longitude) = self.coordinates(document);

        PropertyRecord {
            url: reference.url.clone(),
            image_url: reference.image_url.clone(),
            queried_at: Local::now().naive_local(),
            reference: self.select_text(document, &self.reference),
            stratum: self.select_text(document, &self.stratum),
            sector: self.select_text(document, &self.sector),
            price: self.select_text(document, &self.price),
            area: self.select_text(document, &self.area),
            floor_type: self.labeled_value(document, &FLOOR_TYPE),
            kitchen_type: self.labeled_value(document, &KITCHEN_TYPE),
            laundry_area: self.labeled_value(document, &LAUNDRY_AREA),
            garage: self.labeled_value(document, &GARAGE),
            additional_info: self.additional_info(document),
            latitude,
            longitude,
            address: None,
            city: None,
            neighborhood: None,
            phone: self
                .find_link(document, |href| href.starts_with("tel:"))
                .map(|href| href.trim_start_matches("tel:").to_string()),
            whatsapp: self.find_link(document, |href| href.contains("web.whatsapp.com/send")),
            facebook: self.find_link(document, |href| href.contains("facebook.com")),
            instagram: self.find_link(document, |href| href.contains("instagram.com")),
            category: reference.category,
        }
    }

    fn select_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document.select(selector).next().map(collect_text)
    }

    /// Two-step lookup: the labeled node by exact caption, then the next
    /// element in document order matching the value shape. Absence at
    /// either step is a normal absent-field outcome.
    fn labeled_value(&self, document: &Html, field: &LabeledField) -> Option<String> {
        let mut past_label = false;
        for element in document.select(&self.any_element) {
            if !past_label {
                past_label = element_is(element, field.label_tag, field.label_classes)
                    && collect_text(element) == field.caption;
            } else if element_is(element, field.value_tag, field.value_classes) {
                return Some(collect_text(element));
            }
        }
        None
    }

    /// The titled free-text section. When the title is present, the body is
    /// the next sibling `div.text-informacion`; any other shape falls back
    /// to the placeholder.
    fn additional_info(&self, document: &Html) -> String {
        let Some(title) = document.select(&self.info_title).next() else {
            return NO_ADDITIONAL_INFO.to_string();
        };
        if !collect_text(title).contains("Información adicional del inmueble") {
            return NO_ADDITIONAL_INFO.to_string();
        }

        title
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| element_is(*sibling, "div", &["text-informacion"]))
            .map(collect_text)
            .unwrap_or_else(|| NO_ADDITIONAL_INFO.to_string())
    }

    /// Coordinates are embedded as `latitude = ...;` / `longitude = ...;`
    /// assignments in the first script that mentions latitude. Both must
    /// parse or neither is reported.
    fn coordinates(&self, document: &Html) -> (Option<f64>, Option<f64>) {
        let script_text = document
            .select(&self.script)
            .map(|s| s.text().collect::<String>())
            .find(|text| text.contains("latitude"));

        let Some(text) = script_text else {
            return (None, None);
        };

        let latitude = self
            .latitude_re
            .captures(&text)
            .and_then(|c| c[1].parse::<f64>().ok());
        let longitude = self
            .longitude_re
            .captures(&text)
            .and_then(|c| c[1].parse::<f64>().ok());

        match (latitude, longitude) {
            (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
            _ => (None, None),
        }
    }

    fn find_link(&self, document: &Html, matches: impl Fn(&str) -> bool) -> Option<String> {
        document
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| matches(href))
            .map(str::to_string)
    }
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn element_is(element: ElementRef<'_>, tag: &str, classes: &[&str]) -> bool {
    element.value().name() == tag
        && classes
            .iter()
            .all(|class| element.value().classes().any(|c| c == *class))
}
