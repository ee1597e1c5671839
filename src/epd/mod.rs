//! Catalog of supported e-paper displays and their ETA layouts

use thiserror::Error;

use crate::eta::EtaFormat;
use crate::ui::title_case;

/// Placeholder option shown before a brand is picked
pub const BRAND_PLACEHOLDER: &str = "-";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown e-paper brand: {0}")]
    UnknownBrand(String),
    #[error("unknown {brand} model: {model}")]
    UnknownModel { brand: String, model: String },
}

struct ModelSpec {
    name: &'static str,
    /// Layouts per ETA format. Models without a renderer have none.
    layouts: &'static [(EtaFormat, &'static [&'static str])],
}

struct BrandSpec {
    name: &'static str,
    models: &'static [ModelSpec],
}

const CATALOG: &[BrandSpec] = &[BrandSpec {
    name: "waveshare",
    models: &[
        ModelSpec {
            name: "epd1in54",
            layouts: &[],
        },
        ModelSpec {
            name: "epd3in7",
            layouts: &[
                (EtaFormat::Mixed, &["row_6_eta_1", "row_6_eta_3"]),
                (EtaFormat::Relative, &["row_6_eta_1"]),
                (EtaFormat::Absolute, &["row_6_eta_2"]),
            ],
        },
        ModelSpec {
            name: "epd4in2b_V2",
            layouts: &[],
        },
    ],
}];

fn find_brand(brand: &str) -> Option<&'static BrandSpec> {
    CATALOG.iter().find(|b| b.name == brand)
}

pub fn brands() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|b| b.name)
}

/// Models of `brand`; empty for an unknown brand
pub fn models(brand: &str) -> Vec<&'static str> {
    find_brand(brand)
        .map(|b| b.models.iter().map(|m| m.name).collect())
        .unwrap_or_default()
}

/// Layouts a model can render for the given ETA format
pub fn layouts(
    brand: &str,
    model: &str,
    format: EtaFormat,
) -> Result<Vec<&'static str>, CatalogError> {
    let brand_spec =
        find_brand(brand).ok_or_else(|| CatalogError::UnknownBrand(brand.to_string()))?;
    let model_spec = brand_spec
        .models
        .iter()
        .find(|m| m.name == model)
        .ok_or_else(|| CatalogError::UnknownModel {
            brand: brand.to_string(),
            model: model.to_string(),
        })?;

    Ok(model_spec
        .layouts
        .iter()
        .filter(|(f, _)| *f == format)
        .flat_map(|(_, names)| names.iter().copied())
        .collect())
}

/// `(value, label)` options for the brand select
pub fn brand_choices() -> Vec<(String, String)> {
    std::iter::once((BRAND_PLACEHOLDER.to_string(), "Please Select".to_string()))
        .chain(brands().map(|b| (b.to_string(), title_case(b))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models() {
        assert_eq!(models("waveshare"), vec!["epd1in54", "epd3in7", "epd4in2b_V2"]);
        assert!(models("pimoroni").is_empty());
    }

    #[test]
    fn test_layouts() {
        assert_eq!(
            layouts("waveshare", "epd3in7", EtaFormat::Mixed),
            Ok(vec!["row_6_eta_1", "row_6_eta_3"])
        );
        assert_eq!(layouts("waveshare", "epd1in54", EtaFormat::Mixed), Ok(vec![]));
        assert_eq!(
            layouts("waveshare", "epd9in9", EtaFormat::Mixed),
            Err(CatalogError::UnknownModel {
                brand: "waveshare".into(),
                model: "epd9in9".into()
            })
        );
        assert!(matches!(
            layouts("acme", "epd3in7", EtaFormat::Absolute),
            Err(CatalogError::UnknownBrand(_))
        ));
    }

    #[test]
    fn test_brand_choices_are_title_cased() {
        let choices = brand_choices();
        assert_eq!(choices[0].0, BRAND_PLACEHOLDER);
        assert_eq!(choices[1], ("waveshare".to_string(), "Waveshare".to_string()));
    }
}
