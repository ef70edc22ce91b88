//! Detects height + weight text such as `5'10" 160lbs` or `178cm and 150 pounds`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

const CM_PER_FOOT: f64 = 30.48;
const CM_PER_INCH: f64 = 2.54;
const KG_PER_POUND: f64 = 0.453_592;

// Height token, up to 24 non-digit filler characters, then a weight with a pound suffix.
static MEASUREMENT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?ix)
        \b
        (?P<height>
            (?P<feet>\d)\s*(?:'|’|ft\.?|feet|foot)\s*
                (?:(?P<inches>\d{1,2})\s*(?:"|''|”|in\b|inches\b)?)?
          | (?P<cm>\d{2,3}(?:\.\d+)?)\s*cm\b
          | (?P<bare>\d{2,3})
        )
        [^\d]{0,24}?
        \b
        (?P<weight_raw>(?P<weight>\d{2,3}(?:\.\d+)?)\s*(?:pounds?|lbs?)\b)
        "#,
    )
    .ok()
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Height {
    FeetInches { feet: u8, inches: u8 },
    Centimetres(f64),
    /// Unitless number: read as centimetres from 100 up, inches below.
    Bare(u16),
}

impl Height {
    pub fn to_cm(self) -> f64 {
        match self {
            Self::FeetInches { feet, inches } => {
                f64::from(feet) * CM_PER_FOOT + f64::from(inches) * CM_PER_INCH
            }
            Self::Centimetres(cm) => cm,
            Self::Bare(value) if value >= 100 => f64::from(value),
            Self::Bare(value) => f64::from(value) * CM_PER_INCH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementMatch {
    pub raw: String,
    pub raw_height: String,
    pub raw_weight: String,
    pub height: Height,
    pub weight_lbs: f64,
}

impl MeasurementMatch {
    pub fn height_cm(&self) -> f64 {
        self.height.to_cm()
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_lbs * KG_PER_POUND
    }
}

pub fn is_sizing_request(message: &str) -> bool {
    detect_measurements(message).is_some()
}

/// Returns the leftmost height/weight match, if any.
pub fn detect_measurements(message: &str) -> Option<MeasurementMatch> {
    let pattern = MEASUREMENT_PATTERN.as_ref()?;
    let captures = pattern.captures(message)?;

    Some(MeasurementMatch {
        raw: captures.get(0)?.as_str().to_string(),
        raw_height: captures.name("height")?.as_str().trim().to_string(),
        raw_weight: captures.name("weight_raw")?.as_str().to_string(),
        height: parse_height(&captures)?,
        weight_lbs: captures.name("weight")?.as_str().parse::<f64>().ok()?,
    })
}

fn parse_height(captures: &Captures<'_>) -> Option<Height> {
    if let Some(feet) = captures.name("feet") {
        let inches = match captures.name("inches") {
            Some(inches) => inches.as_str().parse::<u8>().ok()?,
            None => 0,
        };
        return Some(Height::FeetInches {
            feet: feet.as_str().parse::<u8>().ok()?,
            inches,
        });
    }

    if let Some(cm) = captures.name("cm") {
        return cm.as_str().parse::<f64>().ok().map(Height::Centimetres);
    }

    captures
        .name("bare")
        .and_then(|bare| bare.as_str().parse::<u16>().ok())
        .map(Height::Bare)
}
