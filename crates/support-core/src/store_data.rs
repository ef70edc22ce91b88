//! Static store reference data shared read-only by every request.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InclusiveRange(pub u16, pub u16);

impl InclusiveRange {
    pub fn contains(self, value: f64) -> bool {
        value >= f64::from(self.0) && value <= f64::from(self.1)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBucket {
    pub label: &'static str,
    /// Kilograms.
    pub weight_range: InclusiveRange,
    /// Centimetres.
    pub height_range: InclusiveRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingMethod {
    pub name: &'static str,
    pub time: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingPolicy {
    pub methods: Vec<ShippingMethod>,
    pub processing: &'static str,
    pub notes: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnPolicy {
    pub timeframe: &'static str,
    pub conditions: Vec<&'static str>,
    pub process: Vec<&'static str>,
}

/// Calibration example handed to the sizing prompt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitReference {
    pub model_name: &'static str,
    pub height_display: &'static str,
    pub height_cm: u16,
    pub weight_display: &'static str,
    pub weight_kg: u16,
    pub size: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePolicyData {
    pub shipping: ShippingPolicy,
    pub returns: ReturnPolicy,
    pub size_chart: Vec<SizeBucket>,
    pub fit_reference: FitReference,
}

impl StorePolicyData {
    pub fn standard() -> Self {
        Self {
            shipping: ShippingPolicy {
                methods: vec![
                    ShippingMethod {
                        name: "Canada Standard",
                        time: "5-10 business days",
                    },
                    ShippingMethod {
                        name: "US Standard",
                        time: "5-10 business days",
                    },
                    ShippingMethod {
                        name: "Australia and UK",
                        time: "10-18 business days",
                    },
                    ShippingMethod {
                        name: "Rest of World",
                        time: "10-22 business days",
                    },
                ],
                processing: "48 hours for in-stock items",
                notes: vec![
                    "Please double-check your shipping address before ordering",
                    "We're not responsible for customs fees",
                    "Tracking provided for all orders",
                ],
            },
            returns: ReturnPolicy {
                timeframe: "14 days",
                conditions: vec![
                    "Items must be in original condition",
                    "Must be unworn",
                    "All tags must be attached",
                ],
                process: vec![
                    "Contact via email before shipping returns",
                    "Use Return Portal",
                    "Ship to provided return address",
                ],
            },
            size_chart: vec![
                bucket("XS", (45, 60), (150, 165)),
                bucket("S", (55, 70), (160, 175)),
                bucket("M", (65, 80), (170, 180)),
                bucket("L", (75, 90), (175, 185)),
                bucket("XL", (85, 100), (180, 190)),
                bucket("XXL", (95, 120), (185, 200)),
            ],
            fit_reference: FitReference {
                model_name: "Jake",
                height_display: "6'0\"",
                height_cm: 183,
                weight_display: "176 lbs",
                weight_kg: 80,
                size: "L",
            },
        }
    }

    /// Pretty JSON snapshot embedded in prompts.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn size_chart_table(&self) -> String {
        let mut table = String::from("Size | Weight (kg) | Height (cm)\n");
        for bucket in &self.size_chart {
            table.push_str(&format!(
                "{} | {}-{} | {}-{}\n",
                bucket.label,
                bucket.weight_range.0,
                bucket.weight_range.1,
                bucket.height_range.0,
                bucket.height_range.1
            ));
        }
        table
    }
}

fn bucket(label: &'static str, weight: (u16, u16), height: (u16, u16)) -> SizeBucket {
    SizeBucket {
        label,
        weight_range: InclusiveRange(weight.0, weight.1),
        height_range: InclusiveRange(height.0, height.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_inclusive_at_both_ends() {
        let range = InclusiveRange(65, 80);
        assert!(range.contains(65.0));
        assert!(range.contains(80.0));
        assert!(!range.contains(80.01));
        assert!(!range.contains(64.9));
    }

    #[test]
    fn size_chart_table_lists_every_bucket_in_order() {
        let data = StorePolicyData::standard();
        let table = data.size_chart_table();
        let rows = table.lines().skip(1).collect::<Vec<_>>();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], "XS | 45-60 | 150-165");
        assert_eq!(rows[5], "XXL | 95-120 | 185-200");
    }

    #[test]
    fn fit_reference_sits_in_exactly_its_own_bucket() {
        let data = StorePolicyData::standard();
        let reference = &data.fit_reference;
        let matches = data
            .size_chart
            .iter()
            .filter(|bucket| {
                bucket.weight_range.contains(f64::from(reference.weight_kg))
                    && bucket.height_range.contains(f64::from(reference.height_cm))
            })
            .map(|bucket| bucket.label)
            .collect::<Vec<_>>();

        assert_eq!(matches, vec![reference.size]);
    }

    #[test]
    fn prompt_json_includes_policies_and_chart() {
        let encoded = StorePolicyData::standard().to_prompt_json();
        assert!(encoded.contains("\"timeframe\": \"14 days\""));
        assert!(encoded.contains("\"sizeChart\""));
        assert!(encoded.contains("\"weightRange\": [\n"));
    }
}
