use crate::store_data::{SizeBucket, StorePolicyData};

use super::measurement::MeasurementMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRecommendation {
    Size(&'static str),
    /// No bucket, or more than one, contains both measurements.
    CustomFit,
}

impl SizeRecommendation {
    pub fn describe(self) -> String {
        match self {
            Self::Size(label) => format!("size {label}"),
            Self::CustomFit => {
                "no single size on our chart; contact support for a custom fit".to_string()
            }
        }
    }
}

pub fn recommend_size(
    store: &StorePolicyData,
    measurement: &MeasurementMatch,
) -> SizeRecommendation {
    resolve_bucket(&store.size_chart, measurement.height_cm(), measurement.weight_kg())
}

pub fn resolve_bucket(chart: &[SizeBucket], height_cm: f64, weight_kg: f64) -> SizeRecommendation {
    let mut candidates = chart.iter().filter(|bucket| {
        bucket.weight_range.contains(weight_kg) && bucket.height_range.contains(height_cm)
    });

    match (candidates.next(), candidates.next()) {
        (Some(bucket), None) => SizeRecommendation::Size(bucket.label),
        _ => SizeRecommendation::CustomFit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::measurement::detect_measurements;

    fn recommend(message: &str) -> SizeRecommendation {
        let store = StorePolicyData::standard();
        let measurement =
            detect_measurements(message).expect("message should contain measurements");
        recommend_size(&store, &measurement)
    }

    #[test]
    fn measurements_inside_one_bucket_pick_that_bucket() {
        assert_eq!(recommend("5'10\" 160lbs"), SizeRecommendation::Size("M"));
        assert_eq!(recommend("5'7 140 lbs"), SizeRecommendation::Size("S"));
        assert_eq!(recommend("6'0\" 176 lbs"), SizeRecommendation::Size("L"));
        assert_eq!(recommend("5'0 110 lbs"), SizeRecommendation::Size("XS"));
        assert_eq!(recommend("195cm 230 pounds"), SizeRecommendation::Size("XXL"));
    }

    #[test]
    fn every_bucket_midpoint_resolves_to_itself_when_unique() {
        let store = StorePolicyData::standard();
        for bucket in &store.size_chart {
            let height = f64::from(bucket.height_range.0 + bucket.height_range.1) / 2.0;
            let weight = f64::from(bucket.weight_range.0 + bucket.weight_range.1) / 2.0;
            let overlapping = store
                .size_chart
                .iter()
                .filter(|other| {
                    other.height_range.contains(height) && other.weight_range.contains(weight)
                })
                .count();

            if overlapping == 1 {
                assert_eq!(
                    resolve_bucket(&store.size_chart, height, weight),
                    SizeRecommendation::Size(bucket.label)
                );
            }
        }
    }

    #[test]
    fn overlapping_buckets_fall_back_to_custom_fit() {
        // 176 cm / ~77 kg sits inside both M and L.
        assert_eq!(recommend("176cm 170 lbs"), SizeRecommendation::CustomFit);
    }

    #[test]
    fn out_of_chart_measurements_fall_back_to_custom_fit() {
        assert_eq!(recommend("170cm 65 pounds"), SizeRecommendation::CustomFit);
        assert_eq!(recommend("7'2 350 lbs"), SizeRecommendation::CustomFit);
    }

    #[test]
    fn custom_fit_description_mentions_support() {
        assert!(SizeRecommendation::CustomFit.describe().contains("contact support"));
        assert_eq!(SizeRecommendation::Size("M").describe(), "size M");
    }
}
