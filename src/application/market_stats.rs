//! Descriptive market statistics: per-district price-per-m² summaries and
//! interquartile outlier filtering.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::application::detector::eligible_in_city;
use crate::domain::entities::property::PropertyRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::listing_provider::ListingProvider;

/// Default Tukey fence multiplier.
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;
/// Districts smaller than this are never outlier-filtered.
const MIN_OUTLIER_SAMPLE: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSummary {
    pub city: String,
    pub district: String,
    pub sample_count: usize,
    pub mean_price_per_area: f64,
    pub median_price_per_area: f64,
    pub min_price_per_area: f64,
    pub max_price_per_area: f64,
    /// Mean of the listings that report a yield; `None` if none do.
    pub mean_expected_yield: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub city: String,
    pub eligible_records: usize,
    pub skipped_records: usize,
    pub city_mean_price_per_area: Option<f64>,
    pub districts: Vec<DistrictSummary>,
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Districts are scoped to their city: "Centro" in two cities is two
/// districts.
type DistrictKey<'a> = (String, &'a str);

fn district_key(record: &PropertyRecord) -> DistrictKey<'_> {
    (record.city.trim().to_ascii_lowercase(), record.district.as_str())
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values
}

/// Summarize the eligible listings of `city` (all cities when blank).
pub fn summarize(records: &[PropertyRecord], city: &str) -> MarketSummary {
    let in_city = records
        .iter()
        .filter(|r| city.trim().is_empty() || r.city.trim().eq_ignore_ascii_case(city.trim()))
        .count();

    let mut by_district: BTreeMap<DistrictKey<'_>, Vec<&PropertyRecord>> = BTreeMap::new();
    let mut all_ppa = Vec::new();
    for (record, ppa) in eligible_in_city(records, city) {
        by_district.entry(district_key(record)).or_default().push(record);
        all_ppa.push(ppa);
    }

    let districts = by_district
        .into_iter()
        .filter_map(|((_, district), members)| {
            let values = sorted(members.iter().filter_map(|r| r.price_per_area()).collect());
            let yields: Vec<f64> = members.iter().filter_map(|r| r.expected_yield).collect();
            Some(DistrictSummary {
                city: members.first()?.city.trim().to_string(),
                district: district.to_string(),
                sample_count: values.len(),
                mean_price_per_area: mean(&values)?,
                median_price_per_area: quantile(&values, 0.5)?,
                min_price_per_area: *values.first()?,
                max_price_per_area: *values.last()?,
                mean_expected_yield: mean(&yields),
            })
        })
        .collect();

    MarketSummary {
        city: city.trim().to_string(),
        eligible_records: all_ppa.len(),
        skipped_records: in_city - all_ppa.len(),
        city_mean_price_per_area: mean(&all_ppa),
        districts,
    }
}

/// Drop listings whose price per m² falls outside
/// `[Q1 - factor * IQR, Q3 + factor * IQR]` of their district within
/// their city.
///
/// Ineligible listings are dropped as well; districts with fewer than four
/// eligible listings are kept whole.
pub fn filter_outliers(records: &[PropertyRecord], factor: f64) -> Vec<PropertyRecord> {
    let mut by_district: BTreeMap<DistrictKey<'_>, Vec<f64>> = BTreeMap::new();
    for (record, ppa) in eligible_in_city(records, "") {
        by_district.entry(district_key(record)).or_default().push(ppa);
    }

    let fences: BTreeMap<DistrictKey<'_>, (f64, f64)> = by_district
        .into_iter()
        .filter(|(_, values)| values.len() >= MIN_OUTLIER_SAMPLE)
        .filter_map(|(district, values)| {
            let values = sorted(values);
            let q1 = quantile(&values, 0.25)?;
            let q3 = quantile(&values, 0.75)?;
            let iqr = q3 - q1;
            Some((district, (q1 - factor * iqr, q3 + factor * iqr)))
        })
        .collect();

    records
        .iter()
        .filter(|r| match r.price_per_area() {
            Some(ppa) => match fences.get(&district_key(*r)) {
                Some((low, high)) => ppa >= *low && ppa <= *high,
                None => true,
            },
            None => false,
        })
        .cloned()
        .collect()
}

pub struct MarketStatsUseCase {
    provider: Arc<dyn ListingProvider>,
}

impl MarketStatsUseCase {
    pub fn new(provider: Arc<dyn ListingProvider>) -> Self {
        Self { provider }
    }

    /// Fetch current listings and summarize them, optionally after
    /// removing district outliers.
    pub async fn summarize_city(
        &self,
        city: &str,
        property_type: &str,
        outlier_factor: Option<f64>,
    ) -> Result<MarketSummary, DomainError> {
        let records = self.provider.fetch(city, property_type).await?.into_records();
        let records = match outlier_factor {
            Some(factor) => filter_outliers(&records, factor),
            None => records,
        };
        Ok(summarize(&records, city))
    }
}
