//! Undervalued-listing detection.
//!
//! Groups eligible listings by district, measures each one against its
//! district's mean price per m², and reports the ones priced at least
//! `discount_threshold_percent` below that mean. The mean includes the
//! listing itself, so a district with a single listing never produces an
//! opportunity.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::property::PropertyRecord;
use crate::domain::values::risk_tier::RiskTier;

/// Minimum relative discount vs. the district mean, in percent.
pub const DEFAULT_DISCOUNT_THRESHOLD_PERCENT: f64 = 15.0;
/// Maximum number of opportunities returned by one detection pass.
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub discount_threshold_percent: f64,
    pub max_results: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            discount_threshold_percent: DEFAULT_DISCOUNT_THRESHOLD_PERCENT,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl DetectorConfig {
    /// Fraction of the district mean a listing must stay strictly below.
    pub fn qualifying_ratio(&self) -> f64 {
        1.0 - self.discount_threshold_percent / 100.0
    }
}

/// Mean price per m² of one district, over its eligible listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictAggregate {
    pub district: String,
    pub mean_price_per_area: f64,
    pub sample_count: usize,
}

/// A listing priced well below its district mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub property_id: String,
    pub title: String,
    pub district: String,
    pub property_type: String,
    pub current_price: f64,
    pub price_per_area: f64,
    pub district_mean_price_per_area: f64,
    pub discount_percent: f64,
    pub expected_yield: Option<f64>,
    pub risk_tier: RiskTier,
}

/// Eligible listings of `city` (all listings when `city` is blank).
pub(crate) fn eligible_in_city<'a>(
    records: &'a [PropertyRecord],
    city: &'a str,
) -> impl Iterator<Item = (&'a PropertyRecord, f64)> + 'a {
    let city = city.trim();
    records.iter().filter_map(move |r| {
        if !city.is_empty() && !r.city.trim().eq_ignore_ascii_case(city) {
            return None;
        }
        r.price_per_area().map(|ppa| (r, ppa))
    })
}

fn aggregate<'a>(
    eligible: impl Iterator<Item = (&'a PropertyRecord, f64)>,
) -> BTreeMap<&'a str, (f64, usize)> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (record, ppa) in eligible {
        let slot = sums.entry(record.district.as_str()).or_insert((0.0, 0));
        slot.0 += ppa;
        slot.1 += 1;
    }
    sums
}

/// Per-district mean price per m², sorted by district name.
///
/// Districts without an eligible listing do not appear.
pub fn district_means(records: &[PropertyRecord]) -> Vec<DistrictAggregate> {
    aggregate(eligible_in_city(records, ""))
        .into_iter()
        .map(|(district, (sum, count))| DistrictAggregate {
            district: district.to_string(),
            mean_price_per_area: sum / count as f64,
            sample_count: count,
        })
        .collect()
}

/// Undervalued listings of `city` using the default thresholds.
pub fn find_undervalued(records: &[PropertyRecord], city: &str) -> Vec<Opportunity> {
    find_undervalued_with(records, city, &DetectorConfig::default())
}

/// Undervalued listings of `city`, best discount first, at most
/// `config.max_results` of them.
pub fn find_undervalued_with(
    records: &[PropertyRecord],
    city: &str,
    config: &DetectorConfig,
) -> Vec<Opportunity> {
    let means: BTreeMap<&str, f64> = aggregate(eligible_in_city(records, city))
        .into_iter()
        .map(|(district, (sum, count))| (district, sum / count as f64))
        .collect();

    let ratio = config.qualifying_ratio();
    let mut opportunities: Vec<Opportunity> = eligible_in_city(records, city)
        .filter_map(|(record, ppa)| {
            let mean = *means.get(record.district.as_str())?;
            if mean <= 0.0 || ppa >= mean * ratio {
                return None;
            }
            Some(Opportunity {
                property_id: record.id.clone(),
                title: record.title.clone(),
                district: record.district.clone(),
                property_type: record.property_type.clone(),
                current_price: record.price()?,
                price_per_area: ppa,
                district_mean_price_per_area: mean,
                discount_percent: (mean - ppa) / mean * 100.0,
                expected_yield: record.expected_yield,
                risk_tier: record.risk_tier,
            })
        })
        .collect();

    opportunities.sort_by(|a, b| {
        b.discount_percent
            .partial_cmp(&a.discount_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.property_id.cmp(&b.property_id))
    });
    opportunities.truncate(config.max_results);
    opportunities
}
