//! Opportunity scoring: a fixed additive rule set mapping a discount and a
//! confidence tier onto a 0-100 integer.

use crate::domain::values::confidence::ConfidenceTier;

pub const BASE_SCORE: i32 = 50;
pub const MAX_SCORE: i32 = 100;

/// Discount tiers, highest first. Only the first matching tier counts.
const DISCOUNT_BONUSES: &[(f64, i32)] = &[(30.0, 30), (20.0, 20), (15.0, 10)];

fn discount_bonus(discount_percent: f64) -> i32 {
    DISCOUNT_BONUSES
        .iter()
        .find(|(min, _)| discount_percent >= *min)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Score an opportunity. NaN discounts earn no discount bonus.
pub fn score(discount_percent: f64, confidence: ConfidenceTier) -> u8 {
    let raw = BASE_SCORE + discount_bonus(discount_percent) + confidence.score_bonus();
    raw.clamp(0, MAX_SCORE) as u8
}
