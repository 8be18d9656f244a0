//! Fixed weightage tables turning raw income and home district into bounded scores.
//!
//! Lower income and greater distance from campus earn higher scores.

/// Inclusive income upper bounds (rupees per annum) paired with their score.
/// Bounds strictly increase and the final bound is unbounded, so every income lands somewhere.
pub const INCOME_WEIGHTAGE: [(f64, f64); 32] = [
    (25_000.0, 40.0),
    (50_000.0, 39.0),
    (75_000.0, 38.0),
    (100_000.0, 37.0),
    (125_000.0, 36.0),
    (150_000.0, 35.0),
    (175_000.0, 34.0),
    (200_000.0, 33.0),
    (225_000.0, 32.0),
    (250_000.0, 31.0),
    (275_000.0, 30.0),
    (300_000.0, 29.0),
    (325_000.0, 28.0),
    (350_000.0, 27.0),
    (375_000.0, 26.0),
    (400_000.0, 25.0),
    (425_000.0, 24.0),
    (450_000.0, 23.0),
    (475_000.0, 22.0),
    (500_000.0, 21.0),
    (600_000.0, 20.0),
    (700_000.0, 19.0),
    (800_000.0, 18.0),
    (900_000.0, 17.0),
    (1_000_000.0, 16.0),
    (1_100_000.0, 14.0),
    (1_200_000.0, 12.0),
    (1_300_000.0, 10.0),
    (1_400_000.0, 8.0),
    (1_500_000.0, 6.0),
    (1_600_000.0, 4.0),
    (f64::INFINITY, 3.0),
];

/// Score used for any district name missing from [`DISTRICT_WEIGHTAGE`].
pub const DEFAULT_DISTANCE_SCORE: f64 = 1.0;

/// Distance weightage per Kerala district. Names match exactly; no case folding.
pub const DISTRICT_WEIGHTAGE: [(&str, f64); 14] = [
    ("Trivandrum", 20.0),
    ("Kollam", 17.5),
    ("Pathanamthitta", 16.6667),
    ("Alappuzha", 13.75),
    ("Kottayam", 14.5833),
    ("Idukki", 14.79167),
    ("Ernakulam", 11.6667),
    ("Trichur", 9.16667),
    ("Palakkad", 8.54167),
    ("Malappuram", 7.5),
    ("Calicut", 4.16667),
    ("Kannur", 3.33333),
    ("Kasaragod", 7.08333),
    ("Wayanad", 1.0),
];

const LOWEST_INCOME_SCORE: f64 = 3.0;

/// Score of the first bracket whose bound is not exceeded by `income`.
pub fn income_score(income: f64) -> f64 {
    INCOME_WEIGHTAGE
        .iter()
        .find(|(bound, _)| income <= *bound)
        .map(|(_, score)| *score)
        // only reachable for NaN, which request validation rejects
        .unwrap_or(LOWEST_INCOME_SCORE)
}

pub fn distance_score(district: &str) -> f64 {
    DISTRICT_WEIGHTAGE
        .iter()
        .find(|(name, _)| *name == district)
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_DISTANCE_SCORE)
}
