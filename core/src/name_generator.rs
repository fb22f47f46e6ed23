//! Deterministic counterparty name generation using curated word lists.
//!
//! Merchants read like everyday retail businesses; shells read like the
//! offshore holding vehicles layering schemes route money through.
//! All generation is deterministic (same RNG seed = same names).

use crate::rng::SimRng;

/// Deterministic name generator using curated word lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a merchant name: "Prefix Trade Suffix" or "Surname Trade Suffix".
    pub fn generate_merchant_name(rng: &mut SimRng) -> String {
        let trade = Self::pick(rng, Self::merchant_trades());
        let suffix = Self::pick(rng, Self::merchant_suffixes());
        let lead = if rng.chance(0.5) {
            Self::pick(rng, Self::merchant_prefixes())
        } else {
            Self::pick(rng, Self::surnames())
        };
        format!("{lead} {trade} {suffix}")
    }

    /// Generate a shell-company name: "Word Holdings Ltd".
    pub fn generate_shell_name(rng: &mut SimRng) -> String {
        format!("{} Holdings Ltd", Self::pick(rng, Self::shell_words()))
    }

    fn pick(rng: &mut SimRng, words: &'static [&'static str]) -> &'static str {
        words[rng.next_u64_below(words.len() as u64) as usize]
    }

    fn merchant_prefixes() -> &'static [&'static str] {
        &[
            "Corner", "Daily", "Main Street", "Sunrise", "Harbor", "Green Valley",
            "Metro", "City", "Riverside", "Family", "Golden", "Blue Sky",
            "Northside", "Village", "Fresh", "Urban", "Hometown", "Pioneer",
        ]
    }

    fn merchant_trades() -> &'static [&'static str] {
        &[
            "Grocery", "Coffee", "Bakery", "Pharmacy", "Fuel", "Diner",
            "Hardware", "Books", "Market", "Deli", "Pet Supply", "Laundry",
            "Pizza", "Cinema", "Fitness", "Florist", "Electronics", "Outfitters",
        ]
    }

    fn merchant_suffixes() -> &'static [&'static str] {
        &["LLC", "Inc", "Co", "Corp", "& Sons", "Group", "Shop", "Store"]
    }

    fn surnames() -> &'static [&'static str] {
        &[
            "Smith", "Johnson", "Garcia", "Miller", "Davis", "Martinez", "Wilson",
            "Anderson", "Taylor", "Moore", "Jackson", "Lee", "Harris", "Clark",
            "Walker", "Young", "King", "Wright", "Nguyen", "Hill", "Baker", "Patel",
            "Kim", "Chen", "Murphy", "Cooper", "Reed", "Brooks", "Ortiz", "Foster",
        ]
    }

    fn shell_words() -> &'static [&'static str] {
        &[
            "Meridian", "Obsidian", "Atlas", "Zenith", "Crescent", "Sapphire",
            "Summit", "Horizon", "Falcon", "Orion", "Granite", "Aurora",
            "Vanguard", "Pinnacle", "Cobalt", "Sterling", "Nimbus", "Helix",
            "Argent", "Solace", "Trident", "Lynx", "Ember", "Halcyon",
        ]
    }
}
