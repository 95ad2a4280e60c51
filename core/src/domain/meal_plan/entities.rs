use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::meal_plan::value_objects::MealDistribution;

/// Inflammation tier of a meal. Green is the most anti-inflammatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Green,
    Orange,
    Red,
}

impl MealCategory {
    pub const ALL: [MealCategory; 3] = [MealCategory::Green, MealCategory::Orange, MealCategory::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealCategory::Green => "green",
            MealCategory::Orange => "orange",
            MealCategory::Red => "red",
        }
    }

    /// Score band requested from the generator, as shown in the prompt.
    pub fn score_band(&self) -> &'static str {
        match self {
            MealCategory::Green => "9-10",
            MealCategory::Orange => "6-8",
            MealCategory::Red => "<6",
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            MealCategory::Green
        } else if score >= 6.0 {
            MealCategory::Orange
        } else {
            MealCategory::Red
        }
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" | "vert" | "verte" | "verts" => Ok(MealCategory::Green),
            "orange" | "oranges" => Ok(MealCategory::Orange),
            "red" | "rouge" | "rouges" => Ok(MealCategory::Red),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMeal {
    pub title: String,
    pub description: String,
    pub category: MealCategory,
    pub score: f64,
    pub ingredients: Vec<String>,
}

impl GeneratedMeal {
    /// First excluded term found in any ingredient line, compared
    /// case-insensitively as a substring.
    pub fn find_excluded<'a>(&self, excluded: &'a [String]) -> Option<&'a str> {
        let lines: Vec<String> = self.ingredients.iter().map(|i| i.to_lowercase()).collect();

        excluded.iter().map(|term| term.as_str()).find(|term| {
            let needle = term.trim().to_lowercase();
            !needle.is_empty() && lines.iter().any(|line| line.contains(&needle))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectionReason {
    ExcludedIngredient(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedMeal {
    pub meal: GeneratedMeal,
    pub reason: RejectionReason,
}

/// Outcome of one generation call after screening against the user's
/// exclusions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealBatch {
    pub accepted: Vec<GeneratedMeal>,
    pub rejected: Vec<RejectedMeal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub green: u32,
    pub orange: u32,
    pub red: u32,
}

impl MealBatch {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty()
    }

    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }

    /// Per-tier counts over every returned meal, accepted or not.
    pub fn tier_counts(&self) -> TierCounts {
        let mut counts = TierCounts::default();
        let all = self
            .accepted
            .iter()
            .chain(self.rejected.iter().map(|r| &r.meal));

        for meal in all {
            match meal.category {
                MealCategory::Green => counts.green += 1,
                MealCategory::Orange => counts.orange += 1,
                MealCategory::Red => counts.red += 1,
            }
        }

        counts
    }

    pub fn matches_distribution(&self, distribution: &MealDistribution) -> bool {
        let counts = self.tier_counts();
        counts.green == distribution.green
            && counts.orange == distribution.orange
            && counts.red == distribution.red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(ingredients: &[&str]) -> GeneratedMeal {
        GeneratedMeal {
            title: "Salade".into(),
            description: "Fraîche".into(),
            category: MealCategory::Green,
            score: 9.5,
            ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
        }
    }

    #[test]
    fn test_category_labels() {
        assert_eq!("GREEN".parse::<MealCategory>(), Ok(MealCategory::Green));
        assert_eq!(" rouge ".parse::<MealCategory>(), Ok(MealCategory::Red));
        assert!("purple".parse::<MealCategory>().is_err());
    }

    #[test]
    fn test_category_from_score_bands() {
        assert_eq!(MealCategory::from_score(10.0), MealCategory::Green);
        assert_eq!(MealCategory::from_score(9.0), MealCategory::Green);
        assert_eq!(MealCategory::from_score(8.9), MealCategory::Orange);
        assert_eq!(MealCategory::from_score(6.0), MealCategory::Orange);
        assert_eq!(MealCategory::from_score(5.5), MealCategory::Red);
    }

    #[test]
    fn test_find_excluded_is_case_insensitive_substring() {
        let excluded = vec!["Peanuts".to_string()];
        assert_eq!(
            meal(&["200g roasted PEANUTS", "1 lime"]).find_excluded(&excluded),
            Some("Peanuts")
        );
        assert_eq!(meal(&["1 lime"]).find_excluded(&excluded), None);
        assert_eq!(meal(&["1 lime"]).find_excluded(&["  ".to_string()]), None);
    }
}
