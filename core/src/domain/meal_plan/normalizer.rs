//! Defensive parsing of generator output. The structured-output schema is
//! requested but never trusted: every field is checked for presence and
//! type before a typed record is built.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::meal_plan::entities::{
    GeneratedMeal, MealBatch, MealCategory, RejectedMeal, RejectionReason, ShoppingListEntry,
};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected {expected} at the top level, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("item {index}: missing field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("item {index}: field `{field}` must be {expected}")]
    WrongType {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_json(raw: &str) -> Result<Value, ParseError> {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

fn as_object(index: usize, value: &Value) -> Result<&Map<String, Value>, ParseError> {
    value.as_object().ok_or(ParseError::WrongType {
        index,
        field: "item",
        expected: "an object",
    })
}

fn required<'a>(
    index: usize,
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ParseError> {
    match object.get(field) {
        Some(Value::Null) | None => Err(ParseError::MissingField { index, field }),
        Some(value) => Ok(value),
    }
}

fn required_str<'a>(
    index: usize,
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ParseError> {
    required(index, object, field)?
        .as_str()
        .ok_or(ParseError::WrongType {
            index,
            field,
            expected: "a string",
        })
}

fn required_strings(
    index: usize,
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ParseError> {
    let wrong_type = ParseError::WrongType {
        index,
        field,
        expected: "an array of strings",
    };

    let values = required(index, object, field)?
        .as_array()
        .ok_or_else(|| wrong_type.clone())?;

    let mut strings = Vec::with_capacity(values.len());
    for value in values {
        let s = value.as_str().ok_or_else(|| wrong_type.clone())?;
        let s = s.trim();
        if !s.is_empty() {
            strings.push(s.to_string());
        }
    }

    Ok(strings)
}

fn meal_from_value(index: usize, value: &Value) -> Result<GeneratedMeal, ParseError> {
    let object = as_object(index, value)?;

    let title = required_str(index, object, "title")?.trim().to_string();
    let description = required_str(index, object, "description")?.trim().to_string();
    let label = required_str(index, object, "category")?;
    let score = required(index, object, "score")?
        .as_f64()
        .ok_or(ParseError::WrongType {
            index,
            field: "score",
            expected: "a number",
        })?;
    let ingredients = required_strings(index, object, "ingredients")?;

    let category = label.parse::<MealCategory>().unwrap_or_else(|_| {
        let relabelled = MealCategory::from_score(score);
        tracing::debug!(index, label, %relabelled, "unknown meal category, relabelled from score");
        relabelled
    });

    Ok(GeneratedMeal {
        title,
        description,
        category,
        score,
        ingredients,
    })
}

/// Parses a meal batch. Any malformed element fails the whole batch.
pub fn parse_meals(raw: &str) -> Result<Vec<GeneratedMeal>, ParseError> {
    let value = parse_json(raw)?;
    let items = value.as_array().ok_or(ParseError::UnexpectedShape {
        expected: "an array",
        found: kind_of(&value),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| meal_from_value(index, item))
        .collect()
}

/// Like [`parse_meals`] but never fails: a malformed response yields no
/// meals.
pub fn normalize(raw: &str) -> Vec<GeneratedMeal> {
    match parse_meals(raw) {
        Ok(meals) => meals,
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed meal response");
            Vec::new()
        }
    }
}

/// Parses a single replacement meal. A one-element array is accepted too.
pub fn parse_replacement(raw: &str) -> Result<GeneratedMeal, ParseError> {
    let value = parse_json(raw)?;
    match &value {
        Value::Object(_) => meal_from_value(0, &value),
        Value::Array(items) if items.len() == 1 => meal_from_value(0, &items[0]),
        other => Err(ParseError::UnexpectedShape {
            expected: "an object",
            found: kind_of(other),
        }),
    }
}

pub fn parse_shopping_list(raw: &str) -> Result<Vec<ShoppingListEntry>, ParseError> {
    let value = parse_json(raw)?;
    let entries = value.as_array().ok_or(ParseError::UnexpectedShape {
        expected: "an array",
        found: kind_of(&value),
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let object = as_object(index, entry)?;
            Ok(ShoppingListEntry {
                category: required_str(index, object, "category")?.trim().to_string(),
                items: required_strings(index, object, "items")?,
            })
        })
        .collect()
}

/// Splits meals into those that respect the exclusions and those that
/// mention an excluded ingredient.
pub fn screen_meals(meals: Vec<GeneratedMeal>, excluded: &[String]) -> MealBatch {
    let mut batch = MealBatch::default();

    for meal in meals {
        match meal.find_excluded(excluded) {
            Some(term) => {
                tracing::warn!(title = %meal.title, term, "meal contains an excluded ingredient");
                batch.rejected.push(RejectedMeal {
                    reason: RejectionReason::ExcludedIngredient(term.to_string()),
                    meal,
                });
            }
            None => batch.accepted.push(meal),
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meal_plan::value_objects::MealDistribution;
    use serde_json::json;

    fn meal_json(title: &str, category: &str, score: f64, ingredients: &[&str]) -> Value {
        json!({
            "title": title,
            "description": format!("{title} maison"),
            "category": category,
            "score": score,
            "ingredients": ingredients,
        })
    }

    fn batch_json(green: u32, orange: u32, red: u32) -> String {
        let mut items = Vec::new();
        for i in 0..green {
            items.push(meal_json(&format!("vert {i}"), "green", 9.5, &["épinards"]));
        }
        for i in 0..orange {
            items.push(meal_json(&format!("orange {i}"), "orange", 7.0, &["riz"]));
        }
        for i in 0..red {
            items.push(meal_json(&format!("rouge {i}"), "red", 4.0, &["frites"]));
        }
        Value::Array(items).to_string()
    }

    #[test]
    fn test_well_formed_batches_are_accepted_in_order() {
        for (g, o, r) in [(1, 0, 0), (0, 2, 0), (3, 2, 1), (0, 0, 4), (2, 5, 3)] {
            let meals = parse_meals(&batch_json(g, o, r)).unwrap();
            assert_eq!(meals.len(), (g + o + r) as usize);

            let expected: Vec<MealCategory> = std::iter::repeat_n(MealCategory::Green, g as usize)
                .chain(std::iter::repeat_n(MealCategory::Orange, o as usize))
                .chain(std::iter::repeat_n(MealCategory::Red, r as usize))
                .collect();
            let categories: Vec<MealCategory> = meals.iter().map(|m| m.category).collect();
            assert_eq!(categories, expected);

            let batch = screen_meals(meals, &[]);
            assert!(batch.matches_distribution(&MealDistribution::new(g, o, r)));
        }
    }

    #[test]
    fn test_malformed_inputs_normalize_to_empty() {
        let cases = [
            "",
            "not json",
            "{\"title\": \"x\"}",
            "[1, 2, 3]",
            "[{\"title\": \"x\", \"description\": \"y\", \"category\": \"green\", \"score\": 9}]",
            "[{\"title\": 3, \"description\": \"y\", \"category\": \"green\", \"score\": 9, \"ingredients\": []}]",
            "[{\"title\": \"x\", \"description\": \"y\", \"category\": \"green\", \"score\": \"9\", \"ingredients\": []}]",
            "[{\"title\": \"x\", \"description\": \"y\", \"category\": \"green\", \"score\": 9, \"ingredients\": [1]}]",
            "\"[]\"",
            "null",
        ];

        for raw in cases {
            assert!(normalize(raw).is_empty(), "accepted malformed input {raw:?}");
        }
    }

    #[test]
    fn test_one_bad_element_fails_the_batch() {
        let raw = json!([
            meal_json("ok", "green", 9.0, &["a"]),
            { "title": "ko", "description": "d", "category": "red", "ingredients": [] }
        ])
        .to_string();

        assert_eq!(
            parse_meals(&raw),
            Err(ParseError::MissingField {
                index: 1,
                field: "score"
            })
        );
    }

    #[test]
    fn test_typed_errors() {
        assert!(matches!(parse_meals("{oops"), Err(ParseError::InvalidJson(_))));
        assert_eq!(
            parse_meals("{}"),
            Err(ParseError::UnexpectedShape {
                expected: "an array",
                found: "an object"
            })
        );
        assert_eq!(
            parse_meals("[\"x\"]"),
            Err(ParseError::WrongType {
                index: 0,
                field: "item",
                expected: "an object"
            })
        );
    }

    #[test]
    fn test_unknown_category_is_relabelled_from_score() {
        let raw = json!([
            meal_json("a", "VERT", 9.2, &["a"]),
            meal_json("b", "purple", 6.5, &["b"]),
            meal_json("c", "", 2.0, &["c"]),
        ])
        .to_string();

        let categories: Vec<MealCategory> =
            parse_meals(&raw).unwrap().iter().map(|m| m.category).collect();
        assert_eq!(
            categories,
            vec![MealCategory::Green, MealCategory::Orange, MealCategory::Red]
        );
    }

    #[test]
    fn test_code_fence_and_whitespace_are_tolerated() {
        let raw = format!("\n```json\n{}\n```\n", batch_json(1, 1, 0));
        assert_eq!(parse_meals(&raw).unwrap().len(), 2);
    }

    #[test]
    fn test_blank_ingredients_are_dropped() {
        let raw = json!([meal_json("a", "green", 9.0, &[" 1 courgette ", "", "   "])]).to_string();
        assert_eq!(parse_meals(&raw).unwrap()[0].ingredients, vec!["1 courgette"]);
    }

    #[test]
    fn test_screening_flags_excluded_ingredients() {
        let raw = json!([
            meal_json("satay", "orange", 7.0, &["100g Peanuts", "poulet"]),
            meal_json("salade", "green", 9.0, &["roquette"]),
        ])
        .to_string();

        let batch = screen_meals(parse_meals(&raw).unwrap(), &["peanuts".to_string()]);
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].title, "salade");
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(
            batch.rejected[0].reason,
            RejectionReason::ExcludedIngredient("peanuts".to_string())
        );
    }

    #[test]
    fn test_replacement_accepts_object_or_singleton_array() {
        let object = meal_json("risotto", "orange", 7.0, &["riz"]);
        assert_eq!(parse_replacement(&object.to_string()).unwrap().title, "risotto");
        assert_eq!(
            parse_replacement(&json!([object.clone()]).to_string())
                .unwrap()
                .title,
            "risotto"
        );
        assert!(parse_replacement(&json!([object.clone(), object]).to_string()).is_err());
        assert!(parse_replacement("null").is_err());
    }

    #[test]
    fn test_shopping_list_parsing() {
        let raw = json!([
            { "category": "Fruits et Légumes", "items": ["tomate", "courgette"] },
            { "category": "Épicerie", "items": [] }
        ])
        .to_string();
        let entries = parse_shopping_list(&raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].items, vec!["tomate", "courgette"]);

        assert!(parse_shopping_list("[{\"category\": \"x\"}]").is_err());
    }
}
