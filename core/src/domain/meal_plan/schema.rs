use serde_json::json;

pub const MEAL_REQUIRED_FIELDS: [&str; 5] =
    ["title", "description", "category", "score", "ingredients"];

fn meal_object_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string" },
            "category": {
                "type": "string",
                "enum": ["green", "orange", "red"],
                "description": "green, orange, or red"
            },
            "score": { "type": "number" },
            "ingredients": {
                "type": "array",
                "items": {
                    "type": "string",
                    "description": "Ingrédient avec quantité"
                }
            }
        },
        "required": MEAL_REQUIRED_FIELDS
    })
}

/// Returns the JSON schema for a batch of generated meals
pub fn get_meal_batch_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "items": meal_object_schema()
    })
}

/// Returns the JSON schema for a single replacement meal
pub fn get_replacement_meal_schema() -> serde_json::Value {
    meal_object_schema()
}

/// Returns the JSON schema for an aisle-grouped shopping list
pub fn get_shopping_list_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Rayon (ex: Fruits et Légumes)"
                },
                "items": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["category", "items"]
        }
    })
}
