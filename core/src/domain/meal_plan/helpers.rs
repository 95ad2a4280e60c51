use crate::domain::meal_plan::entities::ShoppingListEntry;

fn merge_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Merge entries sharing an aisle label and collapse repeated items. Labels
/// and items compare case- and whitespace-insensitively; the first spelling
/// and the first-seen order win. Empty aisles are dropped.
pub fn merge_shopping_list(entries: Vec<ShoppingListEntry>) -> Vec<ShoppingListEntry> {
    let mut merged: Vec<(String, ShoppingListEntry, Vec<String>)> = Vec::new();

    for entry in entries {
        let category = entry.category.trim().to_string();
        let key = merge_key(&category);

        let position = match merged.iter().position(|(k, _, _)| *k == key) {
            Some(position) => position,
            None => {
                merged.push((
                    key,
                    ShoppingListEntry {
                        category,
                        items: Vec::new(),
                    },
                    Vec::new(),
                ));
                merged.len() - 1
            }
        };

        let (_, aisle, seen) = &mut merged[position];
        for item in entry.items {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let item_key = merge_key(item);
            if seen.contains(&item_key) {
                continue;
            }
            seen.push(item_key);
            aisle.items.push(item.to_string());
        }
    }

    merged
        .into_iter()
        .map(|(_, aisle, _)| aisle)
        .filter(|aisle| !aisle.items.is_empty())
        .collect()
}
