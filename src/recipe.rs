use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single recipe as stored on disk and served over the API.
///
/// The wrapped JSON is kept exactly as it was seeded or generated, so quantities
/// like `"to taste"`, plain-string ingredients or `"servings": "2-3"` survive a
/// rewrite of the store file. Seed entries are never shape-checked, which is why
/// every accessor tolerates missing keys and unexpected types.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct Recipe(Value);

/// Borrowed view of one element of a recipe's `ingredients` array.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient<'a> {
    pub name: String,
    pub quantity: Option<&'a Value>,
    pub unit: Option<&'a Value>,
}

impl<'a> Ingredient<'a> {
    fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Object(obj) => Self {
                name: obj.get("name").map(display_text).unwrap_or_default(),
                quantity: obj.get("quantity").filter(|v| !v.is_null()),
                unit: obj.get("unit").filter(|v| !v.is_null()),
            },
            // "1 cup rice" style entries: the whole text is the name
            other => Self {
                name: display_text(other),
                quantity: None,
                unit: None,
            },
        }
    }
}

impl From<Value> for Recipe {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl Recipe {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Only string ids can be looked up by path.
    pub fn id(&self) -> Option<&str> {
        self.field("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(Value::as_str)
    }

    pub fn servings(&self) -> Option<&Value> {
        self.field("servings")
    }

    pub fn tags(&self) -> Vec<String> {
        self.array("tags").map(display_text).collect()
    }

    pub fn ingredients(&self) -> Vec<Ingredient<'_>> {
        self.array("ingredients").map(Ingredient::from_value).collect()
    }

    pub fn steps(&self) -> Vec<String> {
        self.array("steps").map(display_text).collect()
    }

    fn array(&self, key: &str) -> impl Iterator<Item = &Value> {
        self.field(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
    }

    /// Lowercased `name tags... ingredient-names...` string the store matches queries against.
    pub fn search_haystack(&self) -> String {
        let ingredient_names: Vec<String> = self.ingredients().into_iter().map(|i| i.name).collect();
        format!(
            "{} {} {}",
            self.field("name").map(display_text).unwrap_or_default(),
            self.tags().join(" "),
            ingredient_names.join(" ")
        )
        .to_lowercase()
    }
}

/// Strings render bare; every other JSON value renders as JSON text.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON falsiness: `null`, `false`, `0` and `""`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    pub fn recipe(id: &str, name: &str, tags: &[&str], ingredients: &[&str]) -> Recipe {
        let ingredients: Vec<Value> = ingredients.iter().map(|n| json!({ "name": n })).collect();
        Recipe::from(json!({
            "id": id,
            "name": name,
            "tags": tags,
            "servings": 2,
            "ingredients": ingredients,
            "steps": ["Cook it."]
        }))
    }
}
