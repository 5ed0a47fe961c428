// Request payload validation for drink writes.
//
// A field of the wrong JSON type is a BadRequest (400); a field of the right
// type with an empty or out-of-range value is Unprocessable (422).

use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::models::{DrinkChanges, Ingredient};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    Unprocessable(&'static str),
}

use ValidationError::{BadRequest, Unprocessable};

pub const BODY_NOT_OBJECT: &str = "Request body must be a JSON object.";
pub const CREATE_WRONG_TYPE: &str = "Title or recipe list is not correct type.";
pub const CREATE_EMPTY: &str = "Title or recipe list is empty.";
pub const TITLE_WRONG_TYPE: &str = "Title is not string type.";
pub const TITLE_EMPTY: &str = "Title is empty.";
pub const RECIPE_WRONG_TYPE: &str = "Recipe list is not list type.";
pub const RECIPE_EMPTY: &str = "Recipe list is empty.";
pub const ELEMENT_NOT_OBJECT: &str = "Recipe is not dictionary type.";
pub const ELEMENT_WRONG_TYPE: &str = "Recipe elements are either missing or not correct type.";
pub const ELEMENT_INVALID: &str = "Recipe element is empty or incorrect.";

/// Validated body of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Parse a request body that has to be a JSON object
pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(BadRequest(BODY_NOT_OBJECT)),
    }
}

/// Both fields are required on create
pub fn validate_new_drink(body: &Map<String, Value>) -> Result<NewDrink, ValidationError> {
    let (title, items) = match (body.get("title"), body.get("recipe")) {
        (Some(Value::String(title)), Some(Value::Array(items))) => (title, items),
        _ => return Err(BadRequest(CREATE_WRONG_TYPE)),
    };

    if title.is_empty() || items.is_empty() {
        return Err(Unprocessable(CREATE_EMPTY));
    }

    Ok(NewDrink {
        title: title.clone(),
        recipe: validate_recipe_items(items)?,
    })
}

/// Absent or `null` fields mean "leave unchanged"
pub fn validate_drink_changes(body: &Map<String, Value>) -> Result<DrinkChanges, ValidationError> {
    let title = match body.get("title") {
        None | Some(Value::Null) => None,
        Some(Value::String(title)) if title.is_empty() => return Err(Unprocessable(TITLE_EMPTY)),
        Some(Value::String(title)) => Some(title.clone()),
        Some(_) => return Err(BadRequest(TITLE_WRONG_TYPE)),
    };

    let recipe = match body.get("recipe") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) if items.is_empty() => return Err(Unprocessable(RECIPE_EMPTY)),
        Some(Value::Array(items)) => Some(validate_recipe_items(items)?),
        Some(_) => return Err(BadRequest(RECIPE_WRONG_TYPE)),
    };

    Ok(DrinkChanges { title, recipe })
}

/// Elements are checked in order; the first bad one decides the error
fn validate_recipe_items(items: &[Value]) -> Result<Vec<Ingredient>, ValidationError> {
    items.iter().map(validate_ingredient).collect()
}

fn validate_ingredient(item: &Value) -> Result<Ingredient, ValidationError> {
    let fields = item.as_object().ok_or(BadRequest(ELEMENT_NOT_OBJECT))?;

    let name = fields.get("name").and_then(Value::as_str);
    let color = fields.get("color").and_then(Value::as_str);
    let parts = fields.get("parts").and_then(integer_parts);

    let (Some(name), Some(color), Some(parts)) = (name, color, parts) else {
        return Err(BadRequest(ELEMENT_WRONG_TYPE));
    };

    // Negative counts are well-typed but invalid
    let Some(parts) = parts.filter(|p| *p >= 1) else {
        return Err(Unprocessable(ELEMENT_INVALID));
    };

    if name.is_empty() || color.is_empty() {
        return Err(Unprocessable(ELEMENT_INVALID));
    }

    Ok(Ingredient {
        name: name.to_string(),
        color: color.to_string(),
        parts,
    })
}

/// `Some(None)` for a negative integer, `None` for anything that is not an
/// integer at all (floats, booleans, strings, integers beyond `u64`)
fn integer_parts(value: &Value) -> Option<Option<u64>> {
    match value {
        Value::Number(n) if n.is_u64() => n.as_u64().map(Some),
        Value::Number(n) if n.is_i64() => Some(None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn accepts_well_formed_drink() {
        let drink = validate_new_drink(&body(json!({
            "title": "Water",
            "recipe": [{"name": "water", "color": "blue", "parts": 1}]
        })))
        .unwrap();

        assert_eq!(drink.title, "Water");
        assert_eq!(
            drink.recipe,
            vec![Ingredient { name: "water".into(), color: "blue".into(), parts: 1 }]
        );
    }

    #[test]
    fn create_requires_both_fields_with_right_types() {
        let cases = [
            json!({"recipe": [{"name": "a", "color": "b", "parts": 1}]}),
            json!({"title": "Water"}),
            json!({"title": 5, "recipe": []}),
            json!({"title": "Water", "recipe": {"name": "a"}}),
            json!({"title": null, "recipe": []}),
        ];
        for case in cases {
            assert_eq!(
                validate_new_drink(&body(case.clone())),
                Err(BadRequest(CREATE_WRONG_TYPE)),
                "{case}"
            );
        }
    }

    #[test]
    fn create_rejects_empty_values() {
        assert_eq!(
            validate_new_drink(&body(json!({"title": "", "recipe": [{"name": "a", "color": "b", "parts": 1}]}))),
            Err(Unprocessable(CREATE_EMPTY))
        );
        assert_eq!(
            validate_new_drink(&body(json!({"title": "Water", "recipe": []}))),
            Err(Unprocessable(CREATE_EMPTY))
        );
    }

    #[test]
    fn element_type_errors_are_bad_requests() {
        let cases = [
            (json!("water"), ELEMENT_NOT_OBJECT),
            (json!([{"name": "water"}]), ELEMENT_NOT_OBJECT),
            (json!({"name": "water", "color": "blue", "parts": "one"}), ELEMENT_WRONG_TYPE),
            (json!({"name": "water", "color": "blue", "parts": 1.5}), ELEMENT_WRONG_TYPE),
            (json!({"name": "water", "color": "blue", "parts": true}), ELEMENT_WRONG_TYPE),
            (json!({"name": "water", "parts": 1}), ELEMENT_WRONG_TYPE),
            (json!({"name": 3, "color": "blue", "parts": 1}), ELEMENT_WRONG_TYPE),
        ];
        for (element, message) in cases {
            let payload = body(json!({"title": "Water", "recipe": [element.clone()]}));
            assert_eq!(validate_new_drink(&payload), Err(BadRequest(message)), "{element}");
        }
    }

    #[test]
    fn element_value_errors_are_unprocessable() {
        let cases = [
            json!({"name": "water", "color": "blue", "parts": 0}),
            json!({"name": "water", "color": "blue", "parts": -2}),
            json!({"name": "", "color": "blue", "parts": 1}),
            json!({"name": "water", "color": "", "parts": 1}),
        ];
        for element in cases {
            let payload = body(json!({"title": "Water", "recipe": [element.clone()]}));
            assert_eq!(validate_new_drink(&payload), Err(Unprocessable(ELEMENT_INVALID)), "{element}");
        }
    }

    #[test]
    fn parts_accepts_the_full_unsigned_range() {
        let payload = body(json!({"title": "Big", "recipe": [
            {"name": "water", "color": "blue", "parts": 9_223_372_036_854_775_808u64}
        ]}));
        let drink = validate_new_drink(&payload).unwrap();
        assert_eq!(drink.recipe[0].parts, 9_223_372_036_854_775_808);

        let payload = body(json!({"title": "Max", "recipe": [
            {"name": "water", "color": "blue", "parts": u64::MAX}
        ]}));
        assert_eq!(validate_new_drink(&payload).unwrap().recipe[0].parts, u64::MAX);

        // Beyond u64 serde_json falls back to a float, which is a type error
        let payload = parse_body(
            br#"{"title": "Huge", "recipe": [{"name": "water", "color": "blue", "parts": 18446744073709551616}]}"#,
        )
        .unwrap();
        assert_eq!(validate_new_drink(&payload), Err(BadRequest(ELEMENT_WRONG_TYPE)));
    }

    #[test]
    fn first_bad_element_decides() {
        let payload = body(json!({"title": "Water", "recipe": [
            {"name": "water", "color": "blue", "parts": 0},
            {"name": "water", "color": "blue", "parts": "one"}
        ]}));
        assert_eq!(validate_new_drink(&payload), Err(Unprocessable(ELEMENT_INVALID)));
    }

    #[test]
    fn update_fields_are_optional() {
        assert_eq!(validate_drink_changes(&body(json!({}))).unwrap(), DrinkChanges::default());
        assert_eq!(
            validate_drink_changes(&body(json!({"title": null, "recipe": null}))).unwrap(),
            DrinkChanges::default()
        );

        let changes = validate_drink_changes(&body(json!({"title": "New"}))).unwrap();
        assert_eq!(changes.title.as_deref(), Some("New"));
        assert!(changes.recipe.is_none());

        let changes =
            validate_drink_changes(&body(json!({"recipe": [{"name": "tea", "color": "green", "parts": 2}]})))
                .unwrap();
        assert!(changes.title.is_none());
        assert_eq!(changes.recipe.unwrap().len(), 1);
    }

    #[test]
    fn update_reports_type_and_value_errors() {
        assert_eq!(validate_drink_changes(&body(json!({"title": 1}))), Err(BadRequest(TITLE_WRONG_TYPE)));
        assert_eq!(validate_drink_changes(&body(json!({"title": ""}))), Err(Unprocessable(TITLE_EMPTY)));
        assert_eq!(
            validate_drink_changes(&body(json!({"recipe": "tea"}))),
            Err(BadRequest(RECIPE_WRONG_TYPE))
        );
        assert_eq!(validate_drink_changes(&body(json!({"recipe": []}))), Err(Unprocessable(RECIPE_EMPTY)));
        assert_eq!(
            validate_drink_changes(&body(json!({"recipe": [{"name": "tea", "color": "green", "parts": 0}]}))),
            Err(Unprocessable(ELEMENT_INVALID))
        );
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(parse_body(br#"{"title": "Water"}"#).is_ok());
        assert_eq!(parse_body(b"[1, 2]"), Err(BadRequest(BODY_NOT_OBJECT)));
        assert_eq!(parse_body(b"not json"), Err(BadRequest(BODY_NOT_OBJECT)));
        assert_eq!(parse_body(b""), Err(BadRequest(BODY_NOT_OBJECT)));
    }
}
