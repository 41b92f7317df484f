use serde::{Deserialize, Deserializer};

pub mod admin;
pub mod health;
pub mod registration;
pub mod validation;

/// Folds identifier fields that arrive as JSON numbers into their decimal
/// string form, so `42` and `"42"` deserialize identically.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(value) => value,
        Raw::Number(value) => value.to_string(),
    })
}
