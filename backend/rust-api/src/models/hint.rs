use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::error::ValidationError;
use crate::models::schema::OutputSchema;

/// What the player is looking at when they ask for help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    #[validate(custom(function = "not_blank"))]
    pub scene_description: String,
    pub inventory: Vec<String>,
}

impl HintRequest {
    pub fn new<S, I, T>(scene_description: S, inventory: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            scene_description: scene_description.into(),
            inventory: inventory.into_iter().map(Into::into).collect(),
        }
    }

    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(|errors| {
            let mut err = ValidationError::from(errors);
            if err.field == "scene_description" {
                err.field = "sceneDescription".to_string();
            }
            err
        })
    }
}

/// Schema check for untyped input coming off the wire. Unknown keys are ignored.
impl TryFrom<Value> for HintRequest {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::new("request", "must be a JSON object"))?;

        match object.get("sceneDescription") {
            Some(Value::String(_)) => {}
            Some(_) => return Err(ValidationError::new("sceneDescription", "must be a string")),
            None => return Err(ValidationError::new("sceneDescription", "is required")),
        }

        match object.get("inventory") {
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
            Some(Value::Array(_)) => {
                return Err(ValidationError::new(
                    "inventory",
                    "must contain only strings",
                ))
            }
            Some(_) => {
                return Err(ValidationError::new(
                    "inventory",
                    "must be a list of strings",
                ))
            }
            None => return Err(ValidationError::new("inventory", "is required")),
        }

        let request: HintRequest = serde_json::from_value(value)
            .map_err(|e| ValidationError::new("request", e.to_string()))?;
        request.check()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct HintResponse {
    #[validate(custom(function = "not_blank"))]
    pub hint: String,
}

impl HintResponse {
    pub const SCHEMA_NAME: &'static str = "generate_hint_output";

    /// Shape the backend is asked to produce: `{ "hint": string }`.
    pub fn output_schema() -> OutputSchema {
        OutputSchema::new(
            Self::SCHEMA_NAME,
            json!({
                "type": "object",
                "properties": {
                    "hint": {
                        "type": "string",
                        "description": "A helpful hint for the player to progress in the game."
                    }
                },
                "required": ["hint"],
                "additionalProperties": false
            }),
        )
    }
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}
