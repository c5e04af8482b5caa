use serde::{ Deserialize, Deserializer, Serialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of a conversation. Parts are kept as plain strings; alternation of roles is the
/// caller's business.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    #[serde(deserialize_with = "deserialize_parts")]
    pub parts: Vec<String>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, parts: vec![text.into()] }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, parts: vec![text.into()] }
    }
}

// Web clients send `{"text": "..."}` objects, other callers send bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum PartInput {
    Text(String),
    Object {
        text: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PartsInput {
    Many(Vec<PartInput>),
    One(PartInput),
}

fn deserialize_parts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where D: Deserializer<'de>
{
    let parts = match PartsInput::deserialize(deserializer)? {
        PartsInput::Many(parts) => parts,
        PartsInput::One(part) => vec![part],
    };
    Ok(
        parts
            .into_iter()
            .map(|p| match p {
                PartInput::Text(text) | PartInput::Object { text } => text,
            })
            .collect()
    )
}
