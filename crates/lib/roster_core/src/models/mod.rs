//! Domain models.
//!
//! Response models deserialize from the camelCase shape produced by
//! [`crate::normalize::camel_case_keys`]. Request payloads keep the backend's
//! snake_case wire names.

pub mod character;
pub mod server;
pub mod user;

pub use character::{Character, CharacterForm, NewCharacter, StatusFlag, StatusKind};
pub use server::Server;
pub use user::{User, UserRole};

use serde::{Deserialize, Deserializer};

/// Accept an identifier emitted either as a JSON string or as a number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
