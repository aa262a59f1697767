use serde::{Deserialize, Serialize};

/// A game server the user can operate within.
///
/// Servers are defined client-side (see [`crate::servers`]); `id` is the URL
/// slug and `server_id` is the numeric id the backend files characters under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    pub server_id: i32,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Server {
    /// Path of this server's character roster page.
    pub fn characters_path(&self) -> String {
        format!("/servers/{}/characters", self.id)
    }
}
