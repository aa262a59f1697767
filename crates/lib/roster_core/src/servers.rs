//! Static server catalog and URL-path resolution.

use crate::models::Server;

/// Path prefix of every server-scoped page.
pub const SERVERS_PATH_PREFIX: &str = "/servers/";

const CATALOG: &[(&str, i32, &str, &str, Option<&str>)] = &[
    ("borealis", 2, "Borealis", "❄️", Some("Northern shard, EU hosting")),
    ("aurora", 1, "Aurora", "🌅", Some("Flagship server")),
    ("cascade", 3, "Cascade", "🌊", None),
    ("dunes", 4, "Dunes", "🏜️", Some("Roleplay-heavy, whitelist only")),
];

/// All known servers, ordered by numeric server id.
pub fn catalog() -> Vec<Server> {
    let mut servers: Vec<Server> = CATALOG
        .iter()
        .map(|(slug, server_id, name, emoji, description)| Server {
            id: (*slug).to_string(),
            server_id: *server_id,
            name: (*name).to_string(),
            icon: format!("/servers/{slug}.png"),
            emoji: (*emoji).to_string(),
            description: description.map(str::to_string),
        })
        .collect();
    servers.sort_by_key(|s| s.server_id);
    servers
}

/// Look up a server by slug.
pub fn find_by_slug<'a>(servers: &'a [Server], slug: &str) -> Option<&'a Server> {
    servers.iter().find(|s| s.id == slug)
}

/// Extract the server slug from a path of the form `/servers/{slug}/...`.
pub fn slug_from_path(path: &str) -> Option<&str> {
    if !path.starts_with(SERVERS_PATH_PREFIX) {
        return None;
    }
    path.split('/').nth(2).filter(|slug| !slug.is_empty())
}

/// The server named by `path`, if it names one from `servers`.
pub fn server_from_path<'a>(path: &str, servers: &'a [Server]) -> Option<&'a Server> {
    slug_from_path(path).and_then(|slug| find_by_slug(servers, slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_sorted_by_server_id() {
        let ids: Vec<i32> = catalog().iter().map(|s| s.server_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn slugs_are_unique() {
        let servers = catalog();
        for server in &servers {
            assert_eq!(servers.iter().filter(|s| s.id == server.id).count(), 1);
        }
    }

    #[test]
    fn slug_from_path_handles_shapes() {
        assert_eq!(slug_from_path("/servers/aurora/characters"), Some("aurora"));
        assert_eq!(slug_from_path("/servers/aurora"), Some("aurora"));
        assert_eq!(slug_from_path("/servers/"), None);
        assert_eq!(slug_from_path("/servers"), None);
        assert_eq!(slug_from_path("/profile"), None);
    }

    #[test]
    fn unknown_slug_resolves_to_none() {
        let servers = catalog();
        assert!(server_from_path("/servers/atlantis/characters", &servers).is_none());
        assert_eq!(
            server_from_path("/servers/cascade/characters", &servers).map(|s| s.server_id),
            Some(3)
        );
    }
}
