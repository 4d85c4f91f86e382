//! Constants module for the Manga Gateway API
//!
//! Contains catalog endpoint URL builders that use the base URL from configuration.

/// Default catalog base URL (Jikan v4)
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Largest page size the catalog accepts for list endpoints
pub const MAX_PAGE_LIMIT: u32 = 25;

/// URL builder functions for all catalog endpoints
pub mod endpoints {
    /// Manga search by free-text query
    pub fn search(base_url: &str, query: &str) -> String {
        format!("{}/manga?q={}", base_url, urlencoding::encode(query))
    }

    /// Manga detail by catalog identifier
    pub fn manga(base_url: &str, id: u64) -> String {
        format!("{}/manga/{}", base_url, id)
    }

    /// Top-ranked manga, used for recommendations
    pub fn top_manga(base_url: &str, limit: u32) -> String {
        format!("{}/top/manga?limit={}", base_url, limit)
    }

    /// All manga genres known to the catalog
    pub fn manga_genres(base_url: &str) -> String {
        format!("{}/genres/manga", base_url)
    }

    /// Manga filtered by a genre identifier
    pub fn manga_by_genre(base_url: &str, genre_id: u64) -> String {
        format!(
            "{}/manga?genres={}&order_by=popularity&sort=asc",
            base_url, genre_id
        )
    }

    /// Currently publishing manga, newest first
    pub fn recent(base_url: &str, limit: u32) -> String {
        format!(
            "{}/manga?status=publishing&order_by=start_date&sort=desc&limit={}",
            base_url, limit
        )
    }

    /// Upcoming manga, soonest first
    pub fn upcoming(base_url: &str, limit: u32) -> String {
        format!(
            "{}/manga?status=upcoming&order_by=start_date&sort=asc&limit={}",
            base_url, limit
        )
    }
}

/// Acknowledgement messages for social-graph mutations
pub mod messages {
    pub const FOLLOWED: &str = "success follow";
    pub const UNFOLLOWED: &str = "success unfollow";
    pub const REMOVED: &str = "success remove";
    pub const LIVENESS: &str = "Server is working!!";
}

#[cfg(test)]
mod tests {
    use super::endpoints;

    const BASE: &str = "https://api.jikan.moe/v4";

    #[test]
    fn test_search_encodes_query() {
        assert_eq!(
            endpoints::search(BASE, "one piece & co"),
            "https://api.jikan.moe/v4/manga?q=one%20piece%20%26%20co"
        );
    }

    #[test]
    fn test_manga_by_id() {
        assert_eq!(endpoints::manga(BASE, 13), "https://api.jikan.moe/v4/manga/13");
    }

    #[test]
    fn test_list_endpoints_carry_limit() {
        assert!(endpoints::top_manga(BASE, 5).ends_with("/top/manga?limit=5"));
        assert!(endpoints::recent(BASE, 3).contains("status=publishing"));
        assert!(endpoints::recent(BASE, 3).ends_with("limit=3"));
        assert!(endpoints::upcoming(BASE, 7).contains("status=upcoming"));
        assert!(endpoints::upcoming(BASE, 7).ends_with("limit=7"));
    }

    #[test]
    fn test_genre_endpoints() {
        assert_eq!(
            endpoints::manga_genres(BASE),
            "https://api.jikan.moe/v4/genres/manga"
        );
        assert!(endpoints::manga_by_genre(BASE, 22).contains("genres=22"));
    }
}
