//! API Routes module for the Manga Gateway API
//!
//! This module contains the shared application state, the catalog and fixture
//! handlers, and the route table. Social-graph and authentication handlers live
//! in [`user`] and [`auth`].

use actix_web::{web, HttpResponse};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::constants::{messages, MAX_PAGE_LIMIT};
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::fixtures::Fixtures;
use crate::models::{
    ApiError, ApiResponse, AuthData, FollowRequest, LoginRequest, MangaSummary, MangaSummaryItem,
    MangaSummaryList, ProtectedGreeting, PublicProfile, RemoveRequest, SignupRequest, SocialAck,
    UnfollowRequest, User,
};
use crate::parser::{parse_manga_detail, parse_manga_list};
use crate::social::SocialGraph;

pub mod auth;
pub mod user;

/// Application state shared across handlers
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub social: SocialGraph,
    pub catalog: CatalogClient,
    pub fixtures: Fixtures,
    pub config: Config,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: CatalogClient,
        fixtures: Fixtures,
        config: Config,
    ) -> Self {
        Self {
            social: SocialGraph::new(users.clone()),
            users,
            catalog,
            fixtures,
            config,
        }
    }
}

/// Trimmed search term; empty terms are rejected before calling the catalog
fn require_term(entry: &str) -> AppResult<&str> {
    let term = entry.trim();
    if term.is_empty() {
        return Err(AppError::validation("Search term must not be empty"));
    }
    Ok(term)
}

/// Page size within `1..=MAX_PAGE_LIMIT`
fn require_limit(num: u32) -> AppResult<u32> {
    if num == 0 || num > MAX_PAGE_LIMIT {
        return Err(AppError::validation(format!(
            "num must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }
    Ok(num)
}

/// GET / - Liveness check
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Server is running", body = String, content_type = "text/plain"))
)]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(messages::LIVENESS)
}

/// GET /health - Service health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is healthy"))
)]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(json!({ "status": "healthy" })))
}

/// GET /health/db - User store health
#[utoipa::path(
    get,
    path = "/health/db",
    tag = "health",
    responses(
        (status = 200, description = "User store is reachable"),
        (status = 503, description = "User store is unavailable", body = ApiError)
    )
)]
pub async fn db_health_check(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    data.users.health_check().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(json!({
        "status": "healthy",
        "database": "connected"
    }))))
}

/// GET /manga - Usage hint for the manga routes
#[utoipa::path(
    get,
    path = "/manga",
    tag = "manga",
    responses((status = 200, description = "Usage hint"))
)]
pub async fn manga_usage() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(json!({
        "content": "use this route format to send some json"
    })))
}

/// GET /manga/search/{entry} - Search results reshaped into summaries
#[utoipa::path(
    get,
    path = "/manga/search/{entry}",
    tag = "manga",
    params(("entry" = String, Path, description = "Free-text search term")),
    responses(
        (status = 200, description = "Matching manga", body = MangaSummaryList),
        (status = 400, description = "Empty search term", body = ApiError),
        (status = 502, description = "Catalog service failure", body = ApiError)
    )
)]
pub async fn search_manga(
    data: web::Data<AppState>,
    entry: web::Path<String>,
) -> AppResult<HttpResponse> {
    let term = require_term(&entry)?;
    let payload = data.catalog.search(term).await?;
    let result = parse_manga_list(&payload)?;

    info!("Search '{}' returned {} manga", term, result.len());
    Ok(HttpResponse::Ok().json(ApiResponse::new(MangaSummaryList { result })))
}

/// GET /manga/search2/{entry} - Search results exactly as the catalog returns them
#[utoipa::path(
    get,
    path = "/manga/search2/{entry}",
    tag = "manga",
    params(("entry" = String, Path, description = "Free-text search term")),
    responses(
        (status = 200, description = "Raw catalog payload"),
        (status = 400, description = "Empty search term", body = ApiError),
        (status = 502, description = "Catalog service failure", body = ApiError)
    )
)]
pub async fn search_manga_raw(
    data: web::Data<AppState>,
    entry: web::Path<String>,
) -> AppResult<HttpResponse> {
    let term = require_term(&entry)?;
    let payload = data.catalog.search(term).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(payload)))
}

/// GET /manga/search/id/{id} - One manga reshaped into a summary
#[utoipa::path(
    get,
    path = "/manga/search/id/{id}",
    tag = "manga",
    params(("id" = u64, Path, description = "Catalog identifier")),
    responses(
        (status = 200, description = "Manga summary", body = MangaSummaryItem),
        (status = 400, description = "Non-numeric identifier", body = ApiError),
        (status = 404, description = "Unknown identifier", body = ApiError)
    )
)]
pub async fn manga_by_id(
    data: web::Data<AppState>,
    id: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let payload = data.catalog.manga_by_id(id.into_inner()).await?;
    let result = parse_manga_detail(&payload)?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(MangaSummaryItem { result })))
}

/// GET /manga/search2/id/{id} - One manga exactly as the catalog returns it
#[utoipa::path(
    get,
    path = "/manga/search2/id/{id}",
    tag = "manga",
    params(("id" = u64, Path, description = "Catalog identifier")),
    responses(
        (status = 200, description = "Raw catalog payload"),
        (status = 400, description = "Non-numeric identifier", body = ApiError),
        (status = 404, description = "Unknown identifier", body = ApiError)
    )
)]
pub async fn manga_by_id_raw(
    data: web::Data<AppState>,
    id: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let payload = data.catalog.manga_by_id(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(payload)))
}

/// GET /manga/mangasearch/{entry} - Full details of the best search match
///
/// Searches first, then fetches the detail of the first hit.
#[utoipa::path(
    get,
    path = "/manga/mangasearch/{entry}",
    tag = "manga",
    params(("entry" = String, Path, description = "Free-text search term")),
    responses(
        (status = 200, description = "Raw detail payload of the top match"),
        (status = 404, description = "Nothing matched", body = ApiError)
    )
)]
pub async fn top_match(
    data: web::Data<AppState>,
    entry: web::Path<String>,
) -> AppResult<HttpResponse> {
    let term = require_term(&entry)?;
    let payload = data.catalog.top_match(term).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(payload)))
}

/// GET /manga/recommendation/{num} - Top-ranked manga
#[utoipa::path(
    get,
    path = "/manga/recommendation/{num}",
    tag = "manga",
    params(("num" = u32, Path, description = "Number of results, 1 to 25")),
    responses(
        (status = 200, description = "Recommended manga", body = MangaSummaryList),
        (status = 400, description = "num out of range", body = ApiError)
    )
)]
pub async fn recommendations(
    data: web::Data<AppState>,
    num: web::Path<u32>,
) -> AppResult<HttpResponse> {
    let limit = require_limit(num.into_inner())?;
    let result = data.catalog.recommendations(limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(MangaSummaryList { result })))
}

/// GET /manga/recommendation/genre/{genreName} - Popular manga in a genre
#[utoipa::path(
    get,
    path = "/manga/recommendation/genre/{genreName}",
    tag = "manga",
    params(("genreName" = String, Path, description = "Genre name, case-insensitive")),
    responses(
        (status = 200, description = "Manga in the genre", body = MangaSummaryList),
        (status = 404, description = "Unknown genre", body = ApiError)
    )
)]
pub async fn recommendations_by_genre(
    data: web::Data<AppState>,
    genre_name: web::Path<String>,
) -> AppResult<HttpResponse> {
    let genre = require_term(&genre_name)?;
    let result = data.catalog.by_genre(genre).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(MangaSummaryList { result })))
}

/// GET /manga/recent/{num} - Currently publishing manga
#[utoipa::path(
    get,
    path = "/manga/recent/{num}",
    tag = "manga",
    params(("num" = u32, Path, description = "Number of results, 1 to 25")),
    responses(
        (status = 200, description = "Recently started manga", body = MangaSummaryList),
        (status = 400, description = "num out of range", body = ApiError)
    )
)]
pub async fn recent(data: web::Data<AppState>, num: web::Path<u32>) -> AppResult<HttpResponse> {
    let limit = require_limit(num.into_inner())?;
    let result = data.catalog.recent(limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(MangaSummaryList { result })))
}

/// GET /manga/upcoming/{num} - Manga not yet published
#[utoipa::path(
    get,
    path = "/manga/upcoming/{num}",
    tag = "manga",
    params(("num" = u32, Path, description = "Number of results, 1 to 25")),
    responses(
        (status = 200, description = "Upcoming manga", body = MangaSummaryList),
        (status = 400, description = "num out of range", body = ApiError)
    )
)]
pub async fn upcoming(data: web::Data<AppState>, num: web::Path<u32>) -> AppResult<HttpResponse> {
    let limit = require_limit(num.into_inner())?;
    let result = data.catalog.upcoming(limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(MangaSummaryList { result })))
}

/// GET /comment/MockComments - Sample forum posts
#[utoipa::path(
    get,
    path = "/comment/MockComments",
    tag = "fixtures",
    responses((status = 200, description = "Forum posts with replies"))
)]
pub async fn mock_comments(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(&data.fixtures.comments))
}

/// GET /getProfileLists - Sample user profiles
#[utoipa::path(
    get,
    path = "/getProfileLists",
    tag = "fixtures",
    responses((status = 200, description = "Sample profiles"))
)]
pub async fn profile_lists(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(&data.fixtures.profile_list))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Manga Gateway API",
        version = "0.1.0",
        description = "Manga discovery backed by the Jikan catalog, with a follower graph and JWT auth",
        license(
            name = "MIT"
        )
    ),
    paths(
        index,
        health_check,
        db_health_check,
        manga_usage,
        search_manga,
        search_manga_raw,
        manga_by_id,
        manga_by_id_raw,
        top_match,
        recommendations,
        recommendations_by_genre,
        recent,
        upcoming,
        mock_comments,
        profile_lists,
        user::get_followers,
        user::get_following,
        user::get_profile_info,
        user::follow,
        user::unfollow,
        user::remove_follower,
        auth::signup,
        auth::login,
        auth::protected,
        auth::protected_profile
    ),
    components(
        schemas(
            MangaSummary,
            MangaSummaryList,
            MangaSummaryItem,
            User,
            PublicProfile,
            SignupRequest,
            LoginRequest,
            AuthData,
            FollowRequest,
            UnfollowRequest,
            RemoveRequest,
            SocialAck,
            ProtectedGreeting,
            ApiError
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "manga", description = "Catalog search and discovery"),
        (name = "user", description = "Follower graph"),
        (name = "auth", description = "Signup, login and protected routes"),
        (name = "fixtures", description = "Static sample data")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Configure API routes
///
/// Malformed path segments and JSON bodies are answered with the 400 envelope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid path parameter: {}", err)).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid request body: {}", err)).into()
    }))
    .route("/", web::get().to(index))
    .route("/health", web::get().to(health_check))
    .route("/health/db", web::get().to(db_health_check))
    .service(
        web::scope("/manga")
            .route("", web::get().to(manga_usage))
            .route("/search/id/{id}", web::get().to(manga_by_id))
            .route("/search/{entry}", web::get().to(search_manga))
            .route("/search2/id/{id}", web::get().to(manga_by_id_raw))
            .route("/search2/{entry}", web::get().to(search_manga_raw))
            .route("/mangasearch/{entry}", web::get().to(top_match))
            .route(
                "/recommendation/genre/{genreName}",
                web::get().to(recommendations_by_genre),
            )
            .route("/recommendation/{num}", web::get().to(recommendations))
            .route("/recent/{num}", web::get().to(recent))
            .route("/upcoming/{num}", web::get().to(upcoming)),
    )
    .route("/comment/MockComments", web::get().to(mock_comments))
    .route("/getProfileLists", web::get().to(profile_lists))
    .configure(user::configure_user_routes)
    .configure(auth::configure_auth_routes);
}


#[cfg(test)]
mod tests {
    use super::test_support::{test_app, test_state, TEST_BASE};
    use super::*;
    use crate::catalog::stub::{manga_json, StubTransport};
    use crate::constants::endpoints;
    use crate::db::InMemoryUserStore;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    fn empty_state() -> (Arc<StubTransport>, AppState) {
        let stub = Arc::new(StubTransport::new());
        let state = test_state(stub.clone(), Arc::new(InMemoryUserStore::new()));
        (stub, state)
    }

    #[actix_web::test]
    async fn test_index_is_plain_text() {
        let (_, state) = empty_state();
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get().uri("/").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = actix_test::read_body(resp).await;
        assert_eq!(body, "Server is working!!");
    }

    #[actix_web::test]
    async fn test_health_endpoints() {
        let (_, state) = empty_state();
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");

        let req = actix_test::TestRequest::get().uri("/health/db").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["database"], "connected");
    }

    #[actix_web::test]
    async fn test_search_and_search2_reflect_same_payload() {
        let (stub, state) = empty_state();
        let raw = json!({
            "data": [manga_json(13, "One Piece"), manga_json(21, "One Punch-Man")],
            "pagination": { "has_next_page": false }
        });
        stub.respond(&endpoints::search(TEST_BASE, "one"), raw.clone());
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get().uri("/manga/search/one").to_request();
        let shaped: Value = actix_test::call_and_read_body_json(&app, req).await;
        let req = actix_test::TestRequest::get().uri("/manga/search2/one").to_request();
        let unshaped: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(unshaped["data"], raw);

        let shaped_ids: Vec<u64> = shaped["data"]["result"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["malId"].as_u64().unwrap())
            .collect();
        let raw_ids: Vec<u64> = raw["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["mal_id"].as_u64().unwrap())
            .collect();
        assert_eq!(shaped_ids, raw_ids);
        assert_eq!(shaped["data"]["result"][0]["title"], "One Piece");
    }

    #[actix_web::test]
    async fn test_search_by_id_variants() {
        let (stub, state) = empty_state();
        let raw = json!({ "data": manga_json(2, "Berserk") });
        stub.respond(&endpoints::manga(TEST_BASE, 2), raw.clone());
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get().uri("/manga/search/id/2").to_request();
        let shaped: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(shaped["data"]["result"]["malId"], 2);
        assert_eq!(shaped["data"]["result"]["title"], "Berserk");

        let req = actix_test::TestRequest::get().uri("/manga/search2/id/2").to_request();
        let unshaped: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(unshaped["data"], raw);
    }

    #[actix_web::test]
    async fn test_non_numeric_ids_and_limits_are_bad_requests() {
        let (stub, state) = empty_state();
        let app = actix_test::init_service(test_app(state)).await;

        for uri in [
            "/manga/search/id/abc",
            "/manga/recommendation/ten",
            "/manga/recent/0",
            "/manga/upcoming/26",
        ] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = actix_test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
            assert!(body["data"].is_null());
        }
        assert!(stub.requests().is_empty());
    }

    #[actix_web::test]
    async fn test_mangasearch_fetches_detail_of_top_hit() {
        let (stub, state) = empty_state();
        stub.respond(
            &endpoints::search(TEST_BASE, "berserk"),
            json!({ "data": [manga_json(2, "Berserk"), manga_json(3, "Berserk: Prototype")] }),
        );
        let detail = json!({ "data": manga_json(2, "Berserk") });
        stub.respond(&endpoints::manga(TEST_BASE, 2), detail.clone());
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get()
            .uri("/manga/mangasearch/berserk")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"], detail);
        assert_eq!(
            stub.requests(),
            vec![
                endpoints::search(TEST_BASE, "berserk"),
                endpoints::manga(TEST_BASE, 2)
            ]
        );
    }

    #[actix_web::test]
    async fn test_recommendations_use_requested_limit() {
        let (stub, state) = empty_state();
        stub.respond(
            &endpoints::top_manga(TEST_BASE, 2),
            json!({ "data": [manga_json(1, "Monster"), manga_json(2, "Berserk")] }),
        );
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get()
            .uri("/manga/recommendation/2")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["result"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_unknown_genre_is_not_found() {
        let (stub, state) = empty_state();
        stub.respond(
            &endpoints::manga_genres(TEST_BASE),
            json!({ "data": [{ "mal_id": 1, "name": "Action" }] }),
        );
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get()
            .uri("/manga/recommendation/genre/Cooking")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (stub, state) = empty_state();
        stub.respond_status(&endpoints::recent(TEST_BASE, 5), 500);
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get().uri("/manga/recent/5").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_fixtures_identical_across_calls() {
        let (_, state) = empty_state();
        let app = actix_test::init_service(test_app(state)).await;

        for uri in ["/comment/MockComments", "/getProfileLists"] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let first = actix_test::call_and_read_body(&app, req).await;
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let second = actix_test::call_and_read_body(&app, req).await;

            assert_eq!(first, second);
            let body: Value = serde_json::from_slice(&first).unwrap();
            assert!(body["data"].as_array().is_some_and(|items| !items.is_empty()));
        }
    }

    #[actix_web::test]
    async fn test_manga_usage_hint() {
        let (_, state) = empty_state();
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get().uri("/manga").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert!(body["data"]["content"].is_string());
    }

    #[actix_web::test]
    async fn test_cors_preflight_is_allowed() {
        let (_, state) = empty_state();
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/user/1/follow")
            .insert_header(("Origin", "http://localhost:3000"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("http://localhost:3000")
        );
    }

    #[actix_web::test]
    async fn test_cors_headers_on_simple_request() {
        let (_, state) = empty_state();
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get()
            .uri("/health")
            .insert_header(("Origin", "http://localhost:3000"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/manga/search/{entry}"));
        assert!(doc.paths.paths.contains_key("/user/{id}/follow"));
        assert!(doc.paths.paths.contains_key("/protected"));
    }
}
