#![cfg(feature = "web")]

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::cache::TtlCache;
use crate::catalog::{Catalog, SpecFilter, author_names, authored_by};
use crate::config::Config;
use crate::error::{Result, SpecsError};
use crate::google::DocumentStore;
use crate::session::{self, OAuthClient, SESSION_COOKIE, SessionUser};
use crate::spec::{CatalogSpec, SpecDetails};

/// Body of every failed detail fetch; the cause only goes to the log.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching document, try again.";

/// Group heading for specs that live outside any team folder.
pub const OTHER_TEAM: &str = "Other";

const INDEX_TEMPLATE: &str = "index";
const ALL_SPECS_TITLE: &str = "All specs";
const MY_SPECS_TITLE: &str = "My specs";

pub type SharedStore = Arc<dyn DocumentStore + Send + Sync>;

/// Choices offered by the listing's filter form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub teams: Vec<String>,
    pub statuses: Vec<String>,
    pub types: Vec<String>,
    pub authors: Vec<String>,
}

/// Shared application state
///
/// Built once at startup; the catalog never changes for the life of the process.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    /// Catalog records with authors unified across the whole catalog.
    pub specs: Vec<CatalogSpec>,
    pub filters: FilterOptions,
    /// `None` when no Google credentials are configured.
    pub store: Option<SharedStore>,
    pub details: TtlCache<String, SpecDetails>,
    pub oauth: Option<OAuthClient>,
    templates: Handlebars<'static>,
}

impl AppState {
    /// Build the state served by [`router`]
    ///
    /// Normalizes authors across the catalog, collects the filter choices and
    /// compiles the page template.
    ///
    /// # Arguments
    /// * `config` - Runtime configuration
    /// * `catalog` - The exported catalog
    /// * `store` - Document access for the detail endpoint, if credentials exist
    /// * `oauth` - Google sign-in client, if configured
    ///
    /// # Returns
    /// * `Result<AppState>` - The state, or a template error
    pub fn new(
        config: Config,
        catalog: Catalog,
        store: Option<SharedStore>,
        oauth: Option<OAuthClient>,
    ) -> Result<Self> {
        let mut templates = Handlebars::new();
        templates
            .register_template_string(INDEX_TEMPLATE, include_str!("../templates/index.html.hbs"))
            .map_err(|e| SpecsError::Template(e.to_string()))?;

        let specs = catalog.normalized();
        let filters = FilterOptions {
            teams: catalog.teams(),
            statuses: catalog.statuses(),
            types: catalog.types(),
            authors: author_names(&specs),
        };
        let details = TtlCache::new(config.cache_capacity, config.cache_ttl());

        Ok(AppState {
            config,
            catalog,
            specs,
            filters,
            store,
            details,
            oauth,
            templates,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TeamGroup<'a> {
    pub team: String,
    pub specs: Vec<&'a CatalogSpec>,
}

/// Specs grouped by team folder, teams sorted, unfiled specs last under "Other".
pub fn group_by_team<'a, I>(specs: I) -> Vec<TeamGroup<'a>>
where
    I: IntoIterator<Item = &'a CatalogSpec>,
{
    let mut teams: BTreeMap<&str, Vec<&'a CatalogSpec>> = BTreeMap::new();
    let mut other = Vec::new();
    for spec in specs {
        if spec.folder_name.is_empty() {
            other.push(spec);
        } else {
            teams.entry(spec.folder_name.as_str()).or_default().push(spec);
        }
    }

    let mut groups: Vec<TeamGroup<'a>> = teams
        .into_iter()
        .map(|(team, specs)| TeamGroup {
            team: team.to_string(),
            specs,
        })
        .collect();
    if !other.is_empty() {
        groups.push(TeamGroup {
            team: OTHER_TEAM.to_string(),
            specs: other,
        });
    }
    groups
}

pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/my-specs", get(my_specs))
        .route_layer(middleware::from_fn(session::require_auth));

    Router::new()
        .route("/", get(index))
        .route("/spec/:code", get(spec_redirect))
        .route("/spec-details/:id", get(spec_details))
        .route("/_status/check", get(status_check))
        .route("/auth/google/login", get(session::handle_login))
        .route("/auth/google/callback", get(session::handle_callback))
        .route("/logout", get(session::handle_logout))
        .merge(protected)
        .nest_service("/static", ServeDir::new("static"))
        .layer(middleware::from_fn(no_cache))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let address = state.config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    log::info!("listening on {}", address);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn no_cache(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}

fn render_listing(
    state: &AppState,
    title: &str,
    user: Option<&SessionUser>,
    filter: &SpecFilter,
    specs: Vec<&CatalogSpec>,
) -> Response {
    let specs = filter.apply(specs);
    let action = if title == MY_SPECS_TITLE { "/my-specs" } else { "/" };
    let data = json!({
        "title": title,
        "action": action,
        "user": user,
        "filter": filter,
        "filters": &state.filters,
        "filtered": !filter.is_empty(),
        "count": specs.len(),
        "groups": group_by_team(specs),
    });

    match state.templates.render(INDEX_TEMPLATE, &data) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("failed to render listing: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(filter): Query<SpecFilter>,
) -> Response {
    let user = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| session::validate_session(cookie.value()));

    render_listing(
        &state,
        ALL_SPECS_TITLE,
        user.as_ref(),
        &filter,
        state.specs.iter().collect(),
    )
}

async fn my_specs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(filter): Query<SpecFilter>,
) -> Response {
    let specs = authored_by(&state.specs, &user.name, &user.email);
    render_listing(&state, MY_SPECS_TITLE, Some(&user), &filter, specs)
}

async fn spec_redirect(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    match state.catalog.find_by_index(&code) {
        Some(record) => {
            (StatusCode::FOUND, [(header::LOCATION, record.file_url.clone())]).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Spec not found").into_response(),
    }
}

async fn spec_details(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    if let Some(details) = state.details.get(&id) {
        return Json(details).into_response();
    }

    let Some(store) = state.store.clone() else {
        log::error!("error fetching document {}: {}", id, SpecsError::MissingCredentials);
        return (StatusCode::INTERNAL_SERVER_ERROR, FETCH_ERROR_MESSAGE).into_response();
    };

    let document_id = id.clone();
    let fetched =
        tokio::task::spawn_blocking(move || SpecDetails::fetch(store.as_ref(), &document_id)).await;

    match fetched {
        Ok(Ok(details)) => {
            state.details.insert(id, details.clone());
            Json(details).into_response()
        }
        Ok(Err(e)) => {
            log::error!("error fetching document {}: {}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, FETCH_ERROR_MESSAGE).into_response()
        }
        Err(e) => {
            log::error!("document fetch for {} did not complete: {}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, FETCH_ERROR_MESSAGE).into_response()
        }
    }
}

async fn status_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecRecord;

    fn spec(folder: &str, index: &str) -> CatalogSpec {
        CatalogSpec::from_record(&SpecRecord {
            folder_name: folder.to_string(),
            index: index.to_string(),
            ..SpecRecord::default()
        })
    }

    #[test]
    fn teams_are_sorted_with_other_last() {
        let specs = vec![spec("Web", "WB001"), spec("", "XX001"), spec("Api", "AP001")];
        let groups = group_by_team(&specs);

        let names: Vec<&str> = groups.iter().map(|g| g.team.as_str()).collect();
        assert_eq!(names, vec!["Api", "Web", "Other"]);
        assert_eq!(groups[2].specs[0].index, "XX001");
    }

    #[test]
    fn no_other_group_without_unfiled_specs() {
        let specs = vec![spec("Web", "WB001")];
        let groups = group_by_team(&specs);
        assert_eq!(groups.len(), 1);
    }
}
