//! Automation catalogue HTTP handlers.
//!
//! ```text
//! GET    /api/v1/automations
//! GET    /api/v1/automations/trending
//! GET    /api/v1/automations/{slug}
//! POST   /api/v1/automations
//! PUT    /api/v1/automations/{id}
//! DELETE /api/v1/automations/{id}
//! GET    /api/v1/me/automations
//! GET    /api/v1/me/automations/{id}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::automation::{Automation, AutomationForm, AutomationId};
use crate::domain::ports::{
    AutomationListing, ListAutomationsRequest, ListingOrder,
};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_field_error;

/// Default number of entries on the trending rail.
const DEFAULT_TRENDING_LIMIT: usize = 6;

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Free-text search term.
    pub search: Option<String>,
    /// Ordering: `new` (default) or `top`.
    pub order: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// Query parameters accepted by the trending endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendingQuery {
    /// Maximum number of results (default 6).
    pub limit: Option<usize>,
}

/// Submission form payload.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutomationFormRequest {
    /// Title field.
    pub title: Option<String>,
    /// Summary field.
    pub summary: Option<String>,
    /// Markdown description field.
    pub description: Option<String>,
    /// Prompt field.
    pub prompt: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
}

impl From<AutomationFormRequest> for AutomationForm {
    fn from(value: AutomationFormRequest) -> Self {
        Self {
            title: value.title.unwrap_or_default(),
            summary: value.summary.unwrap_or_default(),
            description: value.description.unwrap_or_default(),
            prompt: value.prompt.unwrap_or_default(),
            tags: value.tags.unwrap_or_default(),
        }
    }
}

/// Author fields rendered on cards.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    /// Author user id.
    pub id: String,
    /// Display name, if set.
    pub name: Option<String>,
    /// Avatar reference, if set.
    pub avatar_url: Option<String>,
}

/// One automation with everything a card or detail page renders.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutomationListingResponse {
    /// Automation id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// One-line summary.
    pub summary: Option<String>,
    /// Markdown description.
    pub description: Option<String>,
    /// Prompt payload.
    pub prompt: String,
    /// Normalised tags.
    pub tags: Vec<String>,
    /// URL-safe slug.
    pub slug: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last-update timestamp (RFC 3339).
    pub updated_at: String,
    /// Joined author fields.
    pub author: Option<AuthorResponse>,
    /// All-time signed vote total.
    pub vote_total: i64,
    /// Signed vote total over the trailing seven days.
    pub recent_votes: i64,
    /// The viewer's own vote: 1, -1, or 0.
    pub user_vote: i16,
}

impl From<AutomationListing> for AutomationListingResponse {
    fn from(value: AutomationListing) -> Self {
        let AutomationListing {
            automation,
            author,
            statistics,
            viewer_vote,
        } = value;
        Self {
            id: automation.id.to_string(),
            title: automation.title,
            summary: automation.summary,
            description: automation.description,
            prompt: automation.prompt,
            tags: automation.tags,
            slug: automation.slug,
            created_at: automation.created_at.to_rfc3339(),
            updated_at: automation.updated_at.to_rfc3339(),
            author: author.map(|author| AuthorResponse {
                id: author.id.to_string(),
                name: author.name,
                avatar_url: author.avatar_url,
            }),
            vote_total: statistics.vote_total,
            recent_votes: statistics.recent_votes,
            user_vote: viewer_vote,
        }
    }
}

/// An automation as its owner sees it in the edit flow.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutomationResponse {
    /// Automation id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// One-line summary.
    pub summary: Option<String>,
    /// Markdown description.
    pub description: Option<String>,
    /// Prompt payload.
    pub prompt: String,
    /// Normalised tags.
    pub tags: Vec<String>,
    /// URL-safe slug.
    pub slug: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last-update timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<Automation> for AutomationResponse {
    fn from(value: Automation) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            summary: value.summary,
            description: value.description,
            prompt: value.prompt,
            tags: value.tags,
            slug: value.slug,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Body returned by a successful submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    /// Generated slug for redirects.
    pub slug: String,
    /// The stored automation.
    pub automation: AutomationResponse,
}

fn parse_order(raw: Option<&str>) -> Result<ListingOrder, Error> {
    match raw {
        None | Some("new") => Ok(ListingOrder::New),
        Some("top") => Ok(ListingOrder::Top),
        Some(other) => Err(invalid_field_error(
            "order",
            "order must be new or top",
            other,
        )),
    }
}

fn parse_automation_id(raw: &str) -> Result<AutomationId, Error> {
    AutomationId::from_str(raw)
        .map_err(|_| invalid_field_error("id", "automation id must be a UUID", raw))
}

fn listing_body(listings: Vec<AutomationListing>) -> Vec<AutomationListingResponse> {
    listings
        .into_iter()
        .map(AutomationListingResponse::from)
        .collect()
}

/// Browse the automation catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/automations",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching automations", body = [AutomationListingResponse]),
        (status = 400, description = "Invalid query", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 503, description = "Store unreachable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["automations"],
    operation_id = "listAutomations"
)]
#[get("/automations")]
pub async fn list_automations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let viewer = session.user_id()?;
    let query = query.into_inner();
    let request = ListAutomationsRequest {
        order: parse_order(query.order.as_deref())?,
        search: query.search.filter(|term| !term.trim().is_empty()),
        limit: query.limit,
    };
    let listings = state.automations_query.list(viewer, &request).await?;
    Ok(HttpResponse::Ok().json(listing_body(listings)))
}

/// The automations with the highest recent vote velocity.
#[utoipa::path(
    get,
    path = "/api/v1/automations/trending",
    params(TrendingQuery),
    responses(
        (status = 200, description = "Trending automations", body = [AutomationListingResponse])
    ),
    tags = ["automations"],
    operation_id = "trendingAutomations"
)]
#[get("/automations/trending")]
pub async fn trending_automations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TrendingQuery>,
) -> ApiResult<HttpResponse> {
    let viewer = session.user_id()?;
    let limit = query.limit.unwrap_or(DEFAULT_TRENDING_LIMIT);
    let listings = state.automations_query.trending(viewer, limit).await?;
    Ok(HttpResponse::Ok().json(listing_body(listings)))
}

/// One automation by slug.
#[utoipa::path(
    get,
    path = "/api/v1/automations/{slug}",
    params(("slug" = String, Path, description = "Automation slug")),
    responses(
        (status = 200, description = "The automation", body = AutomationListingResponse),
        (status = 404, description = "Unknown slug", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["automations"],
    operation_id = "getAutomationBySlug"
)]
#[get("/automations/{slug}")]
pub async fn get_automation_by_slug(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let viewer = session.user_id()?;
    let listing = state
        .automations_query
        .get_by_slug(viewer, &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(AutomationListingResponse::from(listing)))
}

/// Submit a new automation.
#[utoipa::path(
    post,
    path = "/api/v1/automations",
    request_body = AutomationFormRequest,
    responses(
        (status = 201, description = "Automation published", body = CreatedResponse),
        (status = 400, description = "Validation failed", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["automations"],
    operation_id = "createAutomation"
)]
#[post("/automations")]
pub async fn create_automation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AutomationFormRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let created = state
        .automations_command
        .create(&owner, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(CreatedResponse {
        slug: created.slug,
        automation: created.automation.into(),
    }))
}

/// Update an owned automation.
#[utoipa::path(
    put,
    path = "/api/v1/automations/{id}",
    params(("id" = String, Path, description = "Automation id")),
    request_body = AutomationFormRequest,
    responses(
        (status = 200, description = "Updated automation", body = AutomationResponse),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Not the creator", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Unknown automation", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["automations"],
    operation_id = "updateAutomation"
)]
#[put("/automations/{id}")]
pub async fn update_automation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AutomationFormRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let id = parse_automation_id(&path.into_inner())?;
    let automation = state
        .automations_command
        .update(&id, &owner, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(AutomationResponse::from(automation)))
}

/// Delete an owned automation.
#[utoipa::path(
    delete,
    path = "/api/v1/automations/{id}",
    params(("id" = String, Path, description = "Automation id")),
    responses(
        (status = 204, description = "Automation deleted"),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Not the creator", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Unknown automation", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["automations"],
    operation_id = "deleteAutomation"
)]
#[delete("/automations/{id}")]
pub async fn delete_automation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let id = parse_automation_id(&path.into_inner())?;
    state.automations_command.delete(&id, &owner).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller's own automations for the dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/me/automations",
    responses(
        (status = 200, description = "Own automations", body = [AutomationListingResponse]),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["automations"],
    operation_id = "listOwnAutomations"
)]
#[get("/me/automations")]
pub async fn list_own_automations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let listings = state.automations_query.list_mine(&owner).await?;
    Ok(HttpResponse::Ok().json(listing_body(listings)))
}

/// One owned automation for the edit form.
#[utoipa::path(
    get,
    path = "/api/v1/me/automations/{id}",
    params(("id" = String, Path, description = "Automation id")),
    responses(
        (status = 200, description = "The automation", body = AutomationResponse),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Unknown or foreign automation", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["automations"],
    operation_id = "getAutomationForEditing"
)]
#[get("/me/automations/{id}")]
pub async fn get_automation_for_editing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let id = parse_automation_id(&path.into_inner())?;
    let automation = state
        .automations_query
        .get_for_editing(&id, &owner)
        .await?;
    Ok(HttpResponse::Ok().json(AutomationResponse::from(automation)))
}
