//! Handlers for listing wizard drafts (`/drafts`) and wizard descriptions.
//!
//! A draft is the persisted form of a [`WizardState`]: every navigation or
//! edit endpoint restores the wizard from its row, applies one transition
//! and writes the snapshot back.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::copywriting::{apply_generated, build_prompt, max_chars, needs_copy, target_field};
use estate_core::draft::{progress, restore_wizard, summary_title, validate_snapshot, DraftProgress};
use estate_core::error::{CoreError, FieldErrors};
use estate_core::listing::ListingKind;
use estate_core::types::{DbId, DraftId, Timestamp};
use estate_core::wizard::form::check_storable;
use estate_core::wizard::steps::{describe, StepInfo};
use estate_core::wizard::submission::{submit as submit_wizard, SubmissionError};
use estate_core::wizard::{into_form_data, FormData, WizardState};
use estate_db::models::draft::{ListingDraft, SaveDraft};
use estate_db::repositories::{CreatedListing, DraftRepo, SubmissionRepo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::locale::RequestLocale;
use crate::middleware::rbac::RequireAgent;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /drafts`.
#[derive(Debug, Default, Deserialize)]
pub struct DraftListParams {
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `PUT /drafts/{id}/step`.
#[derive(Debug, Deserialize)]
pub struct SetStepRequest {
    pub step: i32,
}

/// Query parameters for `POST /drafts/{id}/validate`.
#[derive(Debug, Default, Deserialize)]
pub struct ValidateParams {
    /// Validate every step instead of only the current one.
    #[serde(default)]
    pub all: bool,
}

/// A draft as returned by the API, with wizard position details.
#[derive(Debug, Serialize)]
pub struct DraftView {
    pub id: DraftId,
    pub kind: ListingKind,
    pub form_data: FormData,
    pub current_step: u8,
    pub total_steps: u8,
    pub is_first_step: bool,
    pub is_last_step: bool,
    pub title: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DraftView {
    fn new(row: &ListingDraft, wizard: WizardState) -> Self {
        Self {
            id: row.id,
            kind: wizard.kind,
            current_step: wizard.current_step,
            total_steps: wizard.total_steps(),
            is_first_step: wizard.is_first_step(),
            is_last_step: wizard.is_last_step(),
            title: wizard.title().map(str::to_string),
            form_data: wizard.form_data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One entry of `GET /drafts`.
#[derive(Debug, Serialize)]
pub struct DraftSummary {
    pub id: DraftId,
    pub kind: ListingKind,
    pub title: Option<String>,
    #[serde(flatten)]
    pub progress: DraftProgress,
    pub updated_at: Timestamp,
}

/// Outcome of `POST /drafts/{id}/validate`.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Step that was checked, or `None` when every step was.
    pub step: Option<u8>,
    pub valid: bool,
    pub errors: FieldErrors,
    pub is_complete: bool,
}

/// Outcome of `POST /drafts/{id}/generate-description`.
#[derive(Debug, Serialize)]
pub struct GenerationOutcome {
    pub generated: bool,
    pub field: &'static str,
    pub draft: DraftView,
}

/// Description of one wizard kind, for clients rendering the steps.
#[derive(Debug, Serialize)]
pub struct WizardDescription {
    pub kind: ListingKind,
    pub total_steps: u8,
    pub steps: Vec<StepInfo>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn draft_not_found(id: DraftId) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "Draft",
        key: id.to_string(),
    })
}

/// Load a draft owned by `owner_id` and rebuild its wizard.
async fn load_wizard(
    state: &AppState,
    id: DraftId,
    owner_id: DbId,
) -> AppResult<(ListingDraft, WizardState)> {
    let row = DraftRepo::find_for_owner(&state.pool, id, owner_id)
        .await?
        .ok_or_else(|| draft_not_found(id))?;
    let wizard = restore_wizard(row.id, &row.kind, row.form_data.clone(), row.current_step)
        .inspect_err(|e| tracing::warn!(draft_id = %id, error = %e, "Stored draft is malformed"))?;
    Ok((row, wizard))
}

/// Write the wizard's snapshot back to its draft row.
async fn persist(
    state: &AppState,
    id: DraftId,
    owner_id: DbId,
    mut wizard: WizardState,
) -> AppResult<DraftView> {
    let form_data = Value::Object(wizard.form_data.clone());
    let row = DraftRepo::update(
        &state.pool,
        id,
        owner_id,
        &form_data,
        i32::from(wizard.current_step),
    )
    .await?
    .ok_or_else(|| draft_not_found(id))?;
    wizard.mark_saved();
    Ok(DraftView::new(&row, wizard))
}

fn parse_kind(kind: &str) -> AppResult<ListingKind> {
    Ok(ListingKind::from_str_db(kind)?)
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// POST /api/v1/drafts
///
/// Without `id` a new draft is created (201); with one, that draft is
/// overwritten (200). Another user's id behaves as missing.
pub async fn save(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Json(input): Json<SaveDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftView>>)> {
    let kind = parse_kind(&input.kind)?;
    let step = validate_snapshot(kind, &input.form_data, input.current_step, locale)?;

    let (status, row) = match input.id {
        None => {
            let row = DraftRepo::create(
                &state.pool,
                DraftId::now_v7(),
                kind.as_str(),
                &input.form_data,
                i32::from(step),
                user.user_id,
            )
            .await?;
            tracing::info!(
                draft_id = %row.id,
                kind = kind.as_str(),
                user_id = user.user_id,
                "Draft created"
            );
            (StatusCode::CREATED, row)
        }
        Some(id) => {
            let existing = DraftRepo::find_for_owner(&state.pool, id, user.user_id)
                .await?
                .ok_or_else(|| draft_not_found(id))?;
            if existing.kind != kind.as_str() {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Draft {id} is a {} draft, not {}",
                    existing.kind,
                    kind.as_str()
                ))));
            }
            let row = DraftRepo::update(
                &state.pool,
                id,
                user.user_id,
                &input.form_data,
                i32::from(step),
            )
            .await?
            .ok_or_else(|| draft_not_found(id))?;
            tracing::info!(draft_id = %id, step, user_id = user.user_id, "Draft saved");
            (StatusCode::OK, row)
        }
    };

    let wizard = restore_wizard(row.id, &row.kind, row.form_data.clone(), row.current_step)?;
    Ok((status, Json(DataResponse { data: DraftView::new(&row, wizard) })))
}

/// GET /api/v1/drafts
///
/// The caller's drafts, most recently updated first.
pub async fn list(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Query(params): Query<DraftListParams>,
) -> AppResult<Json<PageResponse<DraftSummary>>> {
    let kind = params.kind.as_deref().map(parse_kind).transpose()?;
    let (limit, offset) = crate::query::PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let kind_filter = kind.map(|k| k.as_str());

    let rows =
        DraftRepo::list_summaries(&state.pool, user.user_id, kind_filter, limit, offset).await?;
    let total = DraftRepo::count_for_owner(&state.pool, user.user_id, kind_filter).await?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        let Ok(kind) = ListingKind::from_str_db(&row.kind) else {
            tracing::warn!(draft_id = %row.id, kind = %row.kind, "Skipping draft of unknown kind");
            continue;
        };
        let step = u8::try_from(row.current_step).unwrap_or(u8::MAX);
        data.push(DraftSummary {
            id: row.id,
            kind,
            title: summary_title(row.title.as_deref()),
            progress: progress(kind, step),
            updated_at: row.updated_at,
        });
    }

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/drafts/{id}
pub async fn get_by_id(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DraftId>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let (row, wizard) = load_wizard(&state, id, user.user_id).await?;
    Ok(Json(DataResponse {
        data: DraftView::new(&row, wizard),
    }))
}

/// DELETE /api/v1/drafts/{id}
pub async fn delete(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DraftId>,
) -> AppResult<StatusCode> {
    if DraftRepo::delete(&state.pool, id, user.user_id).await? {
        tracing::info!(draft_id = %id, user_id = user.user_id, "Draft deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(draft_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Wizard transitions
// ---------------------------------------------------------------------------

/// PATCH /api/v1/drafts/{id}/form-data
///
/// Shallow-merge a partial update; `null` clears a field. Only values that
/// cannot be stored are rejected; step rules are not checked.
pub async fn update_form_data(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DraftId>,
    Json(partial): Json<Value>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let partial = into_form_data(partial)?;
    check_storable(&partial, locale)?;
    let (_, mut wizard) = load_wizard(&state, id, user.user_id).await?;
    wizard.update_form_data(Value::Object(partial))?;
    let view = persist(&state, id, user.user_id, wizard).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/drafts/{id}/step
///
/// Jump to any step of the wizard without validating.
pub async fn set_step(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DraftId>,
    Json(input): Json<SetStepRequest>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let (_, mut wizard) = load_wizard(&state, id, user.user_id).await?;
    let step = u8::try_from(input.step)
        .map_err(|_| CoreError::Validation(format!("Step {} is out of range", input.step)))?;
    wizard.set_current_step(step)?;
    let view = persist(&state, id, user.user_id, wizard).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/drafts/{id}/next
///
/// Advance only if the current step validates; otherwise 400 with the
/// step's field errors and the draft is left as it was.
pub async fn next_step(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DraftId>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let (_, mut wizard) = load_wizard(&state, id, user.user_id).await?;
    if !wizard.next_step(locale)? {
        tracing::debug!(draft_id = %id, step = wizard.current_step, "Step did not validate");
        return Err(AppError::Core(CoreError::InvalidFields(wizard.errors)));
    }
    let view = persist(&state, id, user.user_id, wizard).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/drafts/{id}/previous
pub async fn previous_step(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DraftId>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let (_, mut wizard) = load_wizard(&state, id, user.user_id).await?;
    wizard.previous_step()?;
    let view = persist(&state, id, user.user_id, wizard).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/drafts/{id}/validate
///
/// Report on the current step (or every step with `?all=true`). Read-only.
pub async fn validate(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DraftId>,
    Query(params): Query<ValidateParams>,
) -> AppResult<Json<DataResponse<ValidationReport>>> {
    let (_, mut wizard) = load_wizard(&state, id, user.user_id).await?;

    let (step, valid) = if params.all {
        (None, wizard.validate_all(locale))
    } else {
        (Some(wizard.current_step), wizard.validate_current_step(locale))
    };

    Ok(Json(DataResponse {
        data: ValidationReport {
            step,
            valid,
            is_complete: wizard.is_complete(),
            errors: wizard.errors,
        },
    }))
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/drafts/{id}/submit
///
/// Validates every step; on success creates the listing and deletes the
/// draft in one transaction. Invalid drafts get 400 with field errors and
/// nothing is written.
pub async fn submit(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DraftId>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedListing>>)> {
    let (_, mut wizard) = load_wizard(&state, id, user.user_id).await?;
    let owner_id = user.user_id;

    let outcome = submit_wizard(&mut wizard, locale, |payload| {
        let pool = state.pool.clone();
        async move { SubmissionRepo::submit_draft(&pool, id, owner_id, &payload).await }
    })
    .await;

    let created = match outcome {
        Ok(Some(created)) => created,
        Ok(None) => return Err(draft_not_found(id)),
        Err(SubmissionError::Invalid(errors)) => {
            tracing::info!(draft_id = %id, fields = errors.len(), "Draft submission rejected");
            return Err(AppError::Core(CoreError::InvalidFields(errors)));
        }
        Err(SubmissionError::Failed(e)) => {
            tracing::error!(draft_id = %id, error = %e, "Draft submission failed");
            return Err(AppError::Database(e));
        }
    };

    tracing::info!(
        draft_id = %id,
        kind = created.kind().as_str(),
        listing_id = created.id(),
        slug = created.slug(),
        user_id = user.user_id,
        "Draft submitted"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// Description generation
// ---------------------------------------------------------------------------

/// POST /api/v1/drafts/{id}/generate-description
///
/// Fills the description (or a post's excerpt) only when blank. Any
/// generation failure leaves the draft unchanged and reports
/// `generated: false`.
pub async fn generate_description(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DraftId>,
) -> AppResult<Json<DataResponse<GenerationOutcome>>> {
    let (row, mut wizard) = load_wizard(&state, id, user.user_id).await?;
    let kind = wizard.kind;
    let field = target_field(kind);

    if !needs_copy(kind, &wizard.form_data) {
        return Ok(Json(DataResponse {
            data: GenerationOutcome {
                generated: false,
                field,
                draft: DraftView::new(&row, wizard),
            },
        }));
    }

    let prompt = build_prompt(kind, &wizard.form_data, locale);
    let text = match state
        .copywriter
        .generate(&prompt, max_chars(kind), locale.as_str())
        .await
    {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(draft_id = %id, error = %e, "Description generation failed");
            None
        }
    };

    let mut filled = wizard.form_data.clone();
    let generated = text.is_some_and(|t| apply_generated(kind, &mut filled, &t));
    if !generated {
        return Ok(Json(DataResponse {
            data: GenerationOutcome {
                generated,
                field,
                draft: DraftView::new(&row, wizard),
            },
        }));
    }

    wizard.update_form_data(Value::Object(filled))?;
    let draft = persist(&state, id, user.user_id, wizard).await?;
    tracing::info!(draft_id = %id, field, "Generated listing copy");

    Ok(Json(DataResponse {
        data: GenerationOutcome {
            generated,
            field,
            draft,
        },
    }))
}

// ---------------------------------------------------------------------------
// Wizard descriptions
// ---------------------------------------------------------------------------

/// GET /api/v1/wizards/{kind}
pub async fn describe_wizard(
    RequestLocale(locale): RequestLocale,
    Path(kind): Path<String>,
) -> AppResult<Json<DataResponse<WizardDescription>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(DataResponse {
        data: WizardDescription {
            kind,
            total_steps: estate_core::wizard::steps::total_steps(kind),
            steps: describe(kind, locale),
        },
    }))
}
