//! Axum HTTP server: stateless probability queries.
//!
//! Every endpoint reads from a shared [`RiskContext`], which caches round
//! tables, win grids and distribution memos per face count.
//!
//! ## Endpoints
//!
//! | Method | Path | Query | Description |
//! |--------|------|-------|-------------|
//! | GET | `/health` | | Health check |
//! | GET | `/round_probabilities` | `faces` | Per-round loss probabilities for every dice pairing |
//! | GET | `/win_grid` | `faces`, `size` | P(attacker wins) for attackers and defenders `1..=size` |
//! | GET | `/win_probability` | `faces`, `attackers`, `defenders` | One grid cell plus display text |
//! | GET | `/outcome_distribution` | `faces`, `attackers`, `defenders` | Survivor distributions and summary |
//!
//! Query integers are signed so that negative input reaches validation and
//! gets a 400 with a message instead of a generic parse rejection. Army sizes
//! are capped at [`MAX_API_ARMY_SIZE`] and dice at [`MAX_API_FACE_COUNT`]
//! faces; only the standard dice are cached by [`RiskContext`].

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::constants::{
    DEFAULT_FACE_COUNT, MAX_API_ARMY_SIZE, MAX_API_FACE_COUNT, MAX_ATTACKER_DICE, MAX_DEFENDER_DICE,
};
use crate::context::RiskContext;
use crate::error::RiskError;
use crate::report::{describe_win_probability, format_percentage, summarize_distribution};
use crate::selector::DiceSelection;
use crate::types::{self, ArmySide};

pub type AppState = Arc<RiskContext>;

pub fn create_router(ctx: Arc<RiskContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/round_probabilities", get(handle_get_round_probabilities))
        .route("/win_grid", get(handle_get_win_grid))
        .route("/win_probability", get(handle_get_win_probability))
        .route("/outcome_distribution", get(handle_get_outcome_distribution))
        .layer(cors)
        .with_state(ctx)
}

// ── Request/Response types ──────────────────────────────────────────

fn default_faces() -> i64 {
    DEFAULT_FACE_COUNT as i64
}

#[derive(Deserialize)]
struct FacesQuery {
    #[serde(default = "default_faces")]
    faces: i64,
}

#[derive(Deserialize)]
struct GridQuery {
    #[serde(default = "default_faces")]
    faces: i64,
    size: i64,
}

#[derive(Deserialize)]
struct BattleQuery {
    #[serde(default = "default_faces")]
    faces: i64,
    attackers: i64,
    defenders: i64,
}

#[derive(Serialize)]
struct RoundRow {
    attacker_dice: u32,
    defender_dice: u32,
    comparisons: u32,
    /// Indexed by attacker losses.
    probabilities: Vec<f64>,
}

#[derive(Serialize)]
struct SurvivorOutcome {
    survivors: u32,
    probability: f64,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(err: RiskError) -> ApiError {
    let status = match err {
        RiskError::Io(_) | RiskError::InvalidTableFile { .. } | RiskError::MalformedTable { .. } => {
            warn!(error = %err, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

/// Validate an army size from a query, bounding request cost.
fn api_army_size(side: ArmySide, value: i64) -> Result<u32, RiskError> {
    if value > MAX_API_ARMY_SIZE {
        return Err(RiskError::ArmySizeTooLarge {
            side,
            value,
            limit: MAX_API_ARMY_SIZE,
        });
    }
    types::army_size(side, value)
}

/// Validate a face count from a query, bounding table build cost.
fn api_face_count(value: i64) -> Result<u32, RiskError> {
    if value > MAX_API_FACE_COUNT {
        return Err(RiskError::FaceCountTooLarge {
            faces: value,
            limit: MAX_API_FACE_COUNT,
        });
    }
    types::face_count(value)
}

fn battle_params(q: &BattleQuery) -> Result<(u32, u32, u32), RiskError> {
    Ok((
        api_face_count(q.faces)?,
        api_army_size(ArmySide::Attacker, q.attackers)?,
        api_army_size(ArmySide::Defender, q.defenders)?,
    ))
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_get_round_probabilities(
    State(ctx): State<AppState>,
    Query(params): Query<FacesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let faces = api_face_count(params.faces).map_err(error_response)?;
    let table = ctx.round_table(faces).map_err(error_response)?;

    let mut rows = Vec::new();
    for attacker_dice in 1..=MAX_ATTACKER_DICE {
        for defender_dice in 1..=MAX_DEFENDER_DICE {
            let selection = DiceSelection {
                attacker_dice,
                defender_dice,
            };
            rows.push(RoundRow {
                attacker_dice,
                defender_dice,
                comparisons: selection.comparisons(),
                probabilities: table.outcome_probs(selection).to_vec(),
            });
        }
    }

    Ok(Json(serde_json::json!({
        "faces": faces,
        "rounds": rows,
    })))
}

async fn handle_get_win_grid(
    State(ctx): State<AppState>,
    Query(params): Query<GridQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let faces = api_face_count(params.faces).map_err(error_response)?;
    let size = api_army_size(ArmySide::Attacker, params.size).map_err(error_response)?;
    let grid = ctx.win_grid(faces, size).map_err(error_response)?;
    let rows = grid.to_rows(size).map_err(error_response)?;

    Ok(Json(serde_json::json!({
        "faces": faces,
        "size": size,
        "grid": rows,
    })))
}

async fn handle_get_win_probability(
    State(ctx): State<AppState>,
    Query(params): Query<BattleQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (faces, attackers, defenders) = battle_params(&params).map_err(error_response)?;
    let p = ctx
        .win_probability(faces, attackers, defenders)
        .map_err(error_response)?;

    Ok(Json(serde_json::json!({
        "faces": faces,
        "attackers": attackers,
        "defenders": defenders,
        "probability": p,
        "formatted": format_percentage(p),
        "description": describe_win_probability(attackers, defenders, p),
    })))
}

async fn handle_get_outcome_distribution(
    State(ctx): State<AppState>,
    Query(params): Query<BattleQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (faces, attackers, defenders) = battle_params(&params).map_err(error_response)?;
    let dist = ctx
        .outcome_distribution(faces, attackers, defenders)
        .map_err(error_response)?;

    let outcomes = |pairs: Vec<(u32, f64)>| -> Vec<SurvivorOutcome> {
        pairs
            .into_iter()
            .map(|(survivors, probability)| SurvivorOutcome {
                survivors,
                probability,
            })
            .collect()
    };

    Ok(Json(serde_json::json!({
        "faces": faces,
        "attackers": attackers,
        "defenders": defenders,
        "attacker_win_probability": dist.attacker_win_probability(),
        "defender_win_probability": dist.defender_win_probability(),
        "expected_attackers_if_win": dist.expected_attackers_if_win(),
        "expected_defenders_if_win": dist.expected_defenders_if_win(),
        "attacker_outcomes": outcomes(dist.attacker_outcomes()),
        "defender_outcomes": outcomes(dist.defender_outcomes()),
        "summary": summarize_distribution(&dist),
    })))
}
