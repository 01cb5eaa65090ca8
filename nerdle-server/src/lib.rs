use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::websocket::ConnectionManager;
use nerdle_core::{NerdleStore, SessionSettings, StoreError, missing_players, today_rows, today_start};
use nerdle_types::{LeaderboardEntry, ScoreValue, SubmissionError, TodayScoreRow, WordSubmissionError};

pub mod config;
pub mod websocket;

type JsonReply = WithStatus<Json>;

#[derive(Debug, Deserialize, Serialize)]
pub struct ScoreRequest {
    pub player: String,
    /// "1".."6" or "X"
    pub score: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub scores: Vec<TodayScoreRow>,
    pub missing_players: Vec<String>,
    pub deadline: String,
}

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    store: Arc<dyn NerdleStore>,
    settings: SessionSettings,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let store_filter = warp::any().map({
        let store = store.clone();
        move || store.clone()
    });

    let settings_filter = warp::any().map({
        let settings = settings.clone();
        move || settings.clone()
    });

    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter)
        .and(store_filter.clone())
        .and(settings_filter.clone())
        .map(
            |ws: warp::ws::Ws,
             conn_mgr: Arc<ConnectionManager>,
             store: Arc<dyn NerdleStore>,
             settings: SessionSettings| {
                ws.on_upgrade(move |socket| {
                    websocket::handle_connection(socket, conn_mgr, store, settings)
                })
            },
        );

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let week = warp::path!("week")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(handle_week_request);

    let players = warp::path!("players")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(handle_players_request);

    let today = warp::path!("today")
        .and(warp::get())
        .and(store_filter.clone())
        .and(settings_filter)
        .and_then(handle_today_request);

    let leaderboard = warp::path!("leaderboard")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(handle_leaderboard_request);

    let words = warp::path!("words")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(handle_words_request);

    let submit_score = warp::path!("scores")
        .and(warp::post())
        .and(warp::body::content_length_limit(4 * 1024))
        .and(warp::body::json::<ScoreRequest>())
        .and(store_filter.clone())
        .and_then(handle_submit_score_request);

    let submit_word = warp::path!("words")
        .and(warp::post())
        .and(warp::body::content_length_limit(4 * 1024))
        .and(warp::body::json::<WordRequest>())
        .and(store_filter)
        .and_then(handle_submit_word_request);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    websocket
        .or(health)
        .or(week)
        .or(players)
        .or(today)
        .or(leaderboard)
        .or(words)
        .or(submit_score)
        .or(submit_word)
        .with(cors)
        .with(warp::log("nerdle_server"))
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> JsonReply {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn error_reply(message: impl Into<String>, status: StatusCode) -> JsonReply {
    let message = message.into();
    json_reply(&serde_json::json!({ "error": message }), status)
}

fn unavailable(what: &str, err: StoreError) -> JsonReply {
    tracing::error!("Failed to fetch {}: {}", what, err);
    error_reply(
        format!("Failed to fetch {}", what),
        StatusCode::SERVICE_UNAVAILABLE,
    )
}

async fn handle_week_request(
    store: Arc<dyn NerdleStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match store.current_week().await {
        Ok(week) => json_reply(&week, StatusCode::OK),
        Err(err) => unavailable("current week", err),
    })
}

async fn handle_players_request(
    store: Arc<dyn NerdleStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match store.players().await {
        Ok(players) => json_reply(&players, StatusCode::OK),
        Err(err) => unavailable("players", err),
    })
}

async fn handle_today_request(
    store: Arc<dyn NerdleStore>,
    settings: SessionSettings,
) -> Result<impl warp::Reply, warp::Rejection> {
    let scores = match store.scores_since(today_start()).await {
        Ok(scores) => scores,
        Err(err) => return Ok(unavailable("today's scores", err)),
    };
    let players = match store.players().await {
        Ok(players) => players,
        Err(err) => return Ok(unavailable("players", err)),
    };

    let response = TodayResponse {
        scores: today_rows(&scores),
        missing_players: missing_players(&players, &scores),
        deadline: settings.submission_deadline,
    };
    Ok(json_reply(&response, StatusCode::OK))
}

async fn handle_leaderboard_request(
    store: Arc<dyn NerdleStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let week = match store.current_week().await {
        Ok(week) => week,
        Err(err) => return Ok(unavailable("current week", err)),
    };

    Ok(match store.weekly_standings(week.week_number).await {
        Ok(standings) => json_reply(&LeaderboardEntry::rank_all(&standings), StatusCode::OK),
        Err(err) => unavailable("leaderboard", err),
    })
}

async fn handle_words_request(
    store: Arc<dyn NerdleStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match store.used_words().await {
        Ok(words) => json_reply(&words, StatusCode::OK),
        Err(err) => unavailable("used words", err),
    })
}

async fn handle_submit_score_request(
    request: ScoreRequest,
    store: Arc<dyn NerdleStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let score = match request.score.parse::<ScoreValue>() {
        Ok(score) => score,
        Err(err) => return Ok(error_reply(err.to_string(), StatusCode::BAD_REQUEST)),
    };

    let week = match store.current_week().await {
        Ok(week) => week,
        Err(err) => return Ok(unavailable("current week", err)),
    };

    Ok(
        match nerdle_core::submit_score(store.as_ref(), &request.player, Some(score), week.week_number)
            .await
        {
            Ok(entry) => json_reply(&entry, StatusCode::CREATED),
            Err(err @ (SubmissionError::MissingPlayer | SubmissionError::MissingScore)) => {
                error_reply(err.to_string(), StatusCode::BAD_REQUEST)
            }
            Err(err) => error_reply(err.user_notice(), StatusCode::SERVICE_UNAVAILABLE),
        },
    )
}

async fn handle_submit_word_request(
    request: WordRequest,
    store: Arc<dyn NerdleStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let week = match store.current_week().await {
        Ok(week) => week,
        Err(err) => return Ok(unavailable("current week", err)),
    };
    let used = match store.used_words().await {
        Ok(used) => used,
        Err(err) => return Ok(unavailable("used words", err)),
    };

    let result = nerdle_core::submit_word(
        store.as_ref(),
        &request.word,
        week.upcoming_week(),
        &week.next_picker,
        &used,
    )
    .await;

    Ok(match result {
        Ok(word) => json_reply(&word, StatusCode::CREATED),
        Err(WordSubmissionError::Invalid(reason)) => json_reply(
            &serde_json::json!({ "error": reason.to_string(), "reason": reason }),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(err @ WordSubmissionError::Submission(_)) => {
            error_reply(err.user_notice(), StatusCode::SERVICE_UNAVAILABLE)
        }
    })
}
