use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{admin, auth_routes, games, players, stats, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/verify", post(auth_routes::verify_code))
        .route(
            "/api/players",
            get(players::list_players).post(players::create_player),
        )
        .route(
            "/api/players/:id",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::deactivate_player),
        )
        .route("/api/games/assign-teams", post(games::assign_teams))
        .route("/api/games", post(games::create_game))
        .route("/api/games/finished", get(games::finished_games))
        .route("/api/games/ongoing/:player_id", get(games::ongoing_game))
        .route("/api/games/today-record", get(games::today_record))
        .route("/api/games/:id", get(games::game_detail))
        .route("/api/games/:id/rounds", post(games::append_round))
        .route(
            "/api/games/:id/rounds/:seq",
            axum::routing::put(games::replace_round).delete(games::delete_round),
        )
        .route("/api/games/:id/reset", post(games::reset_game))
        .route("/api/games/:id/abandon", post(games::abandon_game))
        .route("/api/stats/player/:id", get(stats::player_stats))
        .route("/api/stats/leaderboard", get(stats::leaderboard))
        .route("/api/stats/leaderboard/teams", get(stats::team_leaderboard))
        .route("/api/admin/players", get(admin::roster))
        .route("/api/admin/reset-all", delete(admin::reset_all))
        .with_state(state)
}
