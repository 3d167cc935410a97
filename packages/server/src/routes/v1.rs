use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .nest("/submissions", submission_routes())
        .nest("/problems", problem_routes())
        .nest("/users", user_routes())
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::submission::submit_code))
        .routes(routes!(handlers::submission::run_code))
        .routes(routes!(handlers::submission::get_submission))
        .routes(routes!(handlers::submission::rejudge_submission))
}

fn problem_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::submission::list_problem_submissions))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::submission::list_solved_problems))
}
