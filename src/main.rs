use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

mod comments;
mod config;
mod error;
mod follows;
mod groups;
mod identity;
mod pagination;
mod posts;
mod response;

use config::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    settings: Settings,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> PgPool {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("database connected");

    let app_state = AppState {
        pool,
        settings: settings.clone(),
    };

    let auth_router = Router::new()
        .route("/sign-up", post(identity::handler::signup))
        .route("/sign-in", post(identity::handler::login))
        .route("/me", get(identity::handler::get_me));

    let post_router = Router::new()
        .route(
            "/",
            get(posts::handler::get_posts).post(posts::handler::create_post),
        )
        .route(
            "/:id",
            get(posts::handler::get_post)
                .put(posts::handler::update_post)
                .delete(posts::handler::delete_post),
        )
        .route("/:id/comments", post(comments::handler::add_comment));

    let group_router = Router::new()
        .route(
            "/",
            get(groups::handler::get_groups).post(groups::handler::create_group),
        )
        .route("/:slug/posts", get(groups::handler::get_group_posts));

    let profile_router = Router::new()
        .route("/:username", get(follows::handler::get_profile))
        .route(
            "/:username/follow",
            post(follows::handler::follow_author).delete(follows::handler::unfollow_author),
        );

    let feed_router = Router::new().route("/following", get(follows::handler::get_following_feed));

    let app = Router::new()
        .nest("/api/auth", auth_router)
        .nest("/api/posts", post_router)
        .nest("/api/groups", group_router)
        .nest("/api/profile", profile_router)
        .nest("/api/feed", feed_router)
        .with_state(app_state);

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
