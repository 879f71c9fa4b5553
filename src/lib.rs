pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use reqwest::Client;
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::services::{
    access_service::{AccessPolicy, AccessService, TokenInfoVerifier},
    achievement_service::AchievementService,
    journey_service::JourneyService,
    onboarding_service::OnboardingService,
    organization_service::OrganizationService,
    play_service::{PlaySessionStore, SystemClock},
    product_service::ProductService,
    question_service::QuestionService,
    quiz_service::QuizService,
    report_service::ReportService,
    user_service::UserService,
    whitelist_service::WhitelistService,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub organization_service: OrganizationService,
    pub product_service: ProductService,
    pub question_service: QuestionService,
    pub quiz_service: QuizService,
    pub onboarding_service: OnboardingService,
    pub journey_service: JourneyService,
    pub achievement_service: AchievementService,
    pub whitelist_service: WhitelistService,
    pub user_service: UserService,
    pub report_service: ReportService,
    pub access_service: AccessService,
    pub play_sessions: PlaySessionStore,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        let user_service = UserService::new(pool.clone());
        let whitelist_service = WhitelistService::new(pool.clone());
        let verifier = TokenInfoVerifier::new(
            http_client,
            config.identity_tokeninfo_url.clone(),
            config.identity_audience.clone(),
        );
        let access_service = AccessService::new(
            verifier,
            AccessPolicy::from_config(config),
            user_service.clone(),
            whitelist_service.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.session_ttl_hours),
        );
        let play_sessions = PlaySessionStore::new(
            Arc::new(SystemClock),
            config.results_signing_secret.clone(),
            chrono::Duration::minutes(config.play_session_ttl_minutes),
        );

        Ok(Self {
            organization_service: OrganizationService::new(pool.clone()),
            product_service: ProductService::new(pool.clone()),
            question_service: QuestionService::new(pool.clone()),
            quiz_service: QuizService::new(pool.clone()),
            onboarding_service: OnboardingService::new(pool.clone()),
            journey_service: JourneyService::new(pool.clone()),
            achievement_service: AchievementService::new(pool.clone()),
            report_service: ReportService::new(pool.clone()),
            whitelist_service,
            user_service,
            access_service,
            play_sessions,
            pool,
        })
    }
}

/// All HTTP routes, grouped by who may call them.
pub fn build_router(state: AppState, config: &Config) -> Router {
    use crate::middleware::auth::{require_admin, require_editor, require_session};

    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/session", post(routes::auth::sign_in))
        .route("/api/results", get(routes::play::results))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let player_api = Router::new()
        .route("/api/me", get(routes::auth::me))
        .route("/api/me/onboarding", put(routes::auth::submit_onboarding))
        .route("/api/me/onboarding/fields", get(routes::onboarding::list_fields))
        .route("/api/play/quizzes", get(routes::play::list_playable_quizzes))
        .route(
            "/api/play/quizzes/:id/sessions",
            post(routes::play::start_session),
        )
        .route(
            "/api/play/sessions/:token",
            get(routes::play::get_session).delete(routes::play::discard_session),
        )
        .route(
            "/api/play/sessions/:token/:action",
            post(routes::play::apply_action),
        )
        .route("/api/play/journeys", get(routes::journeys::list_published_journeys))
        .route(
            "/api/play/achievements",
            get(routes::play::unlocked_achievements),
        )
        .layer(axum::middleware::from_fn(require_session))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let editor_api = Router::new()
        .route(
            "/api/admin/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/api/admin/products/:id",
            get(routes::products::get_product)
                .patch(routes::products::update_product)
                .delete(routes::products::delete_product),
        )
        .route(
            "/api/admin/questions",
            get(routes::questions::list_questions).post(routes::questions::create_question),
        )
        .route(
            "/api/admin/questions/import/preview",
            post(routes::questions::preview_import),
        )
        .route(
            "/api/admin/questions/import",
            post(routes::questions::commit_import),
        )
        .route(
            "/api/admin/questions/:id",
            get(routes::questions::get_question)
                .put(routes::questions::replace_question)
                .delete(routes::questions::delete_question),
        )
        .route(
            "/api/admin/quizzes",
            get(routes::quizzes::list_quizzes).post(routes::quizzes::create_quiz),
        )
        .route(
            "/api/admin/quizzes/:id",
            get(routes::quizzes::get_quiz)
                .patch(routes::quizzes::update_quiz)
                .delete(routes::quizzes::delete_quiz),
        )
        .route(
            "/api/admin/quizzes/:id/publish",
            post(routes::quizzes::publish_quiz),
        )
        .route(
            "/api/admin/onboarding-fields",
            get(routes::onboarding::list_fields).post(routes::onboarding::create_field),
        )
        .route(
            "/api/admin/onboarding-fields/:id",
            get(routes::onboarding::get_field)
                .patch(routes::onboarding::update_field)
                .delete(routes::onboarding::delete_field),
        )
        .route(
            "/api/admin/journeys",
            get(routes::journeys::list_journeys).post(routes::journeys::create_journey),
        )
        .route(
            "/api/admin/journeys/:id",
            get(routes::journeys::get_journey)
                .patch(routes::journeys::update_journey)
                .delete(routes::journeys::delete_journey),
        )
        .route(
            "/api/admin/journeys/:id/reorder",
            post(routes::journeys::reorder_journey),
        )
        .route(
            "/api/admin/achievements",
            get(routes::admin::list_achievements).post(routes::admin::create_achievement),
        )
        .route(
            "/api/admin/achievements/:id",
            axum::routing::delete(routes::admin::delete_achievement),
        )
        .route(
            "/api/admin/organizations",
            get(routes::admin::list_organizations).post(routes::admin::create_organization),
        )
        .route(
            "/api/admin/organizations/:id",
            axum::routing::delete(routes::admin::delete_organization),
        )
        .route("/api/admin/reports/overview", get(routes::reports::overview))
        .route(
            "/api/admin/reports/overview.xlsx",
            get(routes::reports::overview_xlsx),
        )
        .layer(axum::middleware::from_fn(require_editor));

    let admin_api = Router::new()
        .route(
            "/api/admin/whitelist",
            get(routes::admin::list_whitelist).post(routes::admin::create_whitelist_entry),
        )
        .route(
            "/api/admin/whitelist/:id",
            axum::routing::delete(routes::admin::delete_whitelist_entry),
        )
        .route("/api/admin/users", get(routes::admin::list_users))
        .route(
            "/api/admin/users/:id/role",
            put(routes::admin::update_user_role),
        )
        .layer(axum::middleware::from_fn(require_admin));

    let back_office = editor_api
        .merge(admin_api)
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(config.admin_rps),
            rps_middleware,
        ));

    Router::new()
        .merge(public_api)
        .merge(player_api)
        .merge(back_office)
        .with_state(state)
        .layer(crate::middleware::cors::cors_layer(&config.cors_origins))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
