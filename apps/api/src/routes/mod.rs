pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::admin;
use crate::assessments;
use crate::auth;
use crate::blog;
use crate::errors::AppError;
use crate::leaderboard;
use crate::profile;
use crate::skills;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/check-status", get(admin::dashboard::handle_check_status))
        .route("/analytics", get(admin::dashboard::handle_analytics))
        .route("/statistics", get(admin::dashboard::handle_statistics))
        .route("/system-check", get(admin::dashboard::handle_system_check))
        // User management
        .route(
            "/users",
            get(admin::users::handle_list_users).post(admin::users::handle_create_user),
        )
        .route(
            "/users/:id",
            get(admin::users::handle_get_user)
                .put(admin::users::handle_update_user)
                .delete(admin::users::handle_delete_user),
        )
        // Assessment management
        .route(
            "/assessments",
            get(admin::assessments::handle_list_assessments)
                .post(admin::assessments::handle_create_assessment),
        )
        .route(
            "/assessments/:id",
            get(admin::assessments::handle_get_assessment)
                .put(admin::assessments::handle_update_assessment)
                .delete(admin::assessments::handle_delete_assessment),
        )
        .route(
            "/assessments/:id/questions",
            post(admin::assessments::handle_add_question),
        )
        // Blog management
        .route(
            "/blog-posts",
            get(admin::blog::handle_list_posts).post(admin::blog::handle_create_post),
        )
        .route(
            "/blog-posts/:id",
            put(admin::blog::handle_update_post).delete(admin::blog::handle_delete_post),
        )
        // Newsletter & contact
        .route(
            "/subscribers",
            get(admin::outreach::handle_list_subscribers)
                .post(admin::outreach::handle_add_subscriber),
        )
        .route(
            "/subscribers/export",
            get(admin::outreach::handle_export_subscribers),
        )
        .route(
            "/subscribers/:id",
            delete(admin::outreach::handle_delete_subscriber),
        )
        .route("/contact-messages", get(admin::outreach::handle_list_messages))
        .route(
            "/contact-messages/:id",
            delete(admin::outreach::handle_delete_message),
        )
        // Settings & backups
        .route(
            "/settings",
            get(admin::settings::handle_get_settings).put(admin::settings::handle_update_settings),
        )
        .route("/backup", post(admin::backups::handle_create_backup))
        .route("/backups", get(admin::backups::handle_list_backups))
        .route(
            "/backups/:filename",
            get(admin::backups::handle_download_backup).delete(admin::backups::handle_delete_backup),
        )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/test", get(health::api_test_handler))
        // Auth
        .route("/auth/register", post(auth::handlers::handle_register))
        .route("/auth/login", post(auth::handlers::handle_login))
        // Profile
        .route("/api/profile", get(profile::handlers::handle_get_profile))
        .route(
            "/api/profile/update",
            put(profile::handlers::handle_update_profile),
        )
        // Assessments
        .route(
            "/api/assessments",
            get(assessments::handlers::handle_list_assessments),
        )
        .route(
            "/api/assessments/history",
            get(assessments::handlers::handle_history),
        )
        .route(
            "/api/assessments/:id/questions",
            get(assessments::handlers::handle_get_questions),
        )
        .route(
            "/api/assessments/:id/submit",
            post(assessments::handlers::handle_submit),
        )
        // Skills
        .route("/api/skills", get(skills::handlers::handle_list_skills))
        .route(
            "/api/skills/recommended",
            get(skills::recommend::handle_recommended_skills),
        )
        // Leaderboard
        .route(
            "/api/leaderboard/overall",
            get(leaderboard::handlers::handle_overall_leaderboard),
        )
        .route(
            "/api/leaderboard/assessments",
            get(leaderboard::handlers::handle_assessment_leaderboards),
        )
        .route(
            "/api/leaderboard/me",
            get(leaderboard::handlers::handle_user_ranking),
        )
        // Blog, newsletter, contact
        .route("/api/blog-posts", get(blog::handlers::handle_list_posts))
        .route(
            "/api/blog-posts/featured",
            get(blog::handlers::handle_featured_posts),
        )
        .route(
            "/api/blog-posts/search",
            get(blog::handlers::handle_search_posts),
        )
        .route(
            "/api/blog-posts/category/:category",
            get(blog::handlers::handle_posts_by_category),
        )
        .route("/api/blog-posts/:id", get(blog::handlers::handle_get_post))
        .route(
            "/api/newsletter/subscribe",
            post(blog::handlers::handle_subscribe),
        )
        .route("/api/contact", post(blog::handlers::handle_contact))
        // Admin panel (every route behind the admin guard extractor)
        .nest("/api/admin", admin_router())
        .fallback(not_found)
        .with_state(state)
}
