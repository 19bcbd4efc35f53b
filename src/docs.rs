use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::auth::login,
        routes::auth::me,
        routes::arrangements::apply,
        routes::arrangements::list_own,
        routes::arrangements::list_team,
        routes::arrangements::list_org,
        routes::arrangements::request_withdrawal,
        routes::approvals::list_pending,
        routes::approvals::decide,
        routes::approvals::list_pending_withdrawals,
        routes::approvals::decide_withdrawal,
    ),
    components(
        schemas(
            models::employee::Employee,
            models::credential::LoginRequest,
            models::credential::AuthResponse,
            models::arrangement::Arrangement,
            models::arrangement::ArrangementCreateRequest,
            models::arrangement::ApprovalDecisionRequest,
            models::arrangement::WithdrawalDecisionRequest,
            routes::arrangements::MemberArrangements,
            routes::arrangements::TeamArrangementsResponse,
            routes::health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Arrangements", description = "Work arrangement views and requests"),
        (name = "Approvals", description = "Manager approval queue"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
