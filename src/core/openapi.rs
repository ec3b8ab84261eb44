use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers, models as auth_models};
use crate::features::dashboard::{
    dtos as dashboard_dtos, handlers as dashboard_handlers, models as dashboard_models,
};
use crate::features::geocoding::handlers as geocoding_handlers;
use crate::features::incidents::{
    dtos as incidents_dtos, handlers as incidents_handlers, models as incidents_models,
};
use crate::modules::geocoding::GeocodeMatch;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::get_me,
        // Report submission (public, optional bearer)
        incidents_handlers::submit_guided_report,
        incidents_handlers::submit_quick_report,
        // Geocoding
        geocoding_handlers::search_address,
        // Dashboard (admin)
        dashboard_handlers::list_incidents,
        dashboard_handlers::update_incident_status,
        dashboard_handlers::list_users,
        dashboard_handlers::create_generated_report,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_models::UserRole,
            auth_models::UserStatus,
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::AuthUserDto,
            ApiResponse<auth_dtos::AuthUserDto>,
            ApiResponse<auth_dtos::LoginResponseDto>,
            // Incidents
            incidents_models::IncidentStatus,
            incidents_models::IncidentSeverity,
            incidents_models::IncidentSource,
            incidents_dtos::GuidedReportForm,
            incidents_dtos::QuickReportForm,
            incidents_dtos::GuidedSubmissionResponse,
            incidents_dtos::QuickSubmissionResponse,
            // Geocoding
            GeocodeMatch,
            ApiResponse<GeocodeMatch>,
            // Dashboard
            dashboard_dtos::DashboardIncidentDto,
            dashboard_dtos::UpdateIncidentStatusDto,
            dashboard_dtos::DashboardUserDto,
            ApiResponse<Vec<dashboard_dtos::DashboardIncidentDto>>,
            ApiResponse<dashboard_dtos::DashboardIncidentDto>,
            ApiResponse<Vec<dashboard_dtos::DashboardUserDto>>,
            dashboard_dtos::CreateGeneratedReportDto,
            dashboard_dtos::GeneratedReportDto,
            dashboard_models::ReportFormat,
            ApiResponse<dashboard_dtos::GeneratedReportDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "reports", description = "Guided and quick incident report submission"),
        (name = "geocoding", description = "Address search for the location step"),
        (name = "Dashboard", description = "Incident, user and report-record management (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Ecolink API",
        version = "0.1.0",
        description = "API documentation for Ecolink incident reporting",
    )
)]
pub struct ApiDoc;

/// Adds the bearer session token scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
