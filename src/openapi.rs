//! OpenAPI documentation.

use utoipa::OpenApi;

/// API documentation for the relay, served at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "pcrelay",
        description = "Playthrough collection relay. One submission endpoint; responses are status-only."
    ),
    paths(crate::api::handlers::playthroughs::submit_playthrough),
    tags(
        (name = "playthroughs", description = "Playthrough submission intake")
    )
)]
pub struct ApiDoc;
