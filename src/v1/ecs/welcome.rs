#![forbid(unsafe_code)]

use poem_openapi::{payload::PlainText, OpenApi};

// The one value this service ever serves.  Constant for the lifetime of the
// process and never derived from request content.
pub const WELCOME_MESSAGE: &str = "Welcome to the world of ECS...!";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct WelcomeApi;

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl WelcomeApi {
    /** Return the fixed welcome greeting.  No query parameters, headers or
     * body are consulted, no state is touched and nothing can fail, so the
     * handler is trivially safe under arbitrary concurrency.
     */
    #[oai(path = "/ecs/welcome", method = "get")]
    async fn welcome(&self) -> PlainText<String> {
        PlainText(WELCOME_MESSAGE.to_string())
    }
}
