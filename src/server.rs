#![forbid(unsafe_code)]

use std::io::{Error, ErrorKind};
use std::net::SocketAddr;

use poem::listener::{Acceptor, Listener, TcpAcceptor, TcpListener};
use poem::{Route, Server};
use poem_openapi::OpenApiService;

use crate::v1::ecs::welcome::WelcomeApi;

// Reported to poem for logging.
const SERVER_NAME: &str = "EcsWelcomeServer";

// From cargo.toml.
pub const SERVER_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// routes:
// ---------------------------------------------------------------------------
/** Assemble the application routes.  The OpenAPI service is nested at the
 * root so the externally visible path is exactly /ecs/welcome.  Requests
 * that match no route receive poem's default response (404 for unknown
 * paths, 405 for a known path with the wrong method).
 */
pub fn routes() -> Route {
    let api_service = OpenApiService::new(
        WelcomeApi,
        "ECS Welcome Service",
        SERVER_VERSION.unwrap_or("unknown"),
    );
    Route::new().nest("/", api_service)
}

// ***************************************************************************
//                              WelcomeServer
// ***************************************************************************
/** A welcome service bound to a TCP address but not yet serving requests.
 * Binding is separated from running so callers that request an ephemeral
 * port (port 0) can learn the actual bound port before the server starts.
 */
pub struct WelcomeServer {
    acceptor: TcpAcceptor,
    local_addr: SocketAddr,
}

impl WelcomeServer {
    // -----------------------------------------------------------------------
    // bind:
    // -----------------------------------------------------------------------
    /** Bind the listener.  A bind failure, such as the port being in use,
     * is returned to the caller and is fatal at process start.
     */
    pub async fn bind(addr: &str) -> Result<WelcomeServer, Error> {
        let acceptor = TcpListener::bind(addr.to_string()).into_acceptor().await?;
        let local_addr = acceptor
            .local_addr()
            .first()
            .and_then(|a| a.as_socket_addr().copied())
            .ok_or_else(|| {
                Error::new(ErrorKind::AddrNotAvailable, "no local address for listener")
            })?;
        Ok(WelcomeServer { acceptor, local_addr })
    }

    // -----------------------------------------------------------------------
    // local_addr:
    // -----------------------------------------------------------------------
    /** The address actually bound, which differs from the requested address
     * when port 0 was requested.
     */
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    // -----------------------------------------------------------------------
    // run:
    // -----------------------------------------------------------------------
    /** Serve requests until the process shuts down. */
    pub async fn run(self) -> Result<(), Error> {
        Server::new_with_acceptor(self.acceptor)
            .name(SERVER_NAME)
            .run(routes())
            .await
    }
}
