#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use log::info;

use ecs_welcome_server::server::WelcomeServer;
use ecs_welcome_server::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use ecs_welcome_server::utils::errors::Errors;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that it has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Service -------------
    // Announce ourselves.
    println!("Starting ecs_welcome_server!");

    // Initialize the server.
    welcome_init();

    // --------------- Main Loop Set Up ---------------
    // Bind the listener.  A failure here, such as the port being in use,
    // is fatal and surfaces to the operator with no recovery attempt.
    let addr = format!("{}:{}",
        RUNTIME_CTX.parms.config.http_addr,
        RUNTIME_CTX.parms.config.http_port);
    let server = WelcomeServer::bind(&addr).await?;
    info!("Serving {} on http://{}", RUNTIME_CTX.parms.config.title, server.local_addr());

    // ------------------ Main Loop -------------------
    server.run().await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// welcome_init:
// ---------------------------------------------------------------------------
/** Initialize all subsystems other than those needed to configure the main
 * loop processor.
 */
fn welcome_init() {
    // Configure our log.
    init_log();

    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    // Log build info.
    print_version_info();
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("Running ecs_welcome_server version {}.",
        ecs_welcome_server::server::SERVER_VERSION.unwrap_or("unknown"));
}
