#![forbid(unsafe_code)]

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use log::{error, info, LevelFilter};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::ops::Deref;
use std::path::Path;
use std::{env, fs};
use structopt::StructOpt;
use toml;

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// File locations, overridable from the environment.
const ENV_CONFIG_FILE      : &str = "ECS_WELCOME_CONFIG";
const DEFAULT_CONFIG_FILE  : &str = "~/.ecs_welcome/config.toml";
const ENV_LOG_CONFIG_FILE  : &str = "ECS_WELCOME_LOG_CONFIG";

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "0.0.0.0";
const DEFAULT_HTTP_PORT    : u16  = 8080;

// Console logging when no log4rs file is supplied.
const DEFAULT_LOG_PATTERN  : &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {t} - {m}{n}";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref WELCOME_ARGS: WelcomeArgs = init_welcome_args();
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// CommandLineArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "ecs_welcome_server", about = "Command line arguments for the ECS welcome server.")]
pub struct WelcomeArgs {
    /// Path to the server's TOML configuration file.
    ///
    /// The ECS_WELCOME_CONFIG environment variable takes precedence over
    /// this argument; when neither is set ~/.ecs_welcome/config.toml is used.
    #[structopt(short, long)]
    pub config_file: Option<String>,

    /// Override the listening port from the configuration file.
    ///
    /// Port 0 requests an ephemeral port assigned by the operating system.
    #[structopt(short = "p", long)]
    pub http_port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub args: &'static WelcomeArgs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
}

impl Config {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "ECS Welcome Service".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

// ***************************************************************************
//                            Argument Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_welcome_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_welcome_args() -> WelcomeArgs {
    let args = WelcomeArgs::from_args();
    println!("{:?}", args);
    args
}

// ***************************************************************************
//                               Path Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable values in a path name and
 * then construct the absolute path name.  Absolutize does not require the
 * file to exist, unlike the standard canonicalize method.  On any error
 * the original path is returned unchanged.
 */
pub fn get_absolute_path(path: &str) -> String {
    // Replace ~ and environment variable values if possible.
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    // Convert to absolute path if necessary.
    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    let p2 = match p1.to_str() {
        Some(x) => x,
        None => return path.to_owned(),
    };

    p2.to_owned()
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs logging.  If the operator supplies a log4rs yaml file
 * through the environment, use it; otherwise fall back to a console
 * configuration at info level.
 */
pub fn init_log() {
    match env::var(ENV_LOG_CONFIG_FILE) {
        Ok(f) => {
            let logconfig = get_absolute_path(&f);
            match log4rs::init_file(logconfig.clone(), Default::default()) {
                Ok(_) => (),
                Err(e) => {
                    println!("{}", e);
                    let s = format!("{}", Errors::Log4rsInitialization(logconfig));
                    panic!("{}", s);
                }
            }
            info!("Log4rs initialized using: {}", logconfig);
        }
        Err(_) => init_default_log(),
    }
}

// ---------------------------------------------------------------------------
// init_default_log:
// ---------------------------------------------------------------------------
fn init_default_log() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
        .build();
    let logconfig = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .unwrap_or_else(|e| panic!("Invalid default log configuration: {}", e));
    if let Err(e) = log4rs::init_config(logconfig) {
        panic!("Unable to initialize default logging: {}", e);
    }
    info!("Log4rs initialized using the default console configuration.");
}

/// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file specified
 * either through an environment variable or as a command line argument.  If
 * neither is provided, an attempt is made to use the default file path.  A
 * missing file yields the default configuration; a malformed file is an
 * error.  The command line port override is applied last.
 */
fn get_parms() -> Result<Parms> {
    // Get the config file path.
    let config_file = env::var(ENV_CONFIG_FILE).unwrap_or_else(|_| {
        match WELCOME_ARGS.config_file.clone() {
            Some(f) => f,
            None => DEFAULT_CONFIG_FILE.to_string(),
        }
    });

    // Load the configuration and apply command line overrides.
    let config_file_abs = get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let config = load_config(&config_file_abs)?;
    Ok(Parms { config_file: config_file_abs, config: apply_overrides(config, WELCOME_ARGS.http_port) })
}

// ---------------------------------------------------------------------------
// load_config:
// ---------------------------------------------------------------------------
/** Read and parse the configuration file.  A missing or unreadable file
 * yields the default configuration; a malformed file is an error.
 */
fn load_config(config_file_abs: &str) -> Result<Config> {
    // Read the cofiguration file.
    let contents = match fs::read_to_string(config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file_abs);
            return Ok(Config::new());
        }
    };

    // Parse the toml configuration.
    match toml::from_str(&contents) {
        Ok(c) => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file_abs.to_string()), e);
            error!("{}", msg);
            Result::Err(anyhow!(msg))
        }
    }
}

// ---------------------------------------------------------------------------
// apply_overrides:
// ---------------------------------------------------------------------------
fn apply_overrides(mut config: Config, http_port: Option<u16>) -> Config {
    if let Some(port) = http_port {
        config.http_port = port;
    }
    config
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // If this fails the application aborts.
    let parms = get_parms().expect("FAILED to read configuration file.");
    RuntimeCtx { parms, args: &WELCOME_ARGS }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use crate::utils::config::{apply_overrides, get_absolute_path, load_config, Config};

    #[test]
    fn print_config() {
        println!("{:?}", Config::new());
    }

    #[test]
    fn default_config_binds_all_interfaces() {
        let config = Config::default();
        assert_eq!(config.http_addr, "0.0.0.0");
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn config_parses_from_toml() {
        let contents = r#"
            title = "ECS Welcome Service"
            http_addr = "127.0.0.1"
            http_port = 9090
        "#;
        let config: Config = toml::from_str(contents).expect("valid toml");
        assert_eq!(config.http_addr, "127.0.0.1");
        assert_eq!(config.http_port, 9090);
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        assert!(toml::from_str::<Config>("http_port = \"not a port\"").is_err());

        let dir = std::env::temp_dir().join("ecs_welcome_config_tests");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("malformed.toml");
        std::fs::write(&path, "title = [").expect("write temp config");
        assert!(load_config(path.to_str().expect("utf8 path")).is_err());
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = load_config("/nonexistent/ecs_welcome/config.toml").expect("defaults expected");
        assert_eq!(config.http_addr, "0.0.0.0");
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn command_line_port_override_is_applied_last() {
        let config = apply_overrides(Config::default(), Some(9999));
        assert_eq!(config.http_port, 9999);

        let config = apply_overrides(Config::default(), None);
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn absolute_paths_pass_through() {
        assert_eq!(get_absolute_path("/tmp/config.toml"), "/tmp/config.toml");
    }
}
