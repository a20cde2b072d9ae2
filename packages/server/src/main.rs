#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! SecureCheck API server binary.
//!
//! ```text
//! securecheck_server                 # settings from SECURECHECK_CONFIG and env
//! securecheck_server --interactive   # prompt for bind address and port
//! ```

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    if std::env::args().skip(1).any(|arg| arg == "--interactive") {
        securecheck_server::interactive::run().await
    } else {
        securecheck_server::run_server().await
    }
}
