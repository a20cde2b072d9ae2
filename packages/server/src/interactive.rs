//! Interactive mode for the server.
//!
//! Prompts the user for bind address and port before starting the server.

use dialoguer::{Confirm, Input};

use crate::Settings;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Loads the settings from the environment, lets the user adjust the bind
/// address and port, and delegates to [`super::serve`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid or
/// the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("SecureCheck Server");
    println!();

    let mut settings = Settings::load().map_err(std::io::Error::other)?;

    let bind_addr = settings.server.bind_addr.clone();
    settings.server.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(bind_addr.clone())
        .interact_text()
        .unwrap_or(bind_addr);

    settings.server.port = Input::new()
        .with_prompt("Port")
        .default(settings.server.port)
        .interact_text()
        .unwrap_or(settings.server.port);

    let addr = format!("{}:{}", settings.server.bind_addr, settings.server.port);
    if !Confirm::new()
        .with_prompt(format!("Start server on {addr}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::serve(settings).await
}
