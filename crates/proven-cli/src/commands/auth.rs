use anyhow::Result;
use colored::Colorize;
use proven_core::auth::{Credentials, Registration};
use proven_core::identity::SessionState;

use super::{Context, fail};

pub async fn register(context: &Context, name: String, email: String, password: String) -> Result<()> {
    let services = context.services().await?;
    let message = services
        .auth
        .register(Registration::new(name, email, password))
        .await
        .map_err(|e| fail(e, "Registration failed"))?;

    println!("{}", message.green());
    println!("You can now log in with {}", "proven login".bold());
    services.shutdown().await;
    Ok(())
}

pub async fn login(context: &Context, email: String, password: String) -> Result<()> {
    let services = context.services().await?;
    if let Some(identity) = services.session().identity() {
        println!(
            "Already logged in as {} <{}>. Run {} first.",
            identity.name.bold(),
            identity.email,
            "proven logout".bold()
        );
        services.shutdown().await;
        return Ok(());
    }

    let identity = services
        .auth
        .sign_in(Credentials::new(email, password))
        .await
        .map_err(|e| fail(e, "Login failed"))?;

    println!("{} {}", "Welcome back,".green(), identity.name.bold());
    services.shutdown().await;
    Ok(())
}

pub async fn logout(context: &Context) -> Result<()> {
    let services = context.services().await?;
    let was_signed_in = services.session().state().is_authenticated();

    services.auth.sign_out().await?;

    if was_signed_in {
        println!("{}", "You have been logged out.".green());
    } else {
        println!("Not logged in.");
    }
    services.shutdown().await;
    Ok(())
}

pub async fn status(context: &Context) -> Result<()> {
    let services = context.services().await?;

    match services.session().state() {
        SessionState::Authenticated(identity) => {
            println!(
                "{} [{}] {} <{}>",
                "Logged in".green(),
                identity.initial(),
                identity.name.bold(),
                identity.email
            );
            if !identity.role.is_empty() {
                println!("Role: {}", identity.role);
            }
            println!(
                "Idle timeout: {} minutes",
                services.session().idle_timeout().as_secs() / 60
            );
        }
        SessionState::Anonymous | SessionState::Initializing => {
            println!("{}", "Not logged in".yellow());
        }
    }

    services.shutdown().await;
    Ok(())
}
