use anyhow::Result;
use colored::Colorize;
use proven_core::session::{ActivitySignal, SessionEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::Context;

/// Keeps the session alive while lines arrive on stdin and reports
/// transitions, including those made by other processes.
pub async fn run(context: &Context) -> Result<()> {
    let services = context.services().await?;
    let session = services.session().clone();
    let mut events = session.subscribe_events();

    match session.identity() {
        Some(identity) => println!(
            "Watching session of {}. Press Enter to stay active, Ctrl-D to stop.",
            identity.name.bold()
        ),
        None => println!("Not logged in. Waiting for a login from another process..."),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(_) => session.record_activity(ActivitySignal::KeyDown).await,
                None => break,
            },
            event = events.recv() => match event {
                Ok(SessionEvent::SignedIn { identity }) => {
                    println!("{} {}", "Signed in as".green(), identity.name.bold());
                }
                Ok(SessionEvent::SignedOut { reason }) => {
                    println!("{}", reason.notice().yellow());
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    services.shutdown().await;
    Ok(())
}
