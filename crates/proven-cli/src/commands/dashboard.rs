use anyhow::Result;
use colored::Colorize;
use proven_application::DashboardView;
use proven_core::resource::ResourceKind;

use super::{Context, Services, fail};

pub async fn show(context: &Context) -> Result<()> {
    let services = context.dashboard_services().await?;
    let view = load(&services).await?;
    print_view(&view);
    services.shutdown().await;
    Ok(())
}

/// Waits for the current user's dashboard, failing when nobody is logged in.
pub async fn load(services: &Services) -> Result<DashboardView> {
    if services.session().identity().is_none() {
        anyhow::bail!("Not logged in. Run {} first.", "proven login".bold());
    }
    services
        .dashboard
        .settled()
        .await
        .map_err(|e| fail(e, "Failed to load dashboard"))
}

fn print_view(view: &DashboardView) {
    let completion = view.completion();
    let score = format!("{}", completion);
    let score = if completion.is_complete() {
        score.green()
    } else {
        score.yellow()
    };
    println!("{} {}", "Profile completion:".bold(), score);
    println!("CV status: {}", view.cv_status());
    println!();

    for kind in ResourceKind::ALL {
        let heading = format!("{} ({})", kind.label(), view.count(kind));
        if view.has_failed(kind) {
            println!("{} {}", heading.bold(), "could not be loaded".red());
        } else {
            println!("{}", heading.bold());
        }
        print_records(view, kind);
        println!();
    }
}

fn print_records(view: &DashboardView, kind: ResourceKind) {
    let data = &view.data;
    match kind {
        ResourceKind::Profile => {
            let profile = &data.profile;
            let fields = [
                ("Name", profile.name.clone()),
                ("Email", profile.email.clone()),
                ("Phone", profile.phone.clone()),
                ("Location", profile.location.clone()),
                ("Date of birth", profile.date_of_birth.map(|d| d.to_string())),
                ("Gender", profile.gender.clone()),
                ("Bio", profile.bio.clone()),
            ];
            for (label, value) in fields {
                if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                    println!("  {}: {}", label, value);
                }
            }
        }
        ResourceKind::WorkExperience => {
            for work in &data.work_experience {
                println!(
                    "  [{}] {} at {} ({})",
                    work.id,
                    work.job_title.bold(),
                    work.company,
                    work.period()
                );
            }
        }
        ResourceKind::Referees => {
            for referee in &data.referees {
                let contact = referee
                    .email
                    .as_deref()
                    .or(referee.phone.as_deref())
                    .unwrap_or("-");
                println!("  [{}] {} - {}", referee.id, referee.name.bold(), contact);
            }
        }
        ResourceKind::Cv => {
            for cv in &data.cvs {
                println!(
                    "  [{}] {} ({:?})",
                    cv.id,
                    cv.title.as_deref().unwrap_or("Untitled").bold(),
                    cv.kind
                );
            }
        }
    }
}
