use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use colored::Colorize;
use proven_application::{Confirmation, EditReport, EditStatus};
use proven_core::resource::{
    CvForm, CvKind, Gender, ProfileForm, RecordId, RefereeForm, WorkExperienceForm,
};
use std::io::{self, BufRead, Write};

use super::dashboard::load;
use super::{Context, fail};

const NOT_LOGGED_IN: &str = "Not logged in. Run `proven login` first.";

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    proven_core::parse_date(raw).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", raw))
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
    Other,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
            GenderArg::Other => Gender::Other,
        }
    }
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long, value_parser = parse_date_arg)]
    date_of_birth: Option<NaiveDate>,
    #[arg(long, value_enum)]
    gender: Option<GenderArg>,
    #[arg(long)]
    bio: Option<String>,
}

#[derive(Args)]
pub struct WorkArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// First day in the position (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    start: Option<NaiveDate>,
    /// Last day in the position; omit while it is current
    #[arg(long, value_parser = parse_date_arg)]
    end: Option<NaiveDate>,
    #[arg(long)]
    responsibilities: Option<String>,
}

#[derive(Args)]
pub struct RefereeArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    relationship: Option<String>,
}

#[derive(Args)]
pub struct CvArgs {
    #[arg(long)]
    title: String,
    /// Record a generated CV instead of an uploaded file
    #[arg(long)]
    generated: bool,
    /// Server-side path of the uploaded file
    #[arg(long)]
    file: Option<String>,
    #[arg(long)]
    content: Option<String>,
}

pub async fn set_profile(context: &Context, args: ProfileArgs) -> Result<()> {
    let services = context.dashboard_services().await?;
    let view = load(&services).await?;

    let mut form = ProfileForm::from_record(&view.data.profile);
    if let Some(name) = args.name {
        form.name = name;
    }
    if args.phone.is_some() {
        form.phone = args.phone;
    }
    if args.location.is_some() {
        form.location = args.location;
    }
    if args.date_of_birth.is_some() {
        form.date_of_birth = args.date_of_birth;
    }
    if let Some(gender) = args.gender {
        form.gender = Some(gender.into());
    }
    if args.bio.is_some() {
        form.bio = args.bio;
    }

    let dashboard = &services.dashboard;
    let report = dashboard
        .submit(&dashboard.editors().profile, &form, None)
        .await
        .map_err(|e| fail(e, NOT_LOGGED_IN))?;
    services.shutdown().await;
    finish(report)
}

pub async fn save_work(context: &Context, id: Option<String>, args: WorkArgs) -> Result<()> {
    // Updates merge into the stored record, so only they need the dashboard.
    let services = if id.is_some() {
        context.dashboard_services().await?
    } else {
        context.services().await?
    };
    let dashboard = &services.dashboard;

    let id = id.map(RecordId::new);
    let mut form = match &id {
        Some(id) => {
            let view = load(&services).await?;
            let record = view
                .data
                .work_experience
                .iter()
                .find(|w| &w.id == id)
                .ok_or_else(|| anyhow::anyhow!("No work experience with id {}", id))?;
            WorkExperienceForm::from_record(record)
        }
        None => WorkExperienceForm::default(),
    };

    if let Some(title) = args.title {
        form.job_title = title;
    }
    if let Some(company) = args.company {
        form.company = company;
    }
    if args.location.is_some() {
        form.location = args.location;
    }
    if args.start.is_some() {
        form.start_date = args.start;
    }
    if args.end.is_some() {
        form.end_date = args.end;
    }
    if args.responsibilities.is_some() {
        form.responsibilities = args.responsibilities;
    }

    let report = dashboard
        .submit(&dashboard.editors().work_experience, &form, id.as_ref())
        .await
        .map_err(|e| fail(e, NOT_LOGGED_IN))?;
    services.shutdown().await;
    finish(report)
}

pub async fn remove_work(context: &Context, id: String, yes: bool) -> Result<()> {
    let services = context.services().await?;
    let dashboard = &services.dashboard;
    let confirmation = confirm(yes, "Delete this work experience?")?;
    let report = dashboard
        .remove(&dashboard.editors().work_experience, &RecordId::new(id), confirmation)
        .await
        .map_err(|e| fail(e, NOT_LOGGED_IN))?;
    services.shutdown().await;
    finish(report)
}

pub async fn add_referee(context: &Context, args: RefereeArgs) -> Result<()> {
    let services = context.services().await?;
    let dashboard = &services.dashboard;
    let form = RefereeForm {
        name: args.name,
        position: args.position,
        company: args.company,
        email: args.email,
        phone: args.phone,
        relationship: args.relationship,
    };
    let report = dashboard
        .submit(&dashboard.editors().referees, &form, None)
        .await
        .map_err(|e| fail(e, NOT_LOGGED_IN))?;
    services.shutdown().await;
    finish(report)
}

pub async fn remove_referee(context: &Context, id: String, yes: bool) -> Result<()> {
    let services = context.services().await?;
    let dashboard = &services.dashboard;
    let confirmation = confirm(yes, "Delete this referee?")?;
    let report = dashboard
        .remove(&dashboard.editors().referees, &RecordId::new(id), confirmation)
        .await
        .map_err(|e| fail(e, NOT_LOGGED_IN))?;
    services.shutdown().await;
    finish(report)
}

pub async fn add_cv(context: &Context, args: CvArgs) -> Result<()> {
    let services = context.services().await?;
    let dashboard = &services.dashboard;
    let form = CvForm {
        title: args.title,
        kind: if args.generated {
            CvKind::Generated
        } else {
            CvKind::Uploaded
        },
        file_path: args.file,
        content: args.content,
    };
    let report = dashboard
        .submit(&dashboard.editors().cvs, &form, None)
        .await
        .map_err(|e| fail(e, NOT_LOGGED_IN))?;
    services.shutdown().await;
    finish(report)
}

pub async fn remove_cv(context: &Context, id: String, yes: bool) -> Result<()> {
    let services = context.services().await?;
    let dashboard = &services.dashboard;
    let confirmation = confirm(yes, "Delete this CV?")?;
    let report = dashboard
        .remove(&dashboard.editors().cvs, &RecordId::new(id), confirmation)
        .await
        .map_err(|e| fail(e, NOT_LOGGED_IN))?;
    services.shutdown().await;
    finish(report)
}

fn confirm(yes: bool, question: &str) -> Result<Confirmation> {
    if yes {
        return Ok(Confirmation::Affirmed);
    }
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let affirmed = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
    Ok(Confirmation::from(affirmed))
}

fn finish(report: EditReport) -> Result<()> {
    match report.status {
        EditStatus::Success => println!("{}", report.message.green()),
        EditStatus::Cancelled | EditStatus::Busy => println!("{}", report.message.yellow()),
        EditStatus::Failure => anyhow::bail!("{}", report.message.red()),
    }
    Ok(())
}
