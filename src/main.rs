// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campus Portal command-line client
//!
//! Logs in against the course management API, keeps the session in a local
//! state file, and exposes the student workflows as subcommands.

use anyhow::{Context, Result};
use campus_portal::{
    config::Config,
    db::FileStore,
    models::{RoleDetails, SignupForm, TrackedAssignment, UploadFile},
    services::ToastKind,
    Portal,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "campus-portal", about = "Command-line client for the campus course portal")]
struct Args {
    #[arg(long, help = "Portal API base URL (overrides CAMPUS_API_URL)")]
    api_url: Option<String>,

    #[arg(long, help = "Session state file (overrides CAMPUS_STATE_FILE)")]
    state_file: Option<PathBuf>,

    #[arg(long, help = "Emit logs as JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Student,
    Teacher,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the current session
    Whoami {
        #[arg(long, help = "Re-read the profile from the server")]
        refresh: bool,
    },
    /// Register a new account
    Signup {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, value_enum, default_value = "student")]
        role: RoleArg,
        #[arg(long, default_value = "")]
        grade: String,
        #[arg(long, default_value = "")]
        major: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        department: String,
    },
    /// List enrolled courses, or the whole catalogue with --all
    Courses {
        #[arg(long)]
        student: Option<i64>,
        #[arg(long)]
        all: bool,
    },
    /// Show a student's record
    Student {
        #[arg(long)]
        student: i64,
    },
    /// Enroll in a course
    Enroll { course_id: i64 },
    /// List assignments with their status
    Assignments {
        #[arg(long)]
        student: i64,
    },
    /// Show a student's transcript
    Transcript {
        #[arg(long)]
        student: i64,
    },
    /// List my submissions
    Submissions,
    /// Submit a file for an assignment
    Submit { assignment_id: i64, file: PathBuf },
    /// Download a submitted file
    Download {
        submission_id: i64,
        #[arg(long, help = "Output path (defaults to the server-provided name)")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_json)?;

    let mut config = Config::from_env()?;
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url);
    }
    if let Some(path) = &args.state_file {
        config = config.with_state_file(path);
    }
    tracing::debug!(api_url = %config.api_url, state_file = %config.state_file.display(), "Loaded configuration");

    let storage = Arc::new(FileStore::open(&config.state_file)?);
    let mut portal = Portal::new(config, storage)?;

    match run(&mut portal, args.command).await {
        Ok(Some(message)) => {
            announce(&portal, message, ToastKind::Success).await;
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            announce(&portal, e.to_string(), ToastKind::Error).await;
            std::process::exit(1);
        }
    }
}

/// Run one command. Returns a confirmation message for mutating commands.
async fn run(portal: &mut Portal, command: Command) -> campus_portal::error::Result<Option<String>> {
    match command {
        Command::Login { username, password } => {
            let role = portal.session.login(&username, &password).await?;
            Ok(Some(format!("Logged in as {} ({})", username, role)))
        }
        Command::Logout => {
            portal.session.logout().await;
            Ok(Some("Logged out".to_string()))
        }
        Command::Whoami { refresh } => {
            if refresh {
                portal.session.refresh_user_info().await?;
            }
            print_json(&portal.session.session().await);
            Ok(None)
        }
        Command::Signup {
            username,
            email,
            password,
            confirm_password,
            role,
            grade,
            major,
            title,
            department,
        } => {
            let details = match role {
                RoleArg::Student => RoleDetails::Student { grade, major },
                RoleArg::Teacher => RoleDetails::Teacher { title, department },
            };
            let form = SignupForm {
                username,
                password,
                confirm_password,
                email,
                details,
            };
            portal.session.signup(&form).await?;
            Ok(Some(format!("Registered {}, you can log in now", form.username)))
        }
        Command::Courses { student, all } => {
            if all {
                print_json(&portal.academic.get_all_courses().await?);
            } else {
                if let Some(id) = student {
                    portal.academic.set_current_student(id);
                }
                print_json(&portal.academic.get_student_courses().await?);
            }
            Ok(None)
        }
        Command::Student { student } => {
            portal.academic.set_current_student(student);
            print_json(&portal.academic.get_student_info().await?);
            Ok(None)
        }
        Command::Enroll { course_id } => {
            portal.academic.enroll_course(course_id).await?;
            Ok(Some(format!("Enrolled in course {}", course_id)))
        }
        Command::Assignments { student } => {
            portal.academic.set_current_student(student);
            let assignments = portal.academic.get_student_assignments().await?;
            print_assignments(&assignments);
            Ok(None)
        }
        Command::Transcript { student } => {
            portal.academic.set_current_student(student);
            print_json(&portal.academic.get_student_transcript().await?);
            Ok(None)
        }
        Command::Submissions => {
            print_json(&portal.academic.get_student_submissions().await?);
            Ok(None)
        }
        Command::Submit {
            assignment_id,
            file,
        } => {
            let upload = UploadFile::from_path(&file).await.map_err(|e| {
                campus_portal::error::PortalError::Validation(format!(
                    "Cannot read {}: {}",
                    file.display(),
                    e
                ))
            })?;
            let submission = portal
                .academic
                .submit_assignment(assignment_id, upload)
                .await?;
            Ok(Some(format!(
                "Submitted assignment {} (submission {})",
                assignment_id, submission.submission_id
            )))
        }
        Command::Download { submission_id, out } => {
            let download = portal.academic.download_submission(submission_id).await?;
            let path = out
                .or_else(|| download.file_name.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(format!("submission_{}", submission_id)));
            tokio::fs::write(&path, &download.bytes).await.map_err(|e| {
                campus_portal::error::PortalError::GenericFailure(format!(
                    "Cannot write {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Ok(Some(format!(
                "Saved {} bytes to {}",
                download.bytes.len(),
                path.display()
            )))
        }
    }
}

/// Show a toast and print it as a status line.
async fn announce(portal: &Portal, message: String, kind: ToastKind) {
    portal.notifications.show_toast(message, kind).await;
    let toast = portal.notifications.current().await;
    if toast.is_visible {
        match toast.kind {
            ToastKind::Success => println!("✔ {}", toast.message),
            ToastKind::Error => eprintln!("✘ {}", toast.message),
        }
    }
    portal.notifications.hide_toast().await;
}

fn print_assignments(assignments: &[TrackedAssignment]) {
    if assignments.is_empty() {
        println!("No assignments");
        return;
    }
    for tracked in assignments {
        let a = &tracked.assignment;
        println!(
            "#{:<5} {:<12} due {}  {}",
            a.assignment_id,
            tracked.status.as_str(),
            campus_portal::time_utils::format_utc_rfc3339(a.due_date),
            a.content
        );
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(body) => println!("{}", body),
        Err(e) => eprintln!("Failed to render output: {}", e),
    }
}

/// Initialize logging to stderr, human-readable or JSON.
fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new("campus_portal=info,warn").context("invalid default log filter")
    })?;

    if json {
        let format = tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry().with(filter).with(format).init();
    } else {
        let format = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry().with(filter).with(format).init();
    }
    Ok(())
}
