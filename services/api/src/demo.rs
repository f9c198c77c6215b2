use crate::infra::seed_defaults;
use clap::Args;
use staff_intake::error::AppError;
use staff_intake::lifecycle::{
    ApplicationStatus, ChangeStatus, LifecycleEngine, LifecycleError, MemoryStore,
    SubmitApplication,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the final statistics and audit trail as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

fn demo_submission(name: &str, email: &str, position: &str) -> SubmitApplication {
    SubmitApplication {
        id: None,
        name: name.to_string(),
        email: email.to_string(),
        contact_handle: format!("{}#demo", name.to_ascii_lowercase()),
        position: position.to_string(),
        experience: "Longtime community member".to_string(),
        playtime_availability: "Evenings and weekends".to_string(),
        message: Some("Submitted from the CLI demo".to_string()),
        answers: vec![
            "First demo answer".to_string(),
            "Second demo answer".to_string(),
        ],
        source_address: Some("127.0.0.1".to_string()),
    }
}

/// Drive a scripted intake-and-review flow against a seeded in-memory store
/// and show the bookkeeping it produces.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(MemoryStore::new());
    seed_defaults(&store).map_err(LifecycleError::from)?;
    let engine = LifecycleEngine::new(store);

    let builder = engine.submit(demo_submission("Avery", "avery@example.com", "Builder"))?;
    let moderator = engine.submit(demo_submission("Kai", "kai@example.com", "Moderator"))?;
    engine.submit(demo_submission("Rowan", "rowan@example.com", "Developer"))?;

    engine.change_status(
        &builder,
        ChangeStatus {
            status: ApplicationStatus::Accepted,
            actor_username: Some("demo-admin".to_string()),
        },
    )?;
    engine.change_status(
        &moderator,
        ChangeStatus {
            status: ApplicationStatus::Rejected,
            actor_username: Some("demo-admin".to_string()),
        },
    )?;

    let statistics = engine.statistics()?;
    let audit_log = engine.audit_log()?;

    if args.json {
        let payload = serde_json::json!({
            "statistics": statistics,
            "auditLog": audit_log,
        });
        println!("{payload:#}");
        return Ok(());
    }

    println!("Staff application demo");
    println!("======================");
    println!();
    println!(
        "Applications: {} total / {} under review / {} accepted / {} rejected",
        statistics.total_applications,
        statistics.under_review,
        statistics.accepted,
        statistics.rejected
    );
    for (position, count) in &statistics.by_position {
        println!("  {position}: {count}");
    }
    println!();
    println!("Audit trail (newest first):");
    for entry in &audit_log {
        let actor = entry.username.as_deref().unwrap_or("-");
        println!(
            "  [{}] {} actor={} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action.as_str(),
            actor,
            entry.details
        );
    }

    Ok(())
}
