use crate::infra::{job_fair_service, parse_date};
use chrono::NaiveDate;
use clap::Args;
use placement_team::config::AppConfig;
use placement_team::error::AppError;
use placement_team::workflows::job_fairs::qr_image_name;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CreateArgs {
    /// District hosting the job fair
    #[arg(long)]
    pub(crate) district: String,
    /// Date of the job fair (YYYY-MM-DD or MM/DD/YYYY)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: NaiveDate,
    /// Write the QR image here; a directory receives `qr_<id>.png`
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RepairArgs {
    /// Maximum number of pending job fairs to process
    #[arg(long, default_value_t = 100)]
    pub(crate) limit: usize,
}

pub(crate) fn run_create(args: CreateArgs) -> Result<(), AppError> {
    let CreateArgs {
        district,
        date,
        output,
    } = args;

    let config = AppConfig::load()?;
    let service = job_fair_service(&config)?;

    let record = service.create_job_fair(&district, date)?;
    println!("Recorded job fair {} ({})", record.id, record);
    println!("Registration link: {}", service.registration_link());

    if let (Some(output), Some(image)) = (output, record.qr_image.as_deref()) {
        let path = if output.is_dir() {
            output.join(qr_image_name(record.id))
        } else {
            output
        };
        std::fs::write(&path, image)?;
        println!("QR code written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_repair(args: RepairArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = job_fair_service(&config)?;

    let pending = service.pending_qr(args.limit)?;
    if pending.is_empty() {
        println!("No job fairs are waiting for a QR code");
        return Ok(());
    }

    let summary = service.repair_pending(args.limit)?;
    println!(
        "Reissued {}/{} QR codes",
        summary.repaired.len(),
        summary.attempted
    );
    for failure in &summary.failed {
        println!("- job fair {}: {}", failure.id, failure.reason);
    }

    Ok(())
}
