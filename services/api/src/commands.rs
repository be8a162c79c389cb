use crate::cli::{CheckArgs, CullArgs, RefineArgs, ReviewArgs};
use crate::infra::{load_dor_config, load_issue_file, Services};
use crate::report::{render_checks, render_cull, render_refinement, render_review};
use backlog_ready::config::AppConfig;
use backlog_ready::error::AppError;
use backlog_ready::telemetry;
use backlog_ready::workflows::backlog::CullOverrides;
use backlog_ready::workflows::readiness::EvaluationView;
use backlog_ready::workflows::tracker::{parse_batch, parse_issue};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn prepare(config_path: Option<PathBuf>) -> Result<Services, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let dor = load_dor_config(&config, config_path.as_deref())?;
    Services::from_config(&dor)
}

fn print_json(value: &impl Serialize) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs, config_path: Option<PathBuf>) -> Result<(), AppError> {
    let services = prepare(config_path)?;
    let batch = parse_batch(&load_issue_file(&args.issues)?)?;
    let results = services.checker.evaluate_batch(&batch.issues);
    info!(
        scored = results.len(),
        failures = batch.failures.len(),
        "definition of ready check finished"
    );

    if args.json {
        let views: Vec<EvaluationView> = results.into_iter().map(EvaluationView::from).collect();
        return print_json(&json!({ "results": views, "failures": batch.failures }));
    }

    print!("{}", render_checks(&results, &batch.failures));
    Ok(())
}

pub(crate) fn run_review(args: ReviewArgs, config_path: Option<PathBuf>) -> Result<(), AppError> {
    let services = prepare(config_path)?;
    let issue = parse_issue(&load_issue_file(&args.issue)?)?;
    let items = services.checker.collect_review_items(&issue);

    if args.json {
        return print_json(&json!({ "issue_key": issue.key, "items": items }));
    }

    print!("{}", render_review(&issue.key, &items));
    Ok(())
}

pub(crate) fn run_cull(args: CullArgs, config_path: Option<PathBuf>) -> Result<(), AppError> {
    let services = prepare(config_path)?;
    let batch = parse_batch(&load_issue_file(&args.issues)?)?;
    let overrides = CullOverrides {
        age_threshold_days: args.age,
        no_activity_days: args.activity,
        min_refinement_score: args.refinement,
    };
    let now = args.now.unwrap_or_else(Utc::now);
    let report = services.cull.analyze_batch(batch, now, &overrides);

    if args.json {
        return print_json(&report);
    }

    print!("{}", render_cull(&report, services.cull.weights()));
    Ok(())
}

pub(crate) fn run_refine(args: RefineArgs, config_path: Option<PathBuf>) -> Result<(), AppError> {
    let services = prepare(config_path)?;
    let batch = parse_batch(&load_issue_file(&args.issues)?)?;
    let report = services.refinement.analyze_batch(batch);

    if args.json {
        return print_json(&report);
    }

    print!("{}", render_refinement(&report));
    Ok(())
}
