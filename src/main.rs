use clap::Parser;
use std::sync::Arc;
use uni_scout::config::cli::{ApplyArgs, Command, SearchArgs};
use uni_scout::core::comparison::COMPARISON_MINIMUM;
use uni_scout::core::results::ResultsView;
use uni_scout::utils::error::ErrorSeverity;
use uni_scout::utils::logger::{self, LogFormat};
use uni_scout::utils::validation::Validate;
use uni_scout::{
    ApplicationRequest, CatalogService, CliArgs, ComparisonSelector, ComparisonTable,
    FinderConfig, FinderError, FinderSession, HttpCatalogService, ItemId,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, args.verbose);

    tracing::info!("Starting uni-scout CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.resolve_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let service = Arc::new(HttpCatalogService::new(
        &config.service.base_url,
        config.timeout(),
    )?);

    let outcome = match &args.command {
        Command::Search(search) => run_search(service, &config, search).await,
        Command::Apply(apply) => run_apply(service.as_ref(), apply).await,
    };

    if let Err(e) = outcome {
        tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run_search(
    service: Arc<HttpCatalogService>,
    config: &FinderConfig,
    search: &SearchArgs,
) -> uni_scout::Result<()> {
    let (session, task) = FinderSession::spawn(service, config.session_options());

    for update in search.criteria_updates() {
        session.update(update).await?;
    }

    let view = session.settled().await?;
    session.shutdown().await?;
    if task.await.is_err() {
        tracing::warn!("Search session task ended abnormally");
    }

    if let Some(error) = &view.error {
        eprintln!("❌ {}", error);
    }
    print_results(&view);

    if !search.compare.is_empty() {
        print_comparison(&view, &search.compare_ids());
    }
    Ok(())
}

fn print_results(view: &ResultsView) {
    println!("Available Universities ({})", view.count);
    if view.items.is_empty() {
        println!("No universities found matching your criteria.");
        return;
    }

    for annotated in &view.items {
        let item = &annotated.item;
        println!(
            "[{}] {} ({}) | {} | {}/year | GPA {} | IELTS {} | #{} {}",
            item.id,
            item.name,
            item.location(),
            item.degree_level,
            uni_scout::core::comparison::format_fee(item.tuition_fee),
            item.required_gpa,
            item.required_ielts,
            item.ranking,
            annotated.eligibility.label()
        );
    }
}

fn print_comparison(view: &ResultsView, ids: &[ItemId]) {
    let mut selector = ComparisonSelector::with_observer(|selection: &[ItemId]| {
        tracing::debug!("Comparison selection: {:?}", selection);
    });

    for id in ids {
        if let Err(e) = selector.toggle(*id) {
            eprintln!("⚠️ {}", e.user_friendly_message());
        }
    }

    if !selector.is_ready() {
        println!(
            "Select at least {} universities to compare.",
            COMPARISON_MINIMUM
        );
        return;
    }

    let resolved = selector.resolve(view.catalog_items());
    if resolved.len() < COMPARISON_MINIMUM {
        println!("Selected universities are not in the current results.");
        return;
    }

    println!();
    println!("University Comparison");
    print!("{}", ComparisonTable::build(&resolved));
}

async fn run_apply(service: &HttpCatalogService, apply: &ApplyArgs) -> uni_scout::Result<()> {
    let catalog = service.list_all().await?;
    let item = catalog
        .iter()
        .find(|item| item.id == ItemId(apply.university))
        .ok_or_else(|| FinderError::Validation {
            message: format!("University {} is not in the catalog", apply.university),
        })?;

    let request = ApplicationRequest {
        full_name: apply.full_name.clone(),
        email: apply.email.clone(),
        phone: apply.phone.clone(),
        country: apply.country.clone(),
        gpa: apply.gpa.clone(),
        ielts: apply.ielts.clone(),
        message: apply.message.clone(),
        ..ApplicationRequest::for_item(item)
    };

    let ack = service.submit_application(&request).await?;
    println!("✅ {}", ack.message);
    println!("🎓 Applied to {} at {}", item.name, ack.received_at.to_rfc3339());
    Ok(())
}
