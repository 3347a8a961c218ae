use crate::config::FinderConfig;
use crate::core::criteria::CriteriaUpdate;
use crate::domain::model::ItemId;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "uni-scout")]
#[command(about = "Search, compare and apply to universities from a remote catalog")]
pub struct CliArgs {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Catalog service base URL (overrides the config file)")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Filter the catalog and show eligibility per university
    Search(SearchArgs),
    /// Submit an application to one university
    Apply(ApplyArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    #[arg(long, help = "USA, UK, Canada, Australia, Germany or \"All Countries\"")]
    pub country: Option<String>,

    #[arg(long, help = "Bachelor's, Master's, PhD or \"All Degrees\"")]
    pub degree: Option<String>,

    #[arg(long)]
    pub min_fee: Option<String>,

    #[arg(long)]
    pub max_fee: Option<String>,

    #[arg(long, help = "Your GPA (0-4.0)")]
    pub gpa: Option<String>,

    #[arg(long, help = "Your IELTS band (0-9.0)")]
    pub ielts: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Up to three university ids to compare")]
    pub compare: Vec<u64>,
}

impl SearchArgs {
    /// Criteria edits in the order a user would make them on the search form.
    pub fn criteria_updates(&self) -> Vec<CriteriaUpdate> {
        let mut updates = Vec::new();
        if let Some(country) = &self.country {
            updates.push(CriteriaUpdate::Country(country.clone()));
        }
        if let Some(degree) = &self.degree {
            updates.push(CriteriaUpdate::Degree(degree.clone()));
        }
        if let Some(min_fee) = &self.min_fee {
            updates.push(CriteriaUpdate::MinFee(min_fee.clone()));
        }
        if let Some(max_fee) = &self.max_fee {
            updates.push(CriteriaUpdate::MaxFee(max_fee.clone()));
        }
        if let Some(gpa) = &self.gpa {
            updates.push(CriteriaUpdate::UserGpa(gpa.clone()));
        }
        if let Some(ielts) = &self.ielts {
            updates.push(CriteriaUpdate::UserIelts(ielts.clone()));
        }
        updates
    }

    pub fn compare_ids(&self) -> Vec<ItemId> {
        self.compare.iter().copied().map(ItemId).collect()
    }
}

#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    #[arg(long, help = "University id to apply to")]
    pub university: u64,

    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    #[arg(long, default_value = "")]
    pub country: String,

    #[arg(long, default_value = "")]
    pub gpa: String,

    #[arg(long, default_value = "")]
    pub ielts: String,

    #[arg(long, default_value = "")]
    pub message: String,
}

impl CliArgs {
    /// Loads the config file (or defaults) and applies command-line overrides.
    pub fn resolve_config(&self) -> crate::Result<FinderConfig> {
        let mut config = match &self.config {
            Some(path) => FinderConfig::from_file(path)?,
            None => FinderConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        Ok(config)
    }
}
