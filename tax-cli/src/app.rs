use std::path::Path;

use anyhow::{Context, Result};
use tax_core::db::{DbConfig, RepositoryRegistry};
use tax_core::{CalculationResult, NewCalculationRecord, RateTable, TaxRepository, compute};
use tax_data::RateScheduleLoader;
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info, warn};

use crate::cli::{CalculateArgs, Cli, Command, HistoryCommand, ProfileCommand};
use crate::input::{InputFile, default_name};
use crate::report::{HistoryList, ProfileList, RecordReport, ResultReport, StatisticsReport};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn TaxRepository>> {
    debug!("connecting to {} backend", config.backend);
    let registry = build_registry();
    registry
        .create(config)
        .await
        .with_context(|| format!("cannot open {} store '{}'", config.backend, config.connection_string))
}

/// The built-in table for `year`, with its brackets replaced by the CSV at
/// `brackets` when given.
pub fn load_rate_table(
    year: i32,
    brackets: Option<&Path>,
) -> Result<RateTable> {
    let table = match brackets {
        Some(path) => RateScheduleLoader::load_path(path, year)
            .with_context(|| format!("cannot load bracket schedule '{}'", path.display()))?,
        None => RateTable::for_year(year)
            .with_context(|| format!("no rate table for tax year {year}"))?,
    };
    debug!(tax_year = table.tax_year, brackets = table.brackets.len(), "rate table ready");
    Ok(table)
}

/// Output switches shared by `calculate` and `profile calculate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub record: bool,
    pub json: bool,
}

fn render(
    name: &str,
    rate_table: &RateTable,
    result: &CalculationResult,
    json: bool,
) -> Result<String> {
    if json {
        let mut text =
            serde_json::to_string_pretty(result).context("cannot encode result as JSON")?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(ResultReport {
            name,
            rate_table,
            result,
        }
        .to_string())
    }
}

/// Computes `input`, records it when asked, and renders the result.
///
/// `repo` may be `None` only when nothing is to be recorded.
pub async fn calculate_input(
    repo: Option<&dyn TaxRepository>,
    rate_table: &RateTable,
    name: &str,
    input: &InputFile,
    options: OutputOptions,
) -> Result<String> {
    if let Some(statutory) = input.unclaimed_personal_allowance(&rate_table.allowances) {
        warn!(%name, %statutory, "no personal allowance claimed; deductions.personal is 0");
    }
    let result = compute(rate_table, &input.income, &input.deductions, input.withholding_tax);
    info!(%name, tax = %result.tax, net_income = %result.net_income, "calculated");

    let mut output = render(name, rate_table, &result, options.json)?;

    if options.record {
        let repo = repo.context("recording requires a repository")?;
        let record = repo
            .save_calculation(&NewCalculationRecord::from_result(name, &result))
            .await
            .context("cannot record calculation")?;
        if !options.json {
            output.push_str(&format!("Recorded calculation #{}\n", record.id));
        }
    }
    Ok(output)
}

/// `thai-tax calculate --input <file>`.
pub async fn calculate_file(
    repo: Option<&dyn TaxRepository>,
    rate_table: &RateTable,
    path: &Path,
    save_profile: bool,
    options: OutputOptions,
) -> Result<String> {
    let input = InputFile::load(path).with_context(|| format!("cannot use input '{}'", path.display()))?;
    let fallback = default_name(path);
    let name = input.name_or(&fallback).to_string();

    let mut output = calculate_input(repo, rate_table, &name, &input, options).await?;

    if save_profile {
        let repo = repo.context("saving a profile requires a repository")?;
        let profile = repo
            .save_profile(&input.to_profile(&name))
            .await
            .with_context(|| format!("cannot save profile '{name}'"))?;
        if !options.json {
            output.push_str(&format!("Saved profile '{}'\n", profile.name));
        }
    }
    Ok(output)
}

pub async fn profile_list(repo: &dyn TaxRepository) -> Result<String> {
    let profiles = repo.list_profiles().await.context("cannot list profiles")?;
    Ok(ProfileList(&profiles).to_string())
}

/// The stored inputs as TOML, ready for `calculate --input`.
pub async fn profile_show(
    repo: &dyn TaxRepository,
    name: &str,
) -> Result<String> {
    let profile = repo
        .get_profile(name)
        .await
        .with_context(|| format!("profile '{name}'"))?;
    InputFile::from(profile)
        .to_toml()
        .context("cannot render profile as TOML")
}

pub async fn profile_delete(
    repo: &dyn TaxRepository,
    name: &str,
) -> Result<String> {
    repo.delete_profile(name)
        .await
        .with_context(|| format!("profile '{name}'"))?;
    Ok(format!("Deleted profile '{}'\n", name.trim()))
}

pub async fn profile_calculate(
    repo: &dyn TaxRepository,
    rate_table: &RateTable,
    name: &str,
    options: OutputOptions,
) -> Result<String> {
    let profile = repo
        .get_profile(name)
        .await
        .with_context(|| format!("profile '{name}'"))?;
    let input = InputFile::from(profile);
    let name = input.name_or(name).to_string();
    calculate_input(Some(repo), rate_table, &name, &input, options).await
}

pub async fn history_list(
    repo: &dyn TaxRepository,
    limit: Option<u32>,
) -> Result<String> {
    let records = repo
        .list_calculations(limit)
        .await
        .context("cannot list history")?;
    Ok(HistoryList(&records).to_string())
}

pub async fn history_show(
    repo: &dyn TaxRepository,
    id: i64,
) -> Result<String> {
    let record = repo
        .get_calculation(id)
        .await
        .with_context(|| format!("calculation #{id}"))?;
    Ok(RecordReport(&record).to_string())
}

pub async fn history_delete(
    repo: &dyn TaxRepository,
    id: i64,
) -> Result<String> {
    repo.delete_calculation(id)
        .await
        .with_context(|| format!("calculation #{id}"))?;
    Ok(format!("Deleted calculation #{id}\n"))
}

pub async fn history_stats(repo: &dyn TaxRepository) -> Result<String> {
    let stats = repo.statistics().await.context("cannot read statistics")?;
    Ok(StatisticsReport(&stats).to_string())
}

/// Runs one parsed command line and returns what to print.
pub async fn run(cli: Cli) -> Result<String> {
    let db_config = DbConfig::new(cli.backend, cli.db);

    match cli.command {
        Command::Calculate(CalculateArgs {
            input,
            save_profile,
            record,
            json,
        }) => {
            let rate_table = load_rate_table(cli.year, cli.brackets.as_deref())?;
            let repo = if save_profile || record {
                Some(open_repository(&db_config).await?)
            } else {
                None
            };
            calculate_file(
                repo.as_deref(),
                &rate_table,
                &input,
                save_profile,
                OutputOptions { record, json },
            )
            .await
        }
        Command::Profile { command } => {
            let repo = open_repository(&db_config).await?;
            match command {
                ProfileCommand::List => profile_list(&*repo).await,
                ProfileCommand::Show { name } => profile_show(&*repo, &name).await,
                ProfileCommand::Delete { name } => profile_delete(&*repo, &name).await,
                ProfileCommand::Calculate { name, record, json } => {
                    let rate_table = load_rate_table(cli.year, cli.brackets.as_deref())?;
                    profile_calculate(&*repo, &rate_table, &name, OutputOptions { record, json })
                        .await
                }
            }
        }
        Command::History { command } => {
            let repo = open_repository(&db_config).await?;
            match command {
                HistoryCommand::List { limit } => history_list(&*repo, limit).await,
                HistoryCommand::Show { id } => history_show(&*repo, id).await,
                HistoryCommand::Delete { id } => history_delete(&*repo, id).await,
                HistoryCommand::Stats => history_stats(&*repo).await,
            }
        }
    }
}
