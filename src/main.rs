use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use paper_eta::config::{AppConfig, SiteConfiguration};
use paper_eta::epd;
use paper_eta::eta::{EtaFormat, Locale};
use paper_eta::forms::{parse_form, EpaperSettings, ScheduleForm};
use paper_eta::ui::{self, Form};

#[derive(Parser, Debug)]
#[command(name = "paper-eta")]
#[command(version)]
#[command(about = "Manage an e-paper Hong Kong transport ETA sign")]
struct Args {
    /// Output site configuration status as JSON
    #[arg(short, long)]
    status: bool,

    /// Report whether TEXT is valid JSON
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    check_json: Option<String>,

    /// Report whether TEXT is a finite number
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    check_numeric: Option<String>,

    /// Print TEXT in title case
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    title_case: Option<String>,

    /// Serialize a form snapshot to the JSON object the page submits
    #[arg(long, value_name = "PATH")]
    serialize_form: Option<PathBuf>,

    /// Validate an e-paper settings form snapshot and save it
    #[arg(long, value_name = "PATH")]
    apply_settings: Option<PathBuf>,

    /// Validate a schedule form snapshot against the configured display
    #[arg(long, value_name = "PATH")]
    validate_schedule: Option<PathBuf>,

    /// Print the site configuration for backup
    #[arg(long)]
    export_config: bool,

    /// Merge a previously exported site configuration
    #[arg(long, value_name = "PATH")]
    import_config: Option<PathBuf>,

    /// List the models of an e-paper brand
    #[arg(long, value_name = "BRAND")]
    models: Option<String>,

    /// List the layouts of a model for an ETA format
    #[arg(long, num_args = 3, value_names = ["BRAND", "MODEL", "FORMAT"])]
    layouts: Option<Vec<String>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging before the config so its warnings are not lost
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("{:#}; using defaults", e);
        AppConfig::default()
    });

    if !from_env {
        match EnvFilter::try_new(&config.log_level) {
            Ok(filter) => {
                if let Err(e) = filter_handle.reload(filter) {
                    tracing::warn!("Failed to apply log level: {}", e);
                }
            }
            Err(e) => tracing::warn!("Invalid log_level '{}': {}", config.log_level, e),
        }
    }

    // Stateless helpers
    if let Some(text) = args.check_json {
        println!("{}", ui::is_json(&text));
        return Ok(());
    }

    if let Some(text) = args.check_numeric {
        println!("{}", ui::is_numeric(text.as_str()));
        return Ok(());
    }

    if let Some(text) = args.title_case {
        println!("{}", ui::title_case(&text));
        return Ok(());
    }

    if let Some(brand) = args.models {
        for model in epd::models(&brand) {
            println!("{}", model);
        }
        return Ok(());
    }

    if let Some(spec) = args.layouts {
        return print_layouts(&spec);
    }

    if let Some(path) = args.serialize_form {
        let form = read_form(&path)?;
        println!("{}", serde_json::to_string_pretty(&ui::form_to_json(&form))?);
        return Ok(());
    }

    // Commands touching the site configuration
    let site_path = config.site_config_path();
    let mut site = SiteConfiguration::load(&site_path)
        .with_context(|| format!("Failed to load {}", site_path.display()))?;

    if args.status {
        return print_status(&site);
    }

    if let Some(path) = args.apply_settings {
        return apply_settings(&path, &mut site, config.default_locale);
    }

    if let Some(path) = args.validate_schedule {
        return validate_schedule(&path, &site);
    }

    if args.export_config {
        println!("{}", site.export()?);
        return Ok(());
    }

    if let Some(path) = args.import_config {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        site.import(file)?;
        tracing::info!("Imported site configuration from {}", path.display());
        return Ok(());
    }

    print_status(&site)
}

fn print_status(site: &SiteConfiguration) -> Result<()> {
    let output = serde_json::json!({
        "configured": site.is_configured(),
        "path": site.path(),
        "epd_brand": site.epd_brand(),
        "epd_model": site.epd_model(),
        "eta_locale": site.get("eta_locale"),
        "dry_run": site.dry_run(),
        "degree": site.get("degree"),
    });

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn print_layouts(spec: &[String]) -> Result<()> {
    let [brand, model, format] = spec else {
        anyhow::bail!("Expected BRAND MODEL FORMAT");
    };
    let format: EtaFormat = format.parse()?;

    for layout in epd::layouts(brand, model, format)? {
        println!("{}", layout);
    }
    Ok(())
}

/// Read a form snapshot (`{"controls": [...]}`) from disk
fn read_form(path: &Path) -> Result<Form> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = ui::parse_json(&content)
        .with_context(|| format!("{} is not a form snapshot", path.display()))?;
    Ok(serde_json::from_value(value)?)
}

fn apply_settings(path: &Path, site: &mut SiteConfiguration, locale: Locale) -> Result<()> {
    let form = read_form(path)?;
    let settings = EpaperSettings::from_fields_with_locale(&ui::form_to_json(&form), locale)?;

    if site.apply_settings(&settings)? {
        println!("Display changed: refresh schedules need to be enabled again");
    }
    println!("Settings saved to {}", site.path().display());
    Ok(())
}

fn validate_schedule(path: &Path, site: &SiteConfiguration) -> Result<()> {
    if !site.is_configured() {
        anyhow::bail!("Configure the e-paper display before adding schedules");
    }

    let form = read_form(path)?;
    let schedule: ScheduleForm = parse_form(&form)?;

    if let (Some(brand), Some(model)) = (site.epd_brand(), site.epd_model()) {
        if !schedule.layout_supported(brand, model) {
            anyhow::bail!(
                "Layout '{}' is not available for {} {} ({} format)",
                schedule.layout,
                brand,
                model,
                schedule.eta_format
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&schedule)?);
    Ok(())
}
