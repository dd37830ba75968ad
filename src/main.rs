use anyhow::{bail, Context};
use clap::Parser;
use exploder::persistence::load_project;
use exploder::publish::publish_project;
use exploder::templates::TemplateStore;
use exploder::{AppConfig, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Set up logging; RUST_LOG controls the level
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli);

    match cli.command {
        Some(Commands::Validate { project }) => {
            let loaded = load_project(&project)?;
            let issues = loaded.validate();
            if issues.is_empty() {
                println!("{}: {} pages, no issues", project.display(), loaded.pages.len());
                return Ok(());
            }
            for issue in &issues {
                println!("{issue:?}");
            }
            bail!("{} issue(s) found in {}", issues.len(), project.display());
        }
        Some(Commands::Publish { project, output }) => {
            let loaded = load_project(&project)?;
            publish_project(&loaded, &output)
                .with_context(|| format!("publishing {}", project.display()))?;
            println!("Published {} to {}", project.display(), output.display());
            Ok(())
        }
        Some(Commands::Templates) => {
            let store = TemplateStore::new(config.templates_dir());
            let installed = store.install_defaults()?;
            if installed > 0 {
                log::info!("Installed {installed} built-in templates");
            }
            for info in store.list() {
                println!("{:<28} {:<16} {}", info.name, info.category, info.description);
            }
            Ok(())
        }
        None => {
            // File dialogs run on tokio tasks spawned from the UI thread
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            let _guard = runtime.enter();
            exploder::run_app(config).map_err(|e| anyhow::anyhow!("{e}"))
        }
    }
}
