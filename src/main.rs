use clap::Parser;
use trend_herald::adapters::auth::{AppCredential, TokenCredential};
use trend_herald::adapters::github::GitHubDiscussions;
use trend_herald::adapters::openai::OpenAiGenerator;
use trend_herald::adapters::probe::HttpLinkProbe;
use trend_herald::domain::ports::CredentialProvider;
use trend_herald::utils::logger;
use trend_herald::{AppConfig, AuthConfig, Cli, PublishTarget, RunOutcome, TrendPipeline};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting trend-herald");
    if cli.verbose {
        tracing::debug!(?cli, "CLI flags");
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let credentials: Box<dyn CredentialProvider> = match &config.auth {
        AuthConfig::Token(token) => Box::new(TokenCredential::new(token.clone())),
        AuthConfig::App {
            app_id,
            installation_id,
            private_key_pem,
        } => Box::new(AppCredential::new(
            config.github_api_base.clone(),
            app_id.clone(),
            installation_id.clone(),
            private_key_pem.clone(),
        )),
    };

    let generator = OpenAiGenerator::new(
        config.openai_api_base.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    );
    let backend = GitHubDiscussions::new(config.github_api_base.clone(), credentials);
    let target = PublishTarget {
        owner: config.owner.clone(),
        repo: config.repo.clone(),
        category_id: config.category_id.clone(),
    };

    let pipeline = TrendPipeline::new(
        Box::new(generator),
        Box::new(HttpLinkProbe::new()),
        Box::new(backend),
        target,
    );

    match pipeline.run(cli.dry_run).await {
        Ok(RunOutcome::Published(published)) => {
            tracing::info!("✅ Discussion published successfully!");
            println!("✅ Discussion published: {}", published.url);
        }
        Ok(RunOutcome::DryRun { body }) => {
            tracing::info!("✅ Dry run completed");
            println!("{}", body);
        }
        Err(e) => {
            tracing::error!("❌ Run failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
