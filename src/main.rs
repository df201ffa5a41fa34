use anyhow::Result;
use clap::Parser;
use seminario_rs::cli::{Args, Command};
use seminario_rs::generator::workflow::launch;
use seminario_rs::logging;
use seminario_rs::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = args.to_config()?;
    logging::init(config.verbose);

    match &args.command {
        Command::Generate(generate) => {
            let request = generate.to_request(&config);
            let report = launch(&config, &request, &generate.to_options()).await?;
            println!("✅ 研讨会文档已生成: {}", report.html_path.display());
            if let Some(pdf_path) = &report.pdf_path {
                println!("📄 PDF: {}", pdf_path.display());
            }
            println!("{}", report.timing_report);
        }
        Command::Serve(_) => {
            let state = AppState::from_config(config.clone())?;
            server::start_server(&config.server, state).await?;
        }
    }

    Ok(())
}
