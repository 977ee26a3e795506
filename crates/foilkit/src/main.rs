use crate::prelude::*;
use clap::Parser;

mod convert;
mod download;
mod error;
mod http;
mod prelude;
mod scrape;
mod simulate;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Download airfoil coordinates, convert them to XFOIL ordering and compute lift/drag with XFOIL"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "FOILKIT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Download every coordinate file listed on the UIUC airfoil database
    Download(crate::download::App),

    /// Scrape coordinates and polars from an airfoil detail site
    Scrape(crate::scrape::App),

    /// Reorder raw coordinate files into XFOIL winding
    Convert(crate::convert::App),

    /// Run XFOIL on canonical files and archive the coefficients
    Simulate(crate::simulate::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Download(sub_app) => crate::download::run(sub_app, app.global).await,
        SubCommands::Scrape(sub_app) => crate::scrape::run(sub_app, app.global).await,
        SubCommands::Convert(sub_app) => crate::convert::run(sub_app, app.global).await,
        SubCommands::Simulate(sub_app) => crate::simulate::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
