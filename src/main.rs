use clap::Parser;
use color_eyre::Result;
use sse2ws::cli::Args;
use sse2ws::logging::init_logging;
use sse2ws::server;

fn main() -> Result<()> {
    // Exits on --help, --version and usage errors
    let args = Args::parse();

    color_eyre::install()?;
    init_logging(args.verbose);

    let config = args.into_config()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(config))
}
