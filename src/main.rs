use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    // Initialize logger; log lines go to stderr, responses to stdout
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = cli::args::Cli::parse();
    let response = cli::run(args)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
