use anyhow::Context;
use clap::{CommandFactory, Parser};
use vhunter::cli::Cli;
use vhunter::{logging, modes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init();

    if cli.global.no_color {
        colored::control::set_override(false);
    }

    if !cli.has_required_inputs() {
        println!("[!] Usage: vhunter --ip 10.8.0.1 --wordlist domains.txt");
        Cli::command().print_help()?;
        return Ok(());
    }

    cli.validate()?;

    modes::vhost::run(&cli)
        .await
        .context("vhost enumeration failed")?;

    Ok(())
}
