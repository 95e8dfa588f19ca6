#![forbid(unsafe_code)]

use clap::{command, Arg, ArgAction, ArgMatches};
use color_eyre::eyre::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::commands::Command;

mod commands;
mod view;

use deck::config::ConsoleConfig;
use deck::log::*;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre()?;

    // Command configuration
    let matches = command!()
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Turn debugging information on. Overrides -q. Can specify up to -vvvv.")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Silence all output. Overridden by -v.")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .help("Path to the console config file. Defaults apply when omitted.")
                .short('c')
                .long("config")
                .global(true),
        )
        .arg(
            Arg::new("url")
                .help("Base URL of the console service. Overrides the config file.")
                .long("url")
                .global(true),
        )
        .subcommand(command!("console").about("Run the interactive console."))
        .subcommand(command!("status").about("Poll the host, network, and fleet once."))
        .subcommand(
            command!("exec")
                .about("Run one command and print its result.")
                .arg(
                    Arg::new("target")
                        .help("Where to run the command: `host`, `all`, or a client name.")
                        .short('t')
                        .long("target")
                        .default_value("host"),
                )
                .arg(
                    Arg::new("command")
                        .help("The command to run.")
                        .num_args(1..)
                        .trailing_var_arg(true),
                ),
        )
        .subcommand_required(true)
        .get_matches();

    // Set up logging
    let logging_config = tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::new(
            time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        ))
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact();

    let quiet = matches.get_flag("quiet");
    let verbose = matches.get_count("verbose") as usize;
    let logging_config = if quiet && verbose == 0 {
        logging_config.with_max_level(LevelFilter::ERROR)
    } else if verbose > 0 {
        let level = match verbose {
            1 => LevelFilter::WARN,
            2 => LevelFilter::INFO,
            3 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        logging_config.with_max_level(level)
    } else {
        logging_config.with_max_level(LevelFilter::ERROR)
    };

    let subscriber = logging_config.finish();
    subscriber.init();

    let config = read_config(&matches).await?;
    debug!("using console service at {}", config.base_url());

    // Run the commands
    if let Some((subcommand, matches)) = matches.subcommand() {
        let ctx = commands::CliContext::new(config, matches);
        debug!(
            "matched subcommand {} with matches: {:?}",
            &subcommand,
            &matches.ids().map(|id| id.as_str()).collect::<Vec<_>>()
        );
        match subcommand {
            "console" => commands::console::ConsoleCommand::new().run(&ctx).await?,
            "status" => commands::status::StatusCommand::new().run(&ctx).await?,
            "exec" => commands::exec::ExecCommand::new().run(&ctx).await?,
            _ => return Err(eyre!("Unrecognized subcommand: {}", subcommand)),
        }
    }
    Ok(())
}

async fn read_config(matches: &ArgMatches) -> Result<ConsoleConfig> {
    let config = match matches.get_one::<String>("config") {
        Some(path) => ConsoleConfig::load(path).await?,
        None => ConsoleConfig::default(),
    };
    Ok(match matches.get_one::<String>("url") {
        Some(url) => config.with_base_url(url).validate()?,
        None => config,
    })
}
