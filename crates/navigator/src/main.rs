use library_nav_lib::command::{execute_command, execute_json_batch, NavCommand};
use library_nav_lib::harness::TestHarness;
use library_nav_lib::room::library_path;
use library_nav_lib::state::NavSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_nav=info,library_nav_lib=info".into()),
        )
        .init();

    let args = parse_args();

    let settings = match &args.settings {
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| NavSettings::from_json(&json));
            match loaded {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {path}");
                    settings
                }
                Err(e) => {
                    tracing::error!("Failed to load settings from {path}: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => NavSettings::load(),
    };
    if args.save_settings {
        settings.save();
    }

    let home = library_path(library_nav_lib::fixtures::ROOM);
    let mut harness =
        TestHarness::with_settings(settings, args.address.as_deref().unwrap_or(&home));

    let responses = match &args.commands {
        Some(path) => {
            let json = match std::fs::read_to_string(path) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to read commands file {path}: {e}");
                    std::process::exit(1);
                }
            };
            match execute_json_batch(&mut harness, &json) {
                Ok(responses) => responses,
                Err(e) => {
                    tracing::error!("{e}");
                    std::process::exit(1);
                }
            }
        }
        None => vec![execute_command(&mut harness, NavCommand::Inspect)],
    };

    match serde_json::to_string_pretty(&responses) {
        Ok(out) => println!("{out}"),
        Err(e) => tracing::error!("Failed to encode responses: {e}"),
    }
}

#[derive(Default)]
struct Args {
    address: Option<String>,
    commands: Option<String>,
    settings: Option<String>,
    save_settings: bool,
}

/// `--address <href> --commands <file> --settings <file> --save-settings`
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--save-settings" {
            parsed.save_settings = true;
            i += 1;
            continue;
        }
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--address" => parsed.address = value,
            "--commands" => parsed.commands = value,
            "--settings" => parsed.settings = value,
            other => {
                tracing::warn!("Ignoring unknown argument {other}");
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    parsed
}
