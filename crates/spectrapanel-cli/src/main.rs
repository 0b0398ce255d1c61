//! SpectraPanel terminal front end

mod cli;
mod input;
mod render;

use std::io::{self, BufRead};
use std::thread;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use render::TerminalSink;
use spectrapanel_core::acquisition::AcquisitionParameters;
use spectrapanel_core::config::PanelConfig;
use spectrapanel_core::demo::DemoSensor;
use spectrapanel_core::panel::{PanelCommand, PanelController, ResultSink};
use spectrapanel_core::protocol::{HttpSensorClient, SensorClient};
use spectrapanel_core::session::SpectralSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    let mut config = PanelConfig::load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    debug!(?config, "effective configuration");

    match cli.command {
        Some(Command::Params) => {
            print_parameters(&config.acquisition.to_parameters());
            return Ok(());
        }
        Some(Command::Config { save }) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = match cli.config.clone() {
                    Some(path) => path,
                    None => PanelConfig::default_path()
                        .context("no config directory on this platform, pass --config")?,
                };
                config.save(&path)?;
                eprintln!("Saved to {}", path.display());
            }
            return Ok(());
        }
        None => {}
    }

    let parameters = config.acquisition.to_parameters();
    let session =
        SpectralSession::new(parameters, config.channels).with_reference(config.reference);
    let sink = TerminalSink::stdout(config.channels, cli.raw);

    if cli.demo {
        info!("using simulated sensor");
        let sensor = DemoSensor::new().channel_set(config.channels);
        run_panel(sensor, sink, session, &cli).await
    } else {
        let endpoint = config.sensor.endpoint()?;
        info!(url = %endpoint.url(), "using sensor endpoint");
        let client = HttpSensorClient::new(endpoint, config.sensor.timeout())?;
        run_panel(client, sink, session, &cli).await
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_parameters(parameters: &AcquisitionParameters) {
    let summary = parameters.summary();
    println!("{}", parameters.exposure_description());
    println!("{}", summary.time_label());
    println!("{}", summary.gain_label());
    println!("{}", summary.current_label());
}

async fn run_panel<C, S>(
    client: C,
    sink: S,
    session: SpectralSession,
    cli: &Cli,
) -> anyhow::Result<()>
where
    C: SensorClient,
    S: ResultSink,
{
    let parameters = *session.parameters();
    let (tx, rx) = mpsc::channel(32);

    if cli.interactive {
        eprintln!("{}", input::HELP);
        // Detached: a blocked stdin read must not keep the process alive
        thread::Builder::new()
            .name("stdin".into())
            .spawn(move || forward_lines(io::stdin().lock(), tx, parameters))
            .context("failed to start stdin reader")?;
    } else {
        drop(tx);
    }

    let mut controller = PanelController::new(client, sink, session)
        .read_on_start(true)
        .repeat(cli.repeat)
        .read_limit(cli.count);

    let interrupted = tokio::select! {
        _ = controller.run(rx) => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        info!("interrupted, switching LED off");
        controller.client().switch_led_off().await;
    }
    Ok(())
}

/// Forward typed commands until EOF, `quit` or a closed controller
///
/// Runs on a plain thread and blocks on both the reader and the channel.
fn forward_lines<R: BufRead>(
    reader: R,
    tx: mpsc::Sender<PanelCommand>,
    mut parameters: AcquisitionParameters,
) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        match input::parse_line(&line, &mut parameters) {
            Ok(Some(command)) => {
                let quit = command == PanelCommand::Quit;
                if tx.blocking_send(command).is_err() || quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_forwarding_stops_at_quit() {
        let (tx, mut rx) = mpsc::channel(8);
        let script = Cursor::new("atime 0\nbogus\n\nread\nquit\nread\n");

        thread::spawn(move || forward_lines(script, tx, AcquisitionParameters::default()))
            .join()
            .unwrap();

        let mut forwarded = Vec::new();
        while let Ok(command) = rx.try_recv() {
            forwarded.push(command);
        }
        assert_eq!(
            forwarded,
            vec![
                PanelCommand::SetParameters(AcquisitionParameters::new(0, 3596, 9, 0)),
                PanelCommand::Read,
                PanelCommand::Quit,
            ]
        );
    }

    #[test]
    fn test_forwarding_stops_when_controller_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // Returns instead of blocking on the closed channel
        thread::spawn(move || {
            forward_lines(Cursor::new("read\nread\n"), tx, AcquisitionParameters::default())
        })
        .join()
        .unwrap();
    }
}
