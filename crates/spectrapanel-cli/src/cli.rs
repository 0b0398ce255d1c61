//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spectrapanel_core::config::PanelConfig;
use spectrapanel_core::spectral::{ChannelSet, ReferenceMode};

#[derive(Parser, Debug)]
#[command(author, version, about = "Control panel for AS7341 spectral sensors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Origin serving the sensor endpoint, e.g. http://192.168.1.40/
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Use the development board at esp32-as7341.local
    #[arg(long, global = true, conflicts_with = "host")]
    pub dev: bool,

    /// Talk to a simulated sensor instead of hardware
    #[arg(long)]
    pub demo: bool,

    /// ATIME register
    #[arg(long, global = true)]
    pub atime: Option<u32>,

    /// ASTEP register
    #[arg(long, global = true)]
    pub astep: Option<u32>,

    /// Gain exponent, multiplier is 2^gain
    #[arg(long, global = true)]
    pub gain: Option<u32>,

    /// LED current in mA, values below 4 switch the LED off
    #[arg(long, global = true)]
    pub led: Option<u32>,

    /// Normalization reference: sunlight, direct or live
    #[arg(long)]
    pub reference: Option<ReferenceMode>,

    /// Channels reported by the firmware: visible, clear or nir
    #[arg(long, global = true)]
    pub channels: Option<ChannelSet>,

    /// Keep reading until interrupted
    #[arg(long, short = 'r')]
    pub repeat: bool,

    /// Stop repeating after this many reads
    #[arg(long, requires = "repeat")]
    pub count: Option<usize>,

    /// Print the JSON returned by the sensor
    #[arg(long)]
    pub raw: bool,

    /// Accept commands on stdin while running
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// More log output (repeat for even more)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show exposure, gain and LED current for the given settings
    Params,
    /// Print the effective configuration
    Config {
        /// Write it to the config file as well
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    /// Fold command line settings into the loaded configuration
    pub fn apply_overrides(&self, config: &mut PanelConfig) {
        if let Some(host) = &self.host {
            config.sensor.origin = Some(host.clone());
            config.sensor.development = Some(false);
        }
        if self.dev {
            config.sensor.development = Some(true);
        }
        if let Some(atime) = self.atime {
            config.acquisition.atime = atime;
        }
        if let Some(astep) = self.astep {
            config.acquisition.astep = astep;
        }
        if let Some(gain) = self.gain {
            config.acquisition.gain_exponent = gain;
        }
        if let Some(led) = self.led {
            config.acquisition.led_current_ma = led;
        }
        if let Some(reference) = self.reference {
            config.reference = reference;
        }
        if let Some(channels) = self.channels {
            config.channels = channels;
        }
    }

    /// Default log filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info,spectrapanel_core=debug",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_disables_development_mode() {
        let cli = Cli::parse_from(["spectrapanel", "--host", "http://10.0.0.5/", "--led", "12"]);
        let mut config = PanelConfig::default();
        cli.apply_overrides(&mut config);
        assert!(!config.sensor.is_development());
        assert_eq!(config.sensor.origin.as_deref(), Some("http://10.0.0.5/"));
        assert_eq!(config.acquisition.led_current_ma, 12);
    }

    #[test]
    fn test_reference_parses() {
        let cli = Cli::parse_from(["spectrapanel", "--reference", "direct"]);
        assert_eq!(cli.reference, Some(ReferenceMode::Direct));
    }

    #[test]
    fn test_non_numeric_parameter_rejected() {
        assert!(Cli::try_parse_from(["spectrapanel", "--atime", "abc"]).is_err());
    }
}
