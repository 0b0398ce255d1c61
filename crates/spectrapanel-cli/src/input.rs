//! Interactive commands typed on stdin
//!
//! Mirrors the controls of the panel: the go button, the repeat checkbox,
//! the three reference buttons and the parameter inputs.

use spectrapanel_core::acquisition::AcquisitionParameters;
use spectrapanel_core::panel::PanelCommand;
use spectrapanel_core::spectral::ChannelSet;

pub const HELP: &str = "commands: read | repeat on|off | sunlight | direct | calibrate | \
atime N | astep N | gain N | led N | channels visible|clear|nir | quit";

/// Turn one input line into a panel command
///
/// Parameter commands update `parameters` in place so successive edits
/// accumulate, the way the input fields on the page do.
pub fn parse_line(
    line: &str,
    parameters: &mut AcquisitionParameters,
) -> Result<Option<PanelCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    let word = word.to_lowercase();

    let command = match word.as_str() {
        "read" | "go" => PanelCommand::Read,
        "repeat" => match argument {
            Some("on") | None => PanelCommand::SetRepeat(true),
            Some("off") => PanelCommand::SetRepeat(false),
            Some(other) => return Err(format!("repeat expects on or off, got '{other}'")),
        },
        "stop" => PanelCommand::SetRepeat(false),
        "sunlight" => PanelCommand::UseSunlight,
        "direct" => PanelCommand::UseDirect,
        "calibrate" | "current" => PanelCommand::CalibrateNext,
        "channels" => {
            let set = argument
                .ok_or_else(|| "channels expects visible, clear or nir".to_string())?
                .parse::<ChannelSet>()?;
            PanelCommand::SetChannelSet(set)
        }
        "atime" | "astep" | "gain" | "led" => {
            let value = parse_number(&word, argument)?;
            match word.as_str() {
                "atime" => parameters.atime = value,
                "astep" => parameters.astep = value,
                "gain" => parameters.gain_exponent = value,
                _ => *parameters = parameters.with_led_current(value),
            }
            PanelCommand::SetParameters(*parameters)
        }
        "quit" | "exit" | "q" => PanelCommand::Quit,
        "help" | "?" => return Err(HELP.to_string()),
        other => return Err(format!("unknown command '{other}' ({HELP})")),
    };

    Ok(Some(command))
}

fn parse_number(name: &str, argument: Option<&str>) -> Result<u32, String> {
    let argument = argument.ok_or_else(|| format!("{name} expects a number"))?;
    argument
        .parse::<u32>()
        .map_err(|_| format!("{name} expects a non-negative integer, got '{argument}'"))
}
