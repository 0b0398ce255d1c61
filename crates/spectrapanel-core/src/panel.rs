//! Panel Controller
//!
//! Drives the read loop of the control panel. Commands from the front end
//! arrive over an `mpsc` channel and are applied between reads, so the
//! session is only ever touched by one flow.
//!
//! - At most one sensor request is in flight.
//! - In repeat mode the next request goes out as soon as the previous
//!   response has been rendered. Turning repeat off stops the next request,
//!   never the one in flight.
//! - Any error is rendered and ends repeat mode.
//! - Whenever a sequence of reads stops the LED is switched off.

use std::ops::ControlFlow;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::acquisition::{AcquisitionParameters, ParameterSummary, SensorRequest};
use crate::protocol::{SensorClient, SensorError};
use crate::session::{ProcessedReading, SpectralSession};
use crate::spectral::{ChannelSet, ReferenceMode};

/// Requests from the front end
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    /// Take one reading
    Read,
    /// Turn continuous reading on or off
    SetRepeat(bool),
    /// New acquisition parameters, used from the next request on
    SetParameters(AcquisitionParameters),
    /// Change which channels are extracted
    SetChannelSet(ChannelSet),
    /// Normalize against sunlight
    UseSunlight,
    /// Show unscaled sensor data
    UseDirect,
    /// Use the next reading as reference
    CalibrateNext,
    /// Stop the controller
    Quit,
}

/// What the front end is asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// Acquisition parameters in effect, with their derived labels
    Parameters {
        /// Settings used for the next request
        parameters: AcquisitionParameters,
        /// Labels derived from them
        summary: ParameterSummary,
    },
    /// A request went out to the sensor
    ReadStarted(SensorRequest),
    /// A reading was processed
    Reading(Box<ProcessedReading>),
    /// The read failed; shown in place of the chart
    Error(SensorError),
    /// Continuous reading was switched on or off
    RepeatChanged(bool),
    /// A new normalization reference was selected
    ReferenceChanged(ReferenceMode),
}

/// Output surface of the panel
pub trait ResultSink {
    /// Show one event; must not block the read loop for long
    fn render(&mut self, event: &PanelEvent);
}

/// Read loop tying a sensor client, a session and a sink together
#[derive(Debug)]
pub struct PanelController<C, S> {
    client: C,
    sink: S,
    session: SpectralSession,
    repeat: bool,
    read_on_start: bool,
    read_limit: Option<usize>,
    reads_taken: usize,
    /// `reads_taken` when repeat was last switched on
    repeat_started_at: usize,
    led_left_on: bool,
}

impl<C: SensorClient, S: ResultSink> PanelController<C, S> {
    /// Create an idle controller
    pub fn new(client: C, sink: S, session: SpectralSession) -> Self {
        Self {
            client,
            sink,
            session,
            repeat: false,
            read_on_start: false,
            read_limit: None,
            reads_taken: 0,
            repeat_started_at: 0,
            led_left_on: false,
        }
    }

    /// Take a first reading as soon as [`Self::run`] starts
    pub fn read_on_start(mut self, enabled: bool) -> Self {
        self.read_on_start = enabled;
        self
    }

    /// Start with continuous reading enabled
    pub fn repeat(mut self, enabled: bool) -> Self {
        self.repeat = enabled;
        self
    }

    /// Turn repeat off after this many reads in one repeated sequence
    pub fn read_limit(mut self, limit: Option<usize>) -> Self {
        self.read_limit = limit;
        self
    }

    /// Session state, including the active curve
    pub fn session(&self) -> &SpectralSession {
        &self.session
    }

    /// Output surface
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Sensor client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Whether continuous reading is on
    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// Reads attempted so far, failed ones included
    pub fn reads_taken(&self) -> usize {
        self.reads_taken
    }

    /// Process commands until `Quit`, or until the channel closes while idle
    pub async fn run(&mut self, mut commands: mpsc::Receiver<PanelCommand>) {
        self.render_parameters();

        let mut read_pending = self.read_on_start || self.repeat;

        loop {
            if !read_pending {
                match commands.recv().await {
                    Some(command) => {
                        if self.apply(command, &mut read_pending).is_break() {
                            break;
                        }
                        continue;
                    }
                    None => break,
                }
            }

            read_pending = false;
            let outcome = self.read_once().await;

            // Commands that arrived while the request was in flight
            let mut quit = false;
            loop {
                match commands.try_recv() {
                    Ok(command) => {
                        if self.apply(command, &mut read_pending).is_break() {
                            quit = true;
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            if quit {
                break;
            }

            if self.repeat && outcome.is_ok() {
                read_pending = true;
            } else {
                self.led_off().await;
            }
        }

        if self.led_left_on {
            self.led_off().await;
        }
        debug!(reads = self.reads_taken, "panel controller stopped");
    }

    /// Fetch, process and render a single reading
    pub async fn read_once(&mut self) -> Result<(), SensorError> {
        let request = self.session.parameters().to_request(self.repeat);
        self.sink.render(&PanelEvent::ReadStarted(request));
        self.led_left_on = request.keeps_led_on();

        let result = match self.client.fetch_reading(&request).await {
            Ok(raw) => self.session.process(raw).map_err(SensorError::from),
            Err(e) => Err(e),
        };
        self.reads_taken += 1;

        match result {
            Ok(processed) => {
                self.sink.render(&PanelEvent::Reading(Box::new(processed)));
                let repeated = self.reads_taken - self.repeat_started_at;
                if self.repeat && self.read_limit.is_some_and(|limit| repeated >= limit) {
                    self.set_repeat(false);
                }
                Ok(())
            }
            Err(e) => {
                warn!("sensor read failed: {e}");
                self.sink.render(&PanelEvent::Error(e.clone()));
                self.set_repeat(false);
                Err(e)
            }
        }
    }

    async fn led_off(&mut self) {
        self.client.switch_led_off().await;
        self.led_left_on = false;
    }

    fn apply(&mut self, command: PanelCommand, read_pending: &mut bool) -> ControlFlow<()> {
        debug!(?command, "panel command");
        match command {
            PanelCommand::Read => *read_pending = true,
            PanelCommand::SetRepeat(enabled) => {
                self.set_repeat(enabled);
                if enabled {
                    *read_pending = true;
                }
            }
            PanelCommand::SetParameters(parameters) => {
                self.session.set_parameters(parameters);
                self.render_parameters();
            }
            PanelCommand::SetChannelSet(set) => self.session.set_channel_set(set),
            PanelCommand::UseSunlight => {
                self.session.use_sunlight_reference();
                self.reference_changed(read_pending);
            }
            PanelCommand::UseDirect => {
                self.session.use_direct_reference();
                self.reference_changed(read_pending);
            }
            PanelCommand::CalibrateNext => {
                self.session.calibrate_on_next_read();
                self.reference_changed(read_pending);
            }
            PanelCommand::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    // A new reference only shows on the next reading; in repeat mode that
    // one is already on its way.
    fn reference_changed(&mut self, read_pending: &mut bool) {
        self.sink
            .render(&PanelEvent::ReferenceChanged(self.session.reference_mode()));
        if !self.repeat {
            *read_pending = true;
        }
    }

    fn set_repeat(&mut self, enabled: bool) {
        if self.repeat != enabled {
            self.repeat = enabled;
            if enabled {
                self.repeat_started_at = self.reads_taken;
            }
            self.sink.render(&PanelEvent::RepeatChanged(enabled));
        }
    }

    fn render_parameters(&mut self) {
        let parameters = *self.session.parameters();
        self.sink.render(&PanelEvent::Parameters {
            parameters,
            summary: parameters.summary(),
        });
    }
}

/// Sink that keeps every event, for tests and scripting
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    /// Events in the order they were rendered
    pub events: Vec<PanelEvent>,
}

impl RecordingSink {
    /// Rendered readings
    pub fn readings(&self) -> impl Iterator<Item = &ProcessedReading> {
        self.events.iter().filter_map(|event| match event {
            PanelEvent::Reading(reading) => Some(reading.as_ref()),
            _ => None,
        })
    }

    /// Rendered errors
    pub fn errors(&self) -> impl Iterator<Item = &SensorError> {
        self.events.iter().filter_map(|event| match event {
            PanelEvent::Error(e) => Some(e),
            _ => None,
        })
    }
}

impl ResultSink for RecordingSink {
    fn render(&mut self, event: &PanelEvent) {
        self.events.push(event.clone());
    }
}
