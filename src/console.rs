//! Console composition root
//!
//! Probes the module once to learn its variant, then wires the variant's
//! telemetry series into a [`TelemetrySession`] and its config fields into
//! a [`ConfigSync`]. Remote completions come back as [`ConsoleEvent`]s and
//! are applied on the owner's thread in [`Console::poll`].

use std::sync::mpsc::{self, Receiver, Sender};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::core::{
    build_chart, ChartModel, ConfigDescriptor, ConfigError, ConfigRequest, ConfigSync, FieldEdit,
    ModuleDescriptor, ModuleVariant,
};
use crate::poller::{RepaintHook, TelemetryPoller, TelemetrySession};
use crate::settings::ConsoleSettings;
use crate::transport::{ModuleApi, TransportError};

/// Remote completion delivered back to the console
#[derive(Debug)]
pub enum ConsoleEvent {
    Detected(ModuleVariant),
    Encodings(Result<Vec<String>, TransportError>),
    ConfigRead(Result<ConfigDescriptor, TransportError>),
    ConfigWritten(Result<(), TransportError>),
    ConfigReloaded(Result<(), TransportError>),
}

/// Everything that exists once the variant is known
pub struct ModuleView {
    pub descriptor: &'static ModuleDescriptor,
    pub telemetry: TelemetrySession,
    pub config: ConfigSync,
}

pub struct Console<A: ModuleApi> {
    api: A,
    runtime: Handle,
    settings: ConsoleSettings,
    repaint: RepaintHook,
    tx: Sender<ConsoleEvent>,
    rx: Receiver<ConsoleEvent>,
    variant: ModuleVariant,
    module: Option<ModuleView>,
}

impl<A: ModuleApi> Console<A> {
    /// Create the console and fire the one-shot variant probe
    pub fn start(api: A, runtime: Handle, settings: ConsoleSettings, repaint: RepaintHook) -> Self {
        let (tx, rx) = mpsc::channel();
        let console = Self {
            api,
            runtime,
            settings,
            repaint,
            tx,
            rx,
            variant: ModuleVariant::Unknown,
            module: None,
        };
        console.spawn_detection();
        console
    }

    fn spawn_detection(&self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            match api.stats().await {
                Ok(stats) => {
                    let variant = ModuleVariant::classify(&stats);
                    info!(%variant, "Module variant detected");
                    if tx.send(ConsoleEvent::Detected(variant)).is_ok() {
                        repaint();
                    }
                }
                // No retry: the console stays Unknown
                Err(e) => warn!(error = %e, "Variant probe failed"),
            }
        });
    }

    /// Apply all completions that arrived since the last call.
    ///
    /// Returns the number of events handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    fn handle(&mut self, event: ConsoleEvent) {
        debug!(?event, "Console event");
        match event {
            ConsoleEvent::Detected(variant) => self.on_detected(variant),
            ConsoleEvent::Encodings(result) => {
                if let Some(module) = &mut self.module {
                    let next = module.config.on_encodings(result);
                    self.dispatch(next);
                }
            }
            ConsoleEvent::ConfigRead(result) => {
                if let Some(module) = &mut self.module {
                    module.config.on_read(result);
                }
            }
            ConsoleEvent::ConfigWritten(result) => {
                if let Some(module) = &mut self.module {
                    let next = module.config.on_written(result);
                    self.dispatch(next);
                }
            }
            ConsoleEvent::ConfigReloaded(result) => {
                if let Some(module) = &mut self.module {
                    let next = module.config.on_reloaded(result);
                    self.dispatch(next);
                }
            }
        }
    }

    fn on_detected(&mut self, variant: ModuleVariant) {
        if self.variant != ModuleVariant::Unknown {
            return;
        }
        let Some(descriptor) = variant.descriptor() else {
            return;
        };
        self.variant = variant;

        let telemetry = TelemetryPoller::new(
            self.api.clone(),
            self.settings.display_window,
            self.settings.sample_rate,
            self.settings.update_rate,
        )
        .start(&self.runtime, self.repaint.clone());

        let mut config = ConfigSync::new(descriptor.config_fields);
        let first = config.start();

        self.module = Some(ModuleView {
            descriptor,
            telemetry,
            config,
        });
        self.dispatch(first);
    }

    /// Issue a config request; its completion comes back through `poll`
    fn dispatch(&self, request: ConfigRequest) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            let event = match request {
                ConfigRequest::FetchEncodings => ConsoleEvent::Encodings(api.get_encodings().await),
                ConfigRequest::Read => ConsoleEvent::ConfigRead(api.get_config().await),
                ConfigRequest::Write(draft) => {
                    ConsoleEvent::ConfigWritten(api.save_config(&draft).await)
                }
                ConfigRequest::Reload => ConsoleEvent::ConfigReloaded(api.reload_config().await),
            };
            // Receiver gone means the console was torn down
            if tx.send(event).is_ok() {
                repaint();
            }
        });
    }

    /// Refresh: re-read the config, dropping local edits
    pub fn refresh(&mut self) {
        if let Some(module) = &mut self.module {
            let request = module.config.read();
            self.dispatch(request);
        }
    }

    /// Apply: write the draft, then re-read
    pub fn apply(&mut self) {
        if let Some(module) = &mut self.module {
            if let Some(request) = module.config.apply() {
                self.dispatch(request);
            }
        }
    }

    /// Reload: module re-reads its own config source, then we re-read
    pub fn reload(&mut self) {
        if let Some(module) = &mut self.module {
            let request = module.config.reload();
            self.dispatch(request);
        }
    }

    pub fn edit(&mut self, field: &str, edit: FieldEdit) -> Result<(), ConfigError> {
        match &mut self.module {
            Some(module) => module.config.edit(field, edit),
            None => Err(ConfigError::NoDraft),
        }
    }

    pub fn variant(&self) -> ModuleVariant {
        self.variant
    }

    pub fn module(&self) -> Option<&ModuleView> {
        self.module.as_ref()
    }

    pub fn config(&self) -> Option<&ConfigSync> {
        self.module.as_ref().map(|m| &m.config)
    }

    pub fn sample_count(&self) -> usize {
        self.module
            .as_ref()
            .map_or(0, |m| m.telemetry.window().lock().len())
    }

    /// Chart input for a render at `now` (ms)
    pub fn chart(&self, now: f64) -> Option<ChartModel> {
        let module = self.module.as_ref()?;
        let window = module.telemetry.window().lock();
        Some(build_chart(&window, module.descriptor.series, now))
    }
}
