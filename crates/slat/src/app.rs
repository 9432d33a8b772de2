use anyhow::Result;
use slat_shared_util::PackageName;

use crate::daemon_response::DaemonResponseSender;
use crate::modules::notifications::NotificationTray;
use crate::modules::{ModuleCtx, StatusModule};
use crate::paths::SlatPaths;
use crate::placement::{IndicatorService, Orientation};
use crate::settings::{Settings, KEY_LANGUAGE, KEY_PERCENTAGE_DISPLAY};
use crate::timer::TimerScheduler;

#[derive(Debug)]
pub enum DaemonCommand {
    NoOp,
    ReloadSettings(DaemonResponseSender),
    SetPercentageDisplay {
        enabled: bool,
        sender: DaemonResponseSender,
    },
    Notify {
        package: PackageName,
        active: bool,
        sender: DaemonResponseSender,
    },
    Wake,
    ModuleTick {
        module: &'static str,
        kind: &'static str,
    },
    PrintState {
        all: bool,
        sender: DaemonResponseSender,
    },
    PrintDebug(DaemonResponseSender),
    KillServer,
}

pub struct App {
    pub service: IndicatorService,
    pub modules: Vec<Box<dyn StatusModule>>,
    pub notifications: NotificationTray,
    pub settings: Settings,
    pub timers: TimerScheduler,
    pub paths: SlatPaths,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("service", &self.service)
            .field("notifications", &self.notifications)
            .field("settings", &self.settings)
            .field("paths", &self.paths)
            .finish()
    }
}

impl App {
    /// Bring up the modules with the initial settings and render both bars.
    pub fn bootstrap(&mut self) {
        self.service.set_percentage_display(self.settings.percentage_display);
        let App { service, timers, modules, settings, .. } = self;
        let mut ctx = ModuleCtx { service, timers };
        for module in modules.iter_mut() {
            let name = module.name();
            log::debug!("initializing module {}", name);
            if let Err(err) = module.init(&mut ctx, settings) {
                log::error!("Failed to initialize module {}: {:?}", name, err);
            }
        }
        for orientation in Orientation::ALL {
            self.service.render(orientation);
        }
    }

    /// Handle a DaemonCommand event.
    pub fn handle_command(&mut self, event: DaemonCommand) {
        log::debug!("Handling event: {:?}", &event);
        if let Err(err) = self.dispatch_command(event) {
            log::error!("{:?}", err);
        }
    }

    fn dispatch_command(&mut self, event: DaemonCommand) -> Result<()> {
        match event {
            DaemonCommand::NoOp => {}
            DaemonCommand::ReloadSettings(sender) => match Settings::load(&self.paths.settings_file()) {
                Ok(new) => {
                    self.apply_settings(new);
                    sender.send_success("settings reloaded".to_string())?;
                }
                Err(err) => sender.send_failure(format!("{:?}", err))?,
            },
            DaemonCommand::SetPercentageDisplay { enabled, sender } => {
                let mut new = self.settings.clone();
                new.percentage_display = enabled;
                self.apply_settings(new);
                sender.send_success(format!(
                    "percentage display {}",
                    if enabled { "enabled" } else { "disabled" }
                ))?;
            }
            DaemonCommand::Notify { package, active, sender } => {
                let result = if active {
                    self.notifications.activate(&mut self.service, package)
                } else {
                    self.notifications.deactivate(&mut self.service, &package)
                };
                sender.respond_with_result(result)?;
            }
            DaemonCommand::Wake => {
                self.for_each_module(|module, _settings, ctx| module.on_wake(ctx));
            }
            DaemonCommand::ModuleTick { module, kind } => {
                let App { service, timers, modules, settings, .. } = self;
                let mut ctx = ModuleCtx { service, timers };
                if let Some(target) = modules.iter_mut().find(|m| m.name() == module) {
                    if let Err(err) = target.on_tick(kind, settings, &mut ctx) {
                        log::error!("Error in module {} handling tick {}: {:?}", module, kind, err);
                    }
                }
            }
            DaemonCommand::PrintState { all, sender } => sender.send_success(self.service.dump_state(all))?,
            DaemonCommand::PrintDebug(sender) => sender.send_success(format!("{:#?}", &self))?,
            DaemonCommand::KillServer => {
                log::info!("Received kill command, stopping server!");
                self.stop_application();
                let _ = crate::application_lifecycle::send_exit();
            }
        }
        Ok(())
    }

    /// Install a fresh settings snapshot: shift the capacity budgets if
    /// needed, then fan the changed keys out to the modules.
    fn apply_settings(&mut self, new: Settings) {
        let changed = self.settings.changed_keys(&new);
        if changed.is_empty() {
            log::debug!("settings unchanged");
            return;
        }
        self.settings = new;
        for key in changed {
            log::debug!("setting {} changed", key);
            match key.0.as_str() {
                KEY_PERCENTAGE_DISPLAY => {
                    // Budgets move first so that the modules' follow-up
                    // requests run against the new capacity.
                    let enabled = self.settings.percentage_display;
                    self.service.set_percentage_display(enabled);
                    self.for_each_module(|module, settings, ctx| module.on_setting_changed(&key, settings, ctx));
                }
                KEY_LANGUAGE => {
                    self.for_each_module(|module, settings, ctx| module.on_language_changed(settings, ctx));
                }
                _ => {
                    self.for_each_module(|module, settings, ctx| module.on_setting_changed(&key, settings, ctx));
                }
            }
        }
    }

    fn for_each_module(
        &mut self,
        mut f: impl FnMut(&mut Box<dyn StatusModule>, &Settings, &mut ModuleCtx) -> Result<()>,
    ) {
        let App { service, timers, modules, settings, .. } = self;
        let mut ctx = ModuleCtx { service, timers };
        for module in modules.iter_mut() {
            let name = module.name();
            if let Err(err) = f(module, settings, &mut ctx) {
                log::error!("Error in module {}: {:?}", name, err);
            }
        }
    }

    fn stop_application(&mut self) {
        self.timers.cancel_all();
        let App { service, timers, modules, .. } = self;
        let mut ctx = ModuleCtx { service, timers };
        for module in modules.iter_mut() {
            module.shutdown(&mut ctx);
        }
    }
}
