//! The status sources feeding the bar. Each module is a self-contained unit:
//! it registers its icons once at startup, listens to the settings keys it
//! cares about, and asks the placement service to show or hide them. Whether
//! an icon actually appears is the placement engine's decision, not the
//! module's.

pub mod alarm;
pub mod battery;
pub mod bluetooth;
pub mod clock;
pub mod notifications;
pub mod rssi;

use anyhow::Result;
use slat_shared_util::SettingKey;

use crate::error::PlacementError;
use crate::placement::{IconId, IconSpec, IndicatorService, Orientation, PerOrientation};
use crate::settings::Settings;
use crate::timer::TimerScheduler;

/// The daemon state a module may touch from its lifecycle hooks.
pub struct ModuleCtx<'a> {
    pub service: &'a mut IndicatorService,
    pub timers: &'a mut TimerScheduler,
}

/// One self-contained status source. The daemon holds a homogeneous
/// collection of these and dispatches lifecycle events uniformly.
pub trait StatusModule {
    fn name(&self) -> &'static str;

    /// Called once at daemon startup, after settings are loaded. Registers
    /// the module's icons and shows whatever the current settings call for.
    fn init(&mut self, ctx: &mut ModuleCtx, settings: &Settings) -> Result<()>;

    /// Called when the daemon shuts down cleanly.
    fn shutdown(&mut self, ctx: &mut ModuleCtx);

    /// Called once per changed settings key.
    fn on_setting_changed(&mut self, key: &SettingKey, settings: &Settings, ctx: &mut ModuleCtx) -> Result<()>;

    fn on_language_changed(&mut self, _settings: &Settings, _ctx: &mut ModuleCtx) -> Result<()> {
        Ok(())
    }

    /// Called when the screen comes back on.
    fn on_wake(&mut self, _ctx: &mut ModuleCtx) -> Result<()> {
        Ok(())
    }

    /// Called when one of the module's timers fires.
    fn on_tick(&mut self, _kind: &'static str, _settings: &Settings, _ctx: &mut ModuleCtx) -> Result<()> {
        Ok(())
    }
}

pub fn create_modules() -> Vec<Box<dyn StatusModule>> {
    vec![
        Box::new(clock::ClockModule::new()),
        Box::new(battery::BatteryModule::new()),
        Box::new(rssi::RssiModule::new()),
        Box::new(bluetooth::BluetoothModule::new()),
        Box::new(alarm::AlarmModule::new()),
    ]
}

/// Register the per-orientation pair of icons a module owns.
pub fn register_pair(
    service: &mut IndicatorService,
    spec_for: impl Fn(Orientation) -> IconSpec,
) -> Result<PerOrientation<IconId>, PlacementError> {
    Ok(PerOrientation {
        portrait: service.register(Orientation::Portrait, spec_for(Orientation::Portrait))?,
        landscape: service.register(Orientation::Landscape, spec_for(Orientation::Landscape))?,
    })
}

/// Show or hide a module's icon pair. Admission refusals are the placement
/// engine's business and already logged there; the wish stays recorded either
/// way, so modules don't need to care about the outcome.
pub fn set_shown(service: &mut IndicatorService, icons: &PerOrientation<IconId>, shown: bool) {
    for orientation in Orientation::ALL {
        let id = *icons.get(orientation);
        let _ = if shown { service.show(orientation, id) } else { service.hide(orientation, id) };
    }
}
