use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use slat_shared_util::SettingKey;

use crate::placement::{AnimationMode, Area, IconContent, IconId, IconSpec, Orientation, PerOrientation};
use crate::settings::{Settings, KEY_BATTERY_CHARGING, KEY_BATTERY_LEVEL, KEY_PERCENTAGE_DISPLAY};

use super::{ModuleCtx, StatusModule};

const NAME: &str = "battery";
const SLOT: u32 = 1;
const ICON_SIZE: u32 = 24;
/// While on the charger, the charge sweep is redrawn on this cadence.
const CHARGING_REFRESH: Duration = Duration::from_secs(30);
/// The transient "Full" badge reverts to the plain readout after this long.
const FULL_BADGE_HOLD: Duration = Duration::from_secs(3);

const TICK_CHARGING: &str = "charging-refresh";
const TICK_FULL_HIDE: &str = "full-hide";

pub struct BatteryModule {
    icons: Option<PerOrientation<IconId>>,
}

impl BatteryModule {
    pub fn new() -> Self {
        BatteryModule { icons: None }
    }

    fn refresh_content(&self, settings: &Settings, ctx: &mut ModuleCtx) {
        if let Some(icons) = &self.icons {
            for orientation in Orientation::ALL {
                let _ = ctx.service.set_content(orientation, *icons.get(orientation), content_for(settings));
            }
        }
    }

    fn set_animation(&self, animation: AnimationMode, ctx: &mut ModuleCtx) {
        if let Some(icons) = &self.icons {
            for orientation in Orientation::ALL {
                let _ = ctx.service.set_animation(orientation, *icons.get(orientation), animation);
            }
        }
    }

    fn apply_charging_state(&self, settings: &Settings, ctx: &mut ModuleCtx) {
        if settings.battery_charging {
            self.set_animation(AnimationMode::Blink, ctx);
            ctx.timers.arm(NAME, TICK_CHARGING, CHARGING_REFRESH);
            if settings.battery_level >= 100 {
                // Fully charged: flash a badge, then fall back to the readout.
                if let Some(icons) = &self.icons {
                    for orientation in Orientation::ALL {
                        let _ = ctx.service.set_text(orientation, *icons.get(orientation), "Full".to_string());
                    }
                }
                self.set_animation(AnimationMode::None, ctx);
                ctx.timers.arm(NAME, TICK_FULL_HIDE, FULL_BADGE_HOLD);
            }
        } else {
            ctx.timers.disarm(NAME, TICK_CHARGING);
            self.set_animation(AnimationMode::None, ctx);
        }
    }
}

impl StatusModule for BatteryModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self, ctx: &mut ModuleCtx, settings: &Settings) -> Result<()> {
        let icons = super::register_pair(ctx.service, |_| {
            IconSpec::new(NAME, Area::Fixed, SLOT, content_for(settings))
        })?;
        super::set_shown(ctx.service, &icons, true);
        self.icons = Some(icons);
        self.apply_charging_state(settings, ctx);
        Ok(())
    }

    fn shutdown(&mut self, ctx: &mut ModuleCtx) {
        ctx.timers.disarm(NAME, TICK_CHARGING);
        ctx.timers.disarm(NAME, TICK_FULL_HIDE);
        if let Some(icons) = &self.icons {
            super::set_shown(ctx.service, icons, false);
        }
    }

    fn on_setting_changed(&mut self, key: &SettingKey, settings: &Settings, ctx: &mut ModuleCtx) -> Result<()> {
        match key.0.as_str() {
            KEY_BATTERY_LEVEL | KEY_PERCENTAGE_DISPLAY => self.refresh_content(settings, ctx),
            KEY_BATTERY_CHARGING => self.apply_charging_state(settings, ctx),
            _ => {}
        }
        Ok(())
    }

    fn on_tick(&mut self, kind: &'static str, settings: &Settings, ctx: &mut ModuleCtx) -> Result<()> {
        match kind {
            TICK_CHARGING => {
                // Keep the sweep animation fresh while still on the charger.
                self.set_animation(AnimationMode::Blink, ctx);
                ctx.timers.arm(NAME, TICK_CHARGING, CHARGING_REFRESH);
            }
            TICK_FULL_HIDE => self.refresh_content(settings, ctx),
            _ => {}
        }
        Ok(())
    }
}

/// Map the charge to one of the seven level glyphs.
fn level_index(level: u8) -> u8 {
    (u32::from(level.min(100)) * 6 / 100) as u8
}

fn content_for(settings: &Settings) -> IconContent {
    let path = PathBuf::from(format!("icons/battery/level_{}.png", level_index(settings.battery_level)));
    if settings.percentage_display {
        IconContent::ImageText {
            path,
            width: ICON_SIZE,
            height: ICON_SIZE,
            text: format!("{}%", settings.battery_level.min(100)),
        }
    } else {
        IconContent::Image { path, width: ICON_SIZE, height: ICON_SIZE }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_index_spread() {
        assert_eq!(level_index(0), 0);
        assert_eq!(level_index(10), 0);
        assert_eq!(level_index(50), 3);
        assert_eq!(level_index(100), 6);
        assert_eq!(level_index(200), 6);
    }

    #[test]
    fn test_percentage_display_adds_text() {
        let mut settings = Settings::default();
        settings.battery_level = 37;
        settings.percentage_display = true;
        match content_for(&settings) {
            IconContent::ImageText { text, .. } => assert_eq!(text, "37%"),
            other => panic!("expected image+text content, got {:?}", other),
        }
    }
}
