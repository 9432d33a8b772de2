use std::time::Duration;

use anyhow::Result;
use chrono::{Local, Timelike};
use slat_shared_util::SettingKey;

use crate::placement::{Area, IconContent, IconId, IconSpec, Orientation, PerOrientation};
use crate::settings::Settings;

use super::{ModuleCtx, StatusModule};

const NAME: &str = "clock";
const TICK_MINUTE: &str = "minute";
/// The clock owns the leftmost fixed slot and is never displaced.
const SLOT: u32 = 0;

pub struct ClockModule {
    icons: Option<PerOrientation<IconId>>,
    twelve_hour: bool,
}

impl ClockModule {
    pub fn new() -> Self {
        ClockModule { icons: None, twelve_hour: false }
    }

    fn current_text(&self) -> String {
        if self.twelve_hour {
            Local::now().format("%I:%M %p").to_string()
        } else {
            Local::now().format("%H:%M").to_string()
        }
    }

    fn refresh(&self, ctx: &mut ModuleCtx) {
        if let Some(icons) = &self.icons {
            let text = self.current_text();
            for orientation in Orientation::ALL {
                let _ = ctx.service.set_text(orientation, *icons.get(orientation), text.clone());
            }
        }
    }

    /// Schedule the next refresh for the upcoming full minute.
    fn arm_minute_tick(&self, ctx: &mut ModuleCtx) {
        let into_minute = u64::from(Local::now().second().min(59));
        ctx.timers.arm(NAME, TICK_MINUTE, Duration::from_secs(60 - into_minute));
    }
}

impl StatusModule for ClockModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self, ctx: &mut ModuleCtx, settings: &Settings) -> Result<()> {
        self.twelve_hour = uses_twelve_hour_clock(&settings.language);
        let text = self.current_text();
        let icons = super::register_pair(ctx.service, |_| {
            IconSpec::new(NAME, Area::Fixed, SLOT, IconContent::Text(text.clone())).always_top()
        })?;
        super::set_shown(ctx.service, &icons, true);
        self.icons = Some(icons);
        self.arm_minute_tick(ctx);
        Ok(())
    }

    fn shutdown(&mut self, ctx: &mut ModuleCtx) {
        ctx.timers.disarm(NAME, TICK_MINUTE);
        if let Some(icons) = &self.icons {
            super::set_shown(ctx.service, icons, false);
        }
    }

    fn on_setting_changed(&mut self, _key: &SettingKey, _settings: &Settings, _ctx: &mut ModuleCtx) -> Result<()> {
        Ok(())
    }

    fn on_language_changed(&mut self, settings: &Settings, ctx: &mut ModuleCtx) -> Result<()> {
        self.twelve_hour = uses_twelve_hour_clock(&settings.language);
        self.refresh(ctx);
        Ok(())
    }

    fn on_wake(&mut self, ctx: &mut ModuleCtx) -> Result<()> {
        // The displayed minute may be stale after a long screen-off stretch.
        self.refresh(ctx);
        self.arm_minute_tick(ctx);
        Ok(())
    }

    fn on_tick(&mut self, kind: &'static str, _settings: &Settings, ctx: &mut ModuleCtx) -> Result<()> {
        if kind == TICK_MINUTE {
            self.refresh(ctx);
            self.arm_minute_tick(ctx);
        }
        Ok(())
    }
}

fn uses_twelve_hour_clock(language: &str) -> bool {
    matches!(language.split(['_', '-']).next(), Some("en"))
}

#[cfg(test)]
mod test {
    use super::uses_twelve_hour_clock;

    #[test]
    fn test_twelve_hour_locales() {
        assert!(uses_twelve_hour_clock("en_US"));
        assert!(uses_twelve_hour_clock("en-GB"));
        assert!(!uses_twelve_hour_clock("de_DE"));
        assert!(!uses_twelve_hour_clock("ko_KR"));
    }
}
