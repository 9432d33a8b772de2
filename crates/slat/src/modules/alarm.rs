use std::path::PathBuf;

use anyhow::Result;
use slat_shared_util::SettingKey;

use crate::placement::{Area, IconContent, IconId, IconSpec, PerOrientation};
use crate::settings::{Settings, KEY_ALARM_SET};

use super::{ModuleCtx, StatusModule};

const NAME: &str = "alarm";
const PRIORITY: u32 = 3;
const ICON_SIZE: u32 = 24;

pub struct AlarmModule {
    icons: Option<PerOrientation<IconId>>,
}

impl AlarmModule {
    pub fn new() -> Self {
        AlarmModule { icons: None }
    }
}

impl StatusModule for AlarmModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self, ctx: &mut ModuleCtx, settings: &Settings) -> Result<()> {
        let icons = super::register_pair(ctx.service, |_| {
            IconSpec::new(
                NAME,
                Area::System,
                PRIORITY,
                IconContent::Image {
                    path: PathBuf::from("icons/alarm/set.png"),
                    width: ICON_SIZE,
                    height: ICON_SIZE,
                },
            )
        })?;
        super::set_shown(ctx.service, &icons, settings.alarm_set);
        self.icons = Some(icons);
        Ok(())
    }

    fn shutdown(&mut self, ctx: &mut ModuleCtx) {
        if let Some(icons) = &self.icons {
            super::set_shown(ctx.service, icons, false);
        }
    }

    fn on_setting_changed(&mut self, key: &SettingKey, settings: &Settings, ctx: &mut ModuleCtx) -> Result<()> {
        if key.0 == KEY_ALARM_SET {
            if let Some(icons) = &self.icons {
                super::set_shown(ctx.service, icons, settings.alarm_set);
            }
        }
        Ok(())
    }
}
