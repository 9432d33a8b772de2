use std::path::PathBuf;

use anyhow::Result;
use slat_shared_util::SettingKey;

use crate::placement::{Area, IconContent, IconId, IconSpec, Orientation, PerOrientation};
use crate::settings::{Settings, KEY_RSSI_AVAILABLE, KEY_RSSI_LEVEL};

use super::{ModuleCtx, StatusModule};

const NAME: &str = "rssi";
const SLOT: u32 = 2;
const ICON_SIZE: u32 = 24;

/// Cellular signal strength. Hidden entirely in flight mode / without a modem.
pub struct RssiModule {
    icons: Option<PerOrientation<IconId>>,
}

impl RssiModule {
    pub fn new() -> Self {
        RssiModule { icons: None }
    }

    fn apply(&self, settings: &Settings, ctx: &mut ModuleCtx) {
        if let Some(icons) = &self.icons {
            for orientation in Orientation::ALL {
                let _ = ctx.service.set_content(orientation, *icons.get(orientation), content_for(settings));
            }
            super::set_shown(ctx.service, icons, settings.rssi_available);
        }
    }
}

impl StatusModule for RssiModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self, ctx: &mut ModuleCtx, settings: &Settings) -> Result<()> {
        let icons =
            super::register_pair(ctx.service, |_| IconSpec::new(NAME, Area::Fixed, SLOT, content_for(settings)))?;
        self.icons = Some(icons);
        self.apply(settings, ctx);
        Ok(())
    }

    fn shutdown(&mut self, ctx: &mut ModuleCtx) {
        if let Some(icons) = &self.icons {
            super::set_shown(ctx.service, icons, false);
        }
    }

    fn on_setting_changed(&mut self, key: &SettingKey, settings: &Settings, ctx: &mut ModuleCtx) -> Result<()> {
        if matches!(key.0.as_str(), KEY_RSSI_LEVEL | KEY_RSSI_AVAILABLE) {
            self.apply(settings, ctx);
        }
        Ok(())
    }
}

fn content_for(settings: &Settings) -> IconContent {
    let level = settings.rssi_level.min(4);
    IconContent::Image {
        path: PathBuf::from(format!("icons/rssi/level_{}.png", level)),
        width: ICON_SIZE,
        height: ICON_SIZE,
    }
}
