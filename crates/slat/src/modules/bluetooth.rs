use std::path::PathBuf;

use anyhow::Result;
use slat_shared_util::SettingKey;

use crate::placement::{Area, IconContent, IconId, IconSpec, PerOrientation};
use crate::settings::{Settings, KEY_BLUETOOTH_CONNECTED};

use super::{ModuleCtx, StatusModule};

const NAME: &str = "bluetooth";
const PRIORITY: u32 = 2;
const ICON_SIZE: u32 = 24;

pub struct BluetoothModule {
    icons: Option<PerOrientation<IconId>>,
}

impl BluetoothModule {
    pub fn new() -> Self {
        BluetoothModule { icons: None }
    }
}

impl StatusModule for BluetoothModule {
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
                    path: PathBuf::from("icons/bluetooth/connected.png"),
                    width: ICON_SIZE,
                    height: ICON_SIZE,
                },
            )
        })?;
        super::set_shown(ctx.service, &icons, settings.bluetooth_connected);
        self.icons = Some(icons);
        Ok(())
    }

    fn shutdown(&mut self, ctx: &mut ModuleCtx) {
        if let Some(icons) = &self.icons {
            super::set_shown(ctx.service, icons, false);
        }
    }

    fn on_setting_changed(&mut self, key: &SettingKey, settings: &Settings, ctx: &mut ModuleCtx) -> Result<()> {
        if key.0 == KEY_BLUETOOTH_CONNECTED {
            if let Some(icons) = &self.icons {
                super::set_shown(ctx.service, icons, settings.bluetooth_connected);
            }
        }
        Ok(())
    }
}
