use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use slat_shared_util::{IconName, PackageName};

use crate::placement::{Area, IconContent, IconId, IconSpec, IndicatorService, Orientation, PerOrientation, Priority};

/// Rank given to app-originated notification icons. The Notification area
/// admits by evicting its least urgent resident, so a flat default keeps the
/// region FIFO-ish.
const DEFAULT_PRIORITY: Priority = 10;
const ICON_SIZE: u32 = 24;

/// Ongoing-notification icons, allocated per notifying package and torn down
/// again when that package's notification stream ends. Unlike the static
/// module icons, these come and go over the daemon's lifetime.
#[derive(Debug, Default)]
pub struct NotificationTray {
    active: HashMap<PackageName, PerOrientation<IconId>>,
}

impl NotificationTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, service: &mut IndicatorService, package: PackageName) -> Result<String> {
        if self.active.contains_key(&package) {
            return Ok(format!("notification icon for `{}` is already active", package));
        }
        let name = IconName(format!("noti/{}", package));
        let path = PathBuf::from(format!("icons/noti/{}.png", package));
        let icons = super::register_pair(service, |_| {
            IconSpec::new(
                name.clone(),
                Area::Notification,
                DEFAULT_PRIORITY,
                IconContent::Image { path: path.clone(), width: ICON_SIZE, height: ICON_SIZE },
            )
        })?;
        super::set_shown(service, &icons, true);
        self.active.insert(package.clone(), icons);
        Ok(format!("raised notification icon for `{}`", package))
    }

    pub fn deactivate(&mut self, service: &mut IndicatorService, package: &PackageName) -> Result<String> {
        match self.active.remove(package) {
            Some(icons) => {
                for orientation in Orientation::ALL {
                    let _ = service.unregister(orientation, *icons.get(orientation));
                }
                Ok(format!("cleared notification icon for `{}`", package))
            }
            None => bail!("no active notification icon for `{}`", package),
        }
    }
}
