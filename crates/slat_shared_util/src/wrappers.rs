use derive_more::*;
use ref_cast::RefCast;
use serde::{Deserialize, Serialize};

/// The name of a status icon
#[repr(transparent)]
#[derive(Clone, Hash, PartialEq, Eq, Serialize, Deserialize, AsRef, From, FromStr, Display, DebugCustom, RefCast)]
#[debug(fmt = "IconName({})", .0)]
pub struct IconName(pub String);

impl std::borrow::Borrow<str> for IconName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IconName {
    fn from(s: &str) -> Self {
        IconName(s.to_owned())
    }
}

/// The identity of a package that raised an ongoing notification
#[repr(transparent)]
#[derive(Clone, Hash, PartialEq, Eq, Serialize, Deserialize, AsRef, From, FromStr, Display, DebugCustom, RefCast)]
#[debug(fmt = "PackageName({})", .0)]
pub struct PackageName(pub String);

impl std::borrow::Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        PackageName(s.to_owned())
    }
}

/// The name of a key in the system settings store
#[repr(transparent)]
#[derive(Clone, Hash, PartialEq, Eq, Serialize, Deserialize, AsRef, From, FromStr, Display, DebugCustom, RefCast)]
#[debug(fmt = "SettingKey({})", .0)]
pub struct SettingKey(pub String);

impl std::borrow::Borrow<str> for SettingKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        SettingKey(s.to_owned())
    }
}
