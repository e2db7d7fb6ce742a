// ── Wifi write-back ──
//
// Operator writes to `wifi.<ssid>.<toggle>` are pushed to the router. The
// profile list is fetched fresh so fields changed elsewhere are not
// overwritten, then the whole list is sent back with one update call.

use srm_api::{WifiProfile, WifiRadio};
use tracing::debug;

use crate::error::CoreError;
use crate::sanitize::sanitize_segment;
use crate::session::RouterSession;
use crate::store::{StateChange, StateTree};

/// Writable wifi toggle, named by its leaf id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WifiToggle {
    Enable,
    ClientIsolation,
    HideSsid,
    ScheduleEnable,
}

impl WifiToggle {
    fn from_leaf(leaf: &str) -> Option<Self> {
        match leaf {
            "enable" => Some(Self::Enable),
            "enable_client_isolation" => Some(Self::ClientIsolation),
            "hide_ssid" => Some(Self::HideSsid),
            "schedule_enable" => Some(Self::ScheduleEnable),
            _ => None,
        }
    }

    fn get(self, radio: &WifiRadio) -> bool {
        match self {
            Self::Enable => radio.enable,
            Self::ClientIsolation => radio.enable_client_isolation,
            Self::HideSsid => radio.hide_ssid,
            Self::ScheduleEnable => radio.schedule.enable,
        }
    }

    fn set(self, radio: &mut WifiRadio, value: bool) {
        let field = match self {
            Self::Enable => &mut radio.enable,
            Self::ClientIsolation => &mut radio.enable_client_isolation,
            Self::HideSsid => &mut radio.hide_ssid,
            Self::ScheduleEnable => &mut radio.schedule.enable,
        };
        *field = value;
    }
}

/// A pending operator write to a wifi toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WifiWrite {
    pub(crate) path: String,
    /// Sanitized SSID segment.
    pub(crate) ssid: String,
    pub(crate) toggle: WifiToggle,
    pub(crate) value: bool,
}

impl WifiWrite {
    /// Accepts unacknowledged boolean writes to `wifi.<ssid>.<toggle>`.
    pub(crate) fn parse(change: &StateChange) -> Option<Self> {
        if change.state.ack {
            return None;
        }
        let mut parts = change.path.split('.');
        let (Some("wifi"), Some(ssid), Some(leaf), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        Some(Self {
            path: change.path.clone(),
            ssid: ssid.to_owned(),
            toggle: WifiToggle::from_leaf(leaf)?,
            value: change.state.val.as_bool()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Pushed to the router and acknowledged in the store.
    Pushed,
    /// The router already has this value.
    Unchanged,
    /// No profile with this SSID.
    NoProfile,
}

/// Push `write` to the router and acknowledge it in `store`.
pub(crate) async fn apply<S: RouterSession>(
    session: &S,
    store: &StateTree,
    write: &WifiWrite,
) -> Result<Outcome, CoreError> {
    let mut settings = session.wifi_settings().await?;

    let Some(radio) = settings
        .profiles
        .iter_mut()
        .filter_map(WifiProfile::primary_radio_mut)
        .find(|radio| sanitize_segment(&radio.ssid) == write.ssid)
    else {
        return Ok(Outcome::NoProfile);
    };

    if write.toggle.get(radio) == write.value {
        return Ok(Outcome::Unchanged);
    }
    write.toggle.set(radio, write.value);
    debug!(path = %write.path, value = write.value, "pushing wifi profiles");

    session.set_wifi_settings(&settings.profiles).await?;
    store.write(&write.path, write.value, true)?;
    Ok(Outcome::Pushed)
}
