use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::app::DaemonCommand;

/// The timers modules run on: blink refreshes, auto-hide countdowns and the
/// like. Arming a (module, kind) pair that already has a pending timer
/// cancels the pending one first, so a superseded timer can never fire twice.
pub struct TimerScheduler {
    evt_send: UnboundedSender<DaemonCommand>,
    pending: HashMap<(&'static str, &'static str), CancellationToken>,
}

impl TimerScheduler {
    pub fn new(evt_send: UnboundedSender<DaemonCommand>) -> Self {
        TimerScheduler { evt_send, pending: HashMap::new() }
    }

    /// Arm (or rearm) a timer. When it expires, a tick for `(module, kind)`
    /// is delivered through the daemon's event queue.
    pub fn arm(&mut self, module: &'static str, kind: &'static str, delay: Duration) {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.insert((module, kind), token.clone()) {
            previous.cancel();
        }
        let evt_send = self.evt_send.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    crate::print_result_err!(
                        "while delivering a timer tick",
                        evt_send.send(DaemonCommand::ModuleTick { module, kind })
                    );
                }
            }
        });
    }

    pub fn disarm(&mut self, module: &'static str, kind: &'static str) {
        if let Some(token) = self.pending.remove(&(module, kind)) {
            token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, token) in self.pending.drain() {
            token.cancel();
        }
    }
}
