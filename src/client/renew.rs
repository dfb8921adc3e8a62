//! Single-flight coordination for access token renewal.
//!
//! At most one renewal runs at a time. A caller that needs a new access token
//! while a renewal is already in flight awaits that renewal's outcome instead
//! of starting another one, so the refresh endpoint sees one call and the
//! store sees one write no matter how many requests failed with `401`.

use super::error::RequestError;
use futures::future::{BoxFuture, FutureExt, Shared};
use secrecy::SecretString;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub(crate) type RenewalOutcome = Result<SecretString, RequestError>;

type InFlight = Shared<BoxFuture<'static, RenewalOutcome>>;

#[derive(Default)]
pub(crate) struct RenewalGate {
    in_flight: Mutex<Option<InFlight>>,
}

impl RenewalGate {
    /// Await the in-flight renewal, or start one with `start` if none is running.
    pub(crate) async fn run<F>(&self, start: F) -> RenewalOutcome
    where
        F: FnOnce() -> BoxFuture<'static, RenewalOutcome>,
    {
        let renewal = {
            let mut slot = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(current) = slot.as_ref() {
                debug!("joining in-flight token renewal");
                current.clone()
            } else {
                let renewal = start().shared();
                *slot = Some(renewal.clone());
                renewal
            }
        };

        let outcome = renewal.clone().await;

        let mut slot = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&renewal))
        {
            *slot = None;
        }

        outcome
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
