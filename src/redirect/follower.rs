//! Bounded automatic redirect following.

use std::sync::Arc;

use http::{HeaderMap, StatusCode};

use crate::error::HttpError;
use crate::http::ResponseMeta;
use crate::transport::{Operation, OperationController, OperationEvent, Transport};

/// Wraps a chain of physical operations behind one logical [`Operation`].
///
/// The follower owns the current physical operation, forwards its
/// data/error/progress events verbatim, and on each redirect response
/// re-issues a copy of the request (URL replaced) through `issuer`, up to
/// `max_redirects` follow-ups. The original request is always sent, so a
/// budget of 0 still permits exactly one physical request.
pub struct RedirectFollower;

impl RedirectFollower {
    /// Take ownership of `first` and return the aggregated operation.
    ///
    /// Subsequent hops are issued through `issuer`, the same dispatch
    /// pipeline that produced `first`.
    pub fn spawn(first: Operation, max_redirects: u32, issuer: Arc<dyn Transport>) -> Operation {
        let (controller, aggregate) = Operation::channel(first.request().clone());
        tokio::spawn(follow(first, max_redirects, issuer, controller));
        aggregate
    }
}

async fn follow(
    mut current: Operation,
    mut redirects_remaining: u32,
    issuer: Arc<dyn Transport>,
    controller: OperationController,
) {
    // Set once the caller aborts the aggregate operation; the abort is
    // forwarded to the current hop and the chain winds down through that
    // hop's normal completion.
    let mut abort_forwarded = false;

    loop {
        let meta = loop {
            tokio::select! {
                event = current.next_event() => match event {
                    Some(OperationEvent::Finished(meta)) => break Some(meta),
                    Some(event) => controller.send(event),
                    None => break None,
                },
                () = controller.aborted(), if !abort_forwarded => {
                    abort_forwarded = true;
                    current.abort();
                }
            }
        };

        let Some(meta) = meta else {
            // The transport dropped its producer without a terminal event,
            // violating its exactly-once-finish contract.
            tracing::warn!(
                target: "reqguard::redirect",
                url = %current.url(),
                "operation ended without a terminal event"
            );
            let url = current.url().clone();
            controller.send_error(HttpError::transport(
                -1,
                "operation ended without completing",
            ));
            controller.finish(ResponseMeta::new(
                StatusCode::BAD_GATEWAY,
                HeaderMap::new(),
                url,
            ));
            return;
        };

        let target = if abort_forwarded {
            None
        } else {
            meta.redirect_target()
        };

        let Some(next_url) = target else {
            // Terminal state: no further redirect target, or the caller
            // aborted. The last hop's response is what the caller sees.
            controller.finish(meta);
            return;
        };

        if redirects_remaining == 0 {
            // Budget exhausted: complete with the unfollowed redirect
            // response rather than erroring.
            tracing::debug!(
                target: "reqguard::redirect",
                url = %meta.url,
                target = %next_url,
                "redirect budget exhausted"
            );
            controller.finish(meta);
            return;
        }

        if next_url.scheme() != "http" && next_url.scheme() != "https" {
            controller.send_error(HttpError::redirect(format!(
                "bad scheme in redirect target: {next_url}"
            )));
            controller.finish(meta);
            return;
        }

        redirects_remaining -= 1;
        tracing::debug!(
            target: "reqguard::redirect",
            from = %meta.url,
            to = %next_url,
            remaining = redirects_remaining,
            "following redirect"
        );

        let next_request = current.request().clone().with_url(next_url);
        // The superseded hop is dropped only here, after its terminal
        // event has been fully consumed.
        current = issuer.start(next_request);
    }
}
