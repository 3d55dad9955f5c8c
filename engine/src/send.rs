use host::{Event, Request};

use crate::ctx::StrategyCtx;
use crate::error::{TransportError, TransportErrorKind};

impl StrategyCtx {
    /// A synchronous-looking on-demand request (spec.md §4.E, the
    /// algorithm under spec.md's "4.G Send helper" heading):
    /// 1. ask the host to dispatch `request`, getting back a token
    /// 2. pause the timer — time spent waiting on the host is wall time,
    ///    not cooperative compute time
    /// 3. suspend until the matching `SendResponse` arrives
    /// 4. resume the timer
    /// 5. turn an error response into a typed [`TransportError`]
    pub async fn send(&self, request: Request) -> Result<String, TransportError> {
        let url = request.url.clone();
        let token = self.host.send(request).await.map_err(|err| TransportError {
            url: url.clone(),
            status: 0,
            content: err.to_string(),
            kind: TransportErrorKind::Other,
        })?;

        self.timer.borrow_mut().pause();
        let response = self
            .yield_want(move |ev: &Event| match ev {
                Event::SendResponse(sr) if sr.token == token => Some(sr.clone()),
                _ => None,
            })
            .await;
        self.timer.borrow_mut().resume();

        if response.error {
            return Err(TransportError {
                url,
                status: response.status,
                content: response.content,
                kind: TransportErrorKind::from_status(response.status),
            });
        }
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use host::event::SendResponse;
    use host::MockHost;

    use super::*;
    use crate::ctx::StrategyCtx;

    #[tokio::test]
    async fn a_successful_round_trip_returns_the_response_content() {
        let host = Arc::new(MockHost::new(["demo"]));
        let ctx = Rc::new(StrategyCtx::new("demo", host.clone()));

        let local = tokio::task::LocalSet::new();
        let ctx_for_send = ctx.clone();
        let send = local.spawn_local(async move { ctx_for_send.send(Request::get("https://x/balance")).await });

        local
            .run_until(async {
                tokio::task::yield_now().await;
                let (token, _) = host.sent_requests().into_iter().next().unwrap();
                ctx.try_resume(&Event::SendResponse(SendResponse {
                    token,
                    content: "ok".to_string(),
                    status: 200,
                    error: false,
                }));
                assert_eq!(send.await.unwrap(), Ok("ok".to_string()));
            })
            .await;
    }
}
