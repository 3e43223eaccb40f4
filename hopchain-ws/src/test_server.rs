//! Minimal server side of the upgrade handshake, for tests only.

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::{
    WebSocketStream, accept_hdr_async,
    tungstenite::{
        Error as WsError,
        handshake::server::{ErrorResponse, Request, Response},
    },
};

#[derive(Debug)]
pub(crate) struct UpgradeRequest {
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
}

impl UpgradeRequest {
    fn from_request(request: &Request) -> Self {
        Self {
            path: request.uri().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_str().unwrap().to_owned()))
                .collect(),
        }
    }

    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Accept the upgrade, capturing the request it was made with.
pub(crate) async fn accept<S>(stream: S) -> (UpgradeRequest, WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut seen = None;
    let ws = accept_hdr_async(
        stream,
        |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            seen = Some(UpgradeRequest::from_request(request));
            Ok(response)
        },
    )
    .await
    .unwrap();
    (seen.unwrap(), ws)
}

/// Refuse the upgrade with a `403 Forbidden`.
pub(crate) async fn reject<S>(stream: S)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = accept_hdr_async(
        stream,
        |_: &Request, _: Response| -> Result<Response, ErrorResponse> {
            let mut response = ErrorResponse::new(None);
            *response.status_mut() = StatusCode::FORBIDDEN;
            Err(response)
        },
    )
    .await;
    let Err(err) = result else {
        panic!("upgrade should be refused");
    };
    assert!(matches!(err, WsError::Http(_)), "err: {err}");
}
