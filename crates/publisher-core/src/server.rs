//! ============================================================================
//! OAuth Helper Server - Local HTTP endpoints for the authorization flow
//! ============================================================================
//! `GET /` renders the "Authorize with LinkedIn" link, `GET /callback`
//! receives the redirect and runs the token exchange. Requests are served
//! one at a time; async work is driven on the supplied tokio runtime.
//! ============================================================================

use anyhow::{anyhow, Result};
use tiny_http::{Header, Response, Server};
use tracing::{debug, error, info};

use crate::auth::{CallbackParams, LinkedInOAuth, OAuthSession};

/// Response produced by a route, independent of the HTTP library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpReply {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }
}

/// Dispatch one request. `url` is the request target, path plus query.
pub async fn route(
    oauth: &LinkedInOAuth,
    session: &OAuthSession,
    method: &str,
    url: &str,
) -> HttpReply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    if !method.eq_ignore_ascii_case("GET") {
        return HttpReply::text(405, "Method Not Allowed");
    }

    match path {
        "/" => index(oauth, session),
        "/callback" => callback(oauth, session, query).await,
        _ => HttpReply::text(404, "Not Found"),
    }
}

fn index(oauth: &LinkedInOAuth, session: &OAuthSession) -> HttpReply {
    match oauth.auth_url(session) {
        Ok(auth_link) => HttpReply::html(format!(
            "<!DOCTYPE html>\n<html>\n<head><title>LinkedIn OAuth helper</title></head>\n<body>\n\
             <h3>LinkedIn OAuth helper</h3>\n\
             <p><a href=\"{}\">Authorize with LinkedIn</a></p>\n</body>\n</html>\n",
            escape_html(&auth_link)
        )),
        Err(e) => HttpReply::text(200, e.to_string()),
    }
}

async fn callback(oauth: &LinkedInOAuth, session: &OAuthSession, query: &str) -> HttpReply {
    let params = CallbackParams::from_query(query);

    match oauth.handle_callback(session, &params).await {
        Ok(record) => HttpReply::json(record.raw),
        Err(e) => HttpReply::text(e.http_status(), e.to_string()),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Bind `addr` and serve until the process is stopped
pub fn serve(
    addr: &str,
    oauth: &LinkedInOAuth,
    session: &OAuthSession,
    runtime: &tokio::runtime::Handle,
) -> Result<()> {
    let server =
        Server::http(addr).map_err(|e| anyhow!("Failed to start OAuth server on {}: {}", addr, e))?;

    info!("OAuth helper listening on http://{}", addr);

    for request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();
        debug!("{} {}", method, url.split('?').next().unwrap_or(""));

        let reply = runtime.block_on(route(oauth, session, &method, &url));

        let content_type = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
            .map_err(|_| anyhow!("Invalid content type header: {}", reply.content_type))?;
        let response = Response::from_string(reply.body)
            .with_status_code(reply.status)
            .with_header(content_type);

        if let Err(e) = request.respond(response) {
            error!("Failed to send response: {}", e);
        }
    }

    Ok(())
}
