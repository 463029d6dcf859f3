//! Issue feed client implementation.
//!
//! This module provides the client for the tracker's REST-over-Atom endpoints.
//! Every request carries the session token; any non-200 answer or transport
//! failure is returned as an error with no retry.

use reqwest::{header, Client, Response, StatusCode};
use tracing::{debug, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::types::{decode_entry, decode_feed, Entry, Feed};

/// The default root of the hosted feeds.
pub const DEFAULT_FEEDS_URL: &str = "https://code.google.com/feeds/issues";

/// Content type of submitted entries.
const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// The issue feed client.
///
/// Holds the project id explicitly; every endpoint is built from it.
#[derive(Debug)]
pub struct FeedClient {
    /// The HTTP client.
    client: Client,
    /// The root of the hosted feeds.
    base_url: String,
    /// The project whose issues are addressed.
    project: String,
    /// Session token.
    auth: Auth,
}

impl FeedClient {
    /// Create a new client for `project` under `base_url`.
    pub fn new(client: Client, base_url: &str, project: &str, auth: Auth) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
            project: project.to_string(),
            auth,
        }
    }

    /// Build the HTTP client. No timeout is set: a hung server hangs the command.
    pub fn build_http_client() -> Result<Client> {
        Client::builder().build().map_err(ApiError::Transport)
    }

    /// `{base}/p/{project}/issues/full`
    fn issues_url(&self) -> String {
        format!("{}/p/{}/issues/full", self.base_url, self.project)
    }

    /// `{base}/p/{project}/issues/full/{id}`
    fn issue_url(&self, id: &str) -> String {
        format!("{}/{}", self.issues_url(), id)
    }

    /// `{base}/p/{project}/issues/{id}/comments/full`
    fn comments_url(&self, id: &str) -> String {
        format!(
            "{}/p/{}/issues/{}/comments/full",
            self.base_url, self.project, id
        )
    }

    /// List all issues of the project, in server order.
    #[instrument(skip(self), fields(project = %self.project))]
    pub async fn list_issues(&self) -> Result<Feed> {
        let body = self.get(&self.issues_url()).await?;
        let feed = decode_feed(&body)?;
        debug!("Fetched {} issues", feed.len());
        Ok(feed)
    }

    /// Search the project's issues.
    #[instrument(skip(self, query), fields(project = %self.project, query = %query))]
    pub async fn search_issues(&self, query: &str) -> Result<Feed> {
        let url = format!("{}?q={}", self.issues_url(), urlencoding::encode(query));
        let body = self.get(&url).await?;
        let feed = decode_feed(&body)?;
        debug!("Found {} issues", feed.len());
        Ok(feed)
    }

    /// Get a single issue by id.
    #[instrument(skip(self, id), fields(project = %self.project, issue_id = %id))]
    pub async fn show_issue(&self, id: &str) -> Result<Entry> {
        let body = self.get(&self.issue_url(id)).await?;
        decode_entry(&body)
    }

    /// List the comments of an issue. Each entry is one comment.
    #[instrument(skip(self, id), fields(project = %self.project, issue_id = %id))]
    pub async fn list_comments(&self, id: &str) -> Result<Feed> {
        let body = self.get(&self.comments_url(id)).await?;
        let feed = decode_feed(&body)?;
        debug!("Fetched {} comments", feed.len());
        Ok(feed)
    }

    /// Submit a prepared Atom entry document as a new issue.
    ///
    /// Returns the HTTP status line for display. The document is sent
    /// verbatim with an explicit content length.
    #[instrument(skip(self, document), fields(project = %self.project))]
    pub async fn create_issue(&self, document: &str) -> Result<String> {
        let url = self.issues_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)
            .header(header::CONTENT_LENGTH, document.len())
            .body(document.to_string())
            .send()
            .await?;

        let status = response.status();
        // The body carries the created entry; it is not shown.
        let _ = response.bytes().await?;

        if !status.is_success() {
            warn!("Issue creation rejected: {}", status);
            return Err(ApiError::from_status(status, &url));
        }

        info!("Issue created: {}", status);
        Ok(status_line(status))
    }

    /// Perform an authenticated GET and return the body text.
    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Require a 200 and read the body fully.
    async fn handle_response(&self, response: Response) -> Result<String> {
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;

        if status == StatusCode::OK {
            Ok(body)
        } else {
            debug!("Error response body: {}", body);
            Err(ApiError::from_status(status, &url))
        }
    }
}

/// Render a status as "201 Created".
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. Credentials travel in the clear.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const FEED: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<feed xmlns='http://www.w3.org/2005/Atom' xmlns:issues='http://schemas.google.com/projecthosting/issues/2009'>
  <entry><id>7</id><title>first</title></entry>
  <entry><id>3</id><title>second</title></entry>
</feed>"#;

    fn client_for(server: &mockito::Server) -> FeedClient {
        FeedClient::new(Client::new(), &server.url(), "go", Auth::new("Auth=tok"))
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://code.google.com/feeds/issues/"),
            "https://code.google.com/feeds/issues"
        );
    }

    #[test]
    fn test_endpoint_shapes() {
        let client = FeedClient::new(Client::new(), DEFAULT_FEEDS_URL, "go", Auth::new("t"));
        assert_eq!(
            client.issues_url(),
            "https://code.google.com/feeds/issues/p/go/issues/full"
        );
        assert_eq!(
            client.issue_url("42"),
            "https://code.google.com/feeds/issues/p/go/issues/full/42"
        );
        assert_eq!(
            client.comments_url("42"),
            "https://code.google.com/feeds/issues/p/go/issues/42/comments/full"
        );
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(StatusCode::CREATED), "201 Created");
        assert_eq!(status_line(StatusCode::OK), "200 OK");
    }

    #[tokio::test]
    async fn test_list_issues_sends_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/p/go/issues/full")
            .match_header("authorization", "GoogleLogin Auth=tok")
            .with_status(200)
            .with_body(FEED)
            .create_async()
            .await;

        let feed = client_for(&server).list_issues().await.unwrap();
        let ids: Vec<&str> = feed.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "3"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_issues_encodes_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/p/go/issues/full")
            .match_query(Matcher::UrlEncoded("q".into(), "nil map & crash".into()))
            .with_status(200)
            .with_body(FEED)
            .create_async()
            .await;

        let feed = client_for(&server)
            .search_issues("nil map & crash")
            .await
            .unwrap();
        assert_eq!(feed.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_show_issue_decodes_entry() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/p/go/issues/full/42")
            .with_status(200)
            .with_body("<entry xmlns='http://www.w3.org/2005/Atom'><id>42</id><title>leak</title></entry>")
            .create_async()
            .await;

        let entry = client_for(&server).show_issue("42").await.unwrap();
        assert_eq!(entry.id, "42");
        assert_eq!(entry.title, "leak");
    }

    #[tokio::test]
    async fn test_list_comments_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/p/go/issues/42/comments/full")
            .with_status(200)
            .with_body(FEED)
            .create_async()
            .await;

        let feed = client_for(&server).list_comments("42").await.unwrap();
        assert_eq!(feed.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_is_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/p/go/issues/full/1")
            .with_status(404)
            .create_async()
            .await;

        let result = client_for(&server).show_issue("1").await;
        match result {
            Err(ApiError::Protocol { status, .. }) => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("Expected Protocol error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/p/go/issues/full")
            .with_status(200)
            .with_body("<feed><entry>")
            .create_async()
            .await;

        let result = client_for(&server).list_issues().await;
        assert!(matches!(result, Err(ApiError::MalformedFeed(_))));
    }

    #[tokio::test]
    async fn test_create_issue_posts_document() {
        let document = "<?xml version='1.0' encoding='UTF-8'?>\n<entry/>";
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/p/go/issues/full")
            .match_header("authorization", "GoogleLogin Auth=tok")
            .match_header("content-type", "application/atom+xml")
            .match_header("content-length", document.len().to_string().as_str())
            .match_body(document)
            .with_status(201)
            .with_body(document)
            .create_async()
            .await;

        let status = client_for(&server).create_issue(document).await.unwrap();
        assert_eq!(status, "201 Created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_issue_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/p/go/issues/full")
            .with_status(400)
            .create_async()
            .await;

        let result = client_for(&server).create_issue("<entry/>").await;
        assert!(matches!(result, Err(ApiError::Protocol { .. })));
    }
}
