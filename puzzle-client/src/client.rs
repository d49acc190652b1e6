//! HTTP client for the puzzle backend

use std::time::Duration;

use async_trait::async_trait;
use puzzle::{EngineAnalysisResult, PuzzleFilters, PuzzleRecord, StatsReport};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};
use crate::traits::PuzzleService;
use crate::wire::{
    AnalyzeRequest, ApiResponse, CatalogStats, Envelope, StatsUpdateRequest, WireAnalysis,
    WirePuzzle,
};

const USER_AGENT: &str = concat!("puzzletty/", env!("CARGO_PKG_VERSION"));

/// Network client for the puzzle catalog, analysis and stats endpoints
pub struct HttpPuzzleClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpPuzzleClient {
    /// Build a client for `base_url`, e.g. `http://localhost:3001/api`
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| ClientError::InvalidAddress(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidAddress(format!(
                "{base_url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn checked(response: Response) -> ClientResult<String> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if !status.is_success() {
            // The backend answers a failed lookup with an error status and a
            // `success: false` envelope.
            let body = response.text().await.unwrap_or_default();
            if let Some(reason) = rejection(&body) {
                tracing::debug!(%status, %reason, "Backend rejected request");
                return Err(ClientError::Rejected(reason));
            }
            return Err(ClientError::Status(status));
        }
        Ok(response.text().await?)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let body = Self::checked(response).await?;
        serde_json::from_str::<ApiResponse<T>>(&body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?
            .into_result()
    }
}

/// Failure reason if `body` is a `success: false` envelope.
fn rejection(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(Envelope::failure)
}

#[async_trait]
impl PuzzleService for HttpPuzzleClient {
    async fn random_puzzle(&self, filters: &PuzzleFilters) -> ClientResult<PuzzleRecord> {
        let params = filters.query_pairs();
        tracing::debug!(?params, "Requesting random puzzle");

        let response = self
            .request(Method::GET, "puzzles/random")
            .query(&params)
            .send()
            .await?;
        let puzzle: WirePuzzle = Self::read(response).await?;
        Ok(puzzle.into_record())
    }

    async fn game_context(&self, id: &str) -> ClientResult<PuzzleRecord> {
        let response = self
            .request(Method::GET, &format!("puzzles/{id}/context"))
            .send()
            .await?;
        let puzzle: WirePuzzle = Self::read(response).await?;
        Ok(puzzle.into_record())
    }

    async fn themes(&self) -> ClientResult<Vec<String>> {
        let response = self.request(Method::GET, "puzzles/themes").send().await?;
        let mut themes: Vec<String> = Self::read(response).await?;
        themes.sort();
        themes.dedup();
        Ok(themes)
    }

    async fn catalog_stats(&self) -> ClientResult<CatalogStats> {
        let response = self.request(Method::GET, "puzzles/stats").send().await?;
        Self::read(response).await
    }

    async fn analyze(
        &self,
        fen: &str,
        depth: u32,
        time_per_move_ms: u64,
    ) -> ClientResult<EngineAnalysisResult> {
        let body = AnalyzeRequest {
            fen: fen.to_string(),
            depth,
            time_per_move: time_per_move_ms,
        };
        let response = self
            .request(Method::POST, "analyze")
            .json(&body)
            .send()
            .await?;
        let analysis: WireAnalysis = Self::read(response).await?;
        analysis.into_result(depth)
    }

    async fn report_outcome(&self, user_id: &str, report: &StatsReport) -> ClientResult<()> {
        let body = StatsUpdateRequest::new(user_id, report);
        let response = self
            .request(Method::POST, "puzzles/stats/update")
            .json(&body)
            .send()
            .await?;
        let ack = Self::checked(response).await?;

        if let Some(reason) = rejection(&ack) {
            return Err(ClientError::Rejected(reason));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let client =
            HttpPuzzleClient::new("http://localhost:3001/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001/api");
        assert_eq!(
            client.endpoint("puzzles/random"),
            "http://localhost:3001/api/puzzles/random"
        );
        assert_eq!(
            client.endpoint("/analyze"),
            "http://localhost:3001/api/analyze"
        );
    }

    #[test]
    fn test_rejects_bad_addresses() {
        assert!(matches!(
            HttpPuzzleClient::new("not a url", Duration::from_secs(5)),
            Err(ClientError::InvalidAddress(_))
        ));
        assert!(matches!(
            HttpPuzzleClient::new("ftp://example.com", Duration::from_secs(5)),
            Err(ClientError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = HttpPuzzleClient::new("http://localhost:3001/api", Duration::from_secs(5))
            .unwrap()
            .with_auth_token("");
        assert!(client.auth_token.is_none());
    }

    mod stubbed {
        use super::*;
        use chess::AnalysisScore;
        use puzzle::LoadError;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};
        use tokio::task::JoinHandle;

        const FORK_PUZZLE: &str = r#"{"id":"fork1","fen":"3q2k1/4b3/2N5/8/8/2N5/8/6K1 w - - 0 1","moves":["Nxe7+","Qxe7","Nd5"],"userSide":"white","rating":1350}"#;

        /// Answer one request with `status` and `body`; the task yields the raw request.
        async fn serve_once(
            status: &'static str,
            body: &'static str,
        ) -> (HttpPuzzleClient, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let server = tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
                request
            });
            let client =
                HttpPuzzleClient::new(&format!("http://{addr}/api"), Duration::from_secs(5)).unwrap();
            (client, server)
        }

        async fn read_request(socket: &mut TcpStream) -> String {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_ascii_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        }

        #[tokio::test]
        async fn test_no_matching_puzzle_is_not_found() {
            let (client, server) = serve_once(
                "500 Internal Server Error",
                r#"{"success":false,"error":"Failed to load puzzle","message":"No puzzles found matching the criteria"}"#,
            )
            .await;

            let err = client
                .random_puzzle(&PuzzleFilters::default().with_theme("fork"))
                .await
                .unwrap_err();
            assert!(matches!(&err, ClientError::Rejected(reason) if reason == "Failed to load puzzle"));
            assert_eq!(err.into_load_error(), LoadError::NotFound);
            server.await.unwrap();
        }

        #[tokio::test]
        async fn test_missing_route_is_not_found() {
            let (client, _server) = serve_once("404 Not Found", "{}").await;
            let err = client.random_puzzle(&PuzzleFilters::default()).await.unwrap_err();
            assert!(matches!(err, ClientError::NotFound));
        }

        #[tokio::test]
        async fn test_error_status_without_envelope_is_network_failure() {
            let (client, _server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;
            let err = client.random_puzzle(&PuzzleFilters::default()).await.unwrap_err();
            assert!(matches!(err, ClientError::Status(StatusCode::BAD_GATEWAY)));
            assert!(matches!(err.into_load_error(), LoadError::NetworkFailure(_)));
        }

        #[tokio::test]
        async fn test_failure_envelope_with_ok_status() {
            let (client, _server) =
                serve_once("200 OK", r#"{"success":false,"message":"catalog empty"}"#).await;
            let err = client.random_puzzle(&PuzzleFilters::default()).await.unwrap_err();
            assert!(matches!(&err, ClientError::Rejected(reason) if reason == "catalog empty"));
            assert_eq!(err.into_load_error(), LoadError::NotFound);
        }

        #[tokio::test]
        async fn test_bare_puzzle_body_and_request_shape() {
            let (client, server) = serve_once("200 OK", FORK_PUZZLE).await;
            let client = client.with_auth_token("secret");

            let record = client
                .random_puzzle(&PuzzleFilters::default().with_theme("fork"))
                .await
                .unwrap();
            assert_eq!(record.id, "fork1");
            assert_eq!(record.moves.len(), 3);

            let request = server.await.unwrap();
            assert!(request.starts_with("GET /api/puzzles/random?themes=fork "));
            assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        }

        #[tokio::test]
        async fn test_wrapped_puzzle_body() {
            let (client, _server) = serve_once(
                "200 OK",
                r#"{"success":true,"data":{"id":"fork1","fen":"3q2k1/4b3/2N5/8/8/2N5/8/6K1 w - - 0 1","moves":"Nxe7+ Qxe7 Nd5"}}"#,
            )
            .await;
            let record = client.random_puzzle(&PuzzleFilters::default()).await.unwrap();
            assert_eq!(record.moves, vec!["Nxe7+", "Qxe7", "Nd5"]);
        }

        #[tokio::test]
        async fn test_unreadable_body_is_invalid_puzzle() {
            let (client, _server) = serve_once("200 OK", "not json").await;
            let err = client.random_puzzle(&PuzzleFilters::default()).await.unwrap_err();
            assert!(matches!(err, ClientError::InvalidResponse(_)));
            assert!(matches!(err.into_load_error(), LoadError::InvalidPuzzle(_)));
        }

        #[tokio::test]
        async fn test_analyze_request_and_tagged_evaluation() {
            let (client, server) = serve_once(
                "200 OK",
                r#"{"evaluation":{"type":"mate","value":2},"bestMove":"d1d8","depth":18}"#,
            )
            .await;
            let result = client
                .analyze("3q2k1/8/8/8/8/8/8/3RK3 w - - 0 1", 15, 2000)
                .await
                .unwrap();
            assert_eq!(result.evaluation, AnalysisScore::Mate(2));
            assert_eq!(result.depth, 18);

            let request = server.await.unwrap();
            assert!(request.starts_with("POST /api/analyze "));
            assert!(request.contains(r#""timePerMove":2000"#));
            assert!(request.contains(r#""depth":15"#));
        }

        fn report() -> StatsReport {
            StatsReport {
                puzzle_id: "fork1".into(),
                solved: true,
                elapsed_seconds: 12,
                hints_used: 0,
                solution_shown: false,
            }
        }

        #[tokio::test]
        async fn test_report_acknowledged() {
            let (client, server) =
                serve_once("200 OK", r#"{"success":true,"data":{"updated":true}}"#).await;
            client.report_outcome("u1", &report()).await.unwrap();

            let request = server.await.unwrap();
            assert!(request.starts_with("POST /api/puzzles/stats/update "));
            assert!(request.contains(r#""userId":"u1""#));
            assert!(request.contains(r#""timeSpentSeconds":12"#));
        }

        #[tokio::test]
        async fn test_report_refused_by_backend() {
            let (client, _server) =
                serve_once("200 OK", r#"{"success":false,"error":"User not found"}"#).await;
            let err = client.report_outcome("u1", &report()).await.unwrap_err();
            assert!(matches!(err, ClientError::Rejected(reason) if reason == "User not found"));
        }
    }
}
