//! In-process tile server for fetcher tests.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use wx_core::{FetchPolicy, MemoryStore, ModelId, RunTime, SequenceFetcher, SequenceRequest};

/// PNG signature; the fetcher never decodes the payload.
pub const TILE_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

type Availability = Arc<dyn Fn(u32) -> bool + Send + Sync>;

#[derive(Clone)]
struct TileState {
    available: Availability,
    requests: Arc<Mutex<Vec<String>>>,
}

pub struct MockTileServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTileServer {
    /// Serve 200 for hours where `available` is true, 404 otherwise.
    pub async fn start(available: impl Fn(u32) -> bool + Send + Sync + 'static) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = TileState {
            available: Arc::new(available),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/maps/models/:model/:run/:hour/:file", get(tile))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock tile server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Request paths in arrival order, relative to `base_url`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Forecast hours requested, in arrival order.
    pub fn requested_hours(&self) -> Vec<u32> {
        self.requests()
            .iter()
            .filter_map(|p| p.split('/').nth(5).and_then(|h| h.parse().ok()))
            .collect()
    }
}

async fn tile(
    State(state): State<TileState>,
    Path((model, run, hour, file)): Path<(String, String, String, String)>,
) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("/maps/models/{}/{}/{}/{}", model, run, hour, file));

    match hour.parse::<u32>() {
        Ok(h) if (state.available)(h) => (StatusCode::OK, TILE_BYTES.to_vec()).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn request(base_url: &str, model: &str) -> SequenceRequest {
    SequenceRequest {
        base_url: base_url.to_string(),
        model: ModelId::from(model),
        run: RunTime::from_key("2024010100").unwrap(),
        parameter: "refcmp".to_string(),
        region: "conus".to_string(),
    }
}

pub fn memory_fetcher(policy: FetchPolicy) -> SequenceFetcher<MemoryStore> {
    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(2))
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap();
    SequenceFetcher::new(client, MemoryStore::new(), policy)
}
