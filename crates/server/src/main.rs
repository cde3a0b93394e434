use library_server_lib::{serve, BookmarkDb};

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("LIBRARY_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            return;
        }
    };
    tracing::info!("Bookmark server running on http://{addr}");
    if let Err(e) = serve(listener, BookmarkDb::new()).await {
        tracing::error!("Server error: {e}");
    }
}
