use axum::Router;
use std::net::{SocketAddr, TcpListener};

/// Serves `app` on an ephemeral local port for the lifetime of the test runtime.
pub fn spawn_app(app: Router) -> SocketAddr {
    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        server.await.unwrap();
    });
    addr
}

/// A local address nobody is listening on.
pub fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
