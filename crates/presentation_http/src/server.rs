//! Server loop with bounded graceful shutdown

use std::{future::IntoFuture, io, sync::Arc, time::Duration};

use axum::Router;
use tokio::{net::TcpListener, sync::Notify};
use tracing::{info, warn};

/// Serve `app` until `shutdown` resolves
///
/// Once the signal fires no new connections are accepted and in-flight
/// requests get at most `grace` to finish; anything still running after
/// that is dropped.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let signalled = Arc::new(Notify::new());
    let notify = Arc::clone(&signalled);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            notify.notify_one();
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        () = signalled.notified() => {},
    }

    info!("Waiting up to {:?} for connections to close...", grace);

    if let Ok(result) = tokio::time::timeout(grace, &mut server).await {
        result
    } else {
        warn!(grace = ?grace, "Connections still open after grace period, closing them");
        Ok(())
    }
}
