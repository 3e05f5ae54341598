//! Headless drawer: sketches on the shared canvas and reports what it sees.

use paintwall_client::config::SERVER_VAR;
use paintwall_client::{ClientConfig, DrawingClient, HttpTransport};
use paintwall_core::{Point, RecordingSurface, Size, ToolKind};
use std::sync::Arc;

const VIEWPORT: Size = Size::new(800.0, 600.0);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ClientConfig::resolve(std::env::args().nth(1), std::env::var(SERVER_VAR).ok());
    log::info!("Drawing on {}", config.server_url);

    let transport = Arc::new(HttpTransport::new(&config.server_url));
    let client = DrawingClient::new(RecordingSurface::new(VIEWPORT), transport, &config)?;

    if !client.poll_now().await {
        log::warn!("Could not fetch the canvas, drawing anyway");
    }

    // A zigzag across the top half.
    client.pointer_down(Point::new(80.0, 80.0)).settle().await;
    for i in 1..=8 {
        let x = 80.0 + f64::from(i) * 80.0;
        let y = if i % 2 == 0 { 80.0 } else { 240.0 };
        client.pointer_move(Point::new(x, y));
    }
    let mut pending = vec![client.pointer_up()];

    client.set_tool(ToolKind::Stencil);
    pending.push(client.pointer_down(Point::new(400.0, 450.0)));

    let sent: usize = pending.iter().map(|s| s.len()).sum();
    for submissions in pending {
        submissions.settle().await;
    }

    if client.poll_now().await {
        log::info!("Sent {} events, canvas now holds {}", sent, client.view().len());
    } else {
        log::warn!("Sent {} events but could not refresh the canvas", sent);
    }
    Ok(())
}
