use futures_util::{SinkExt, StreamExt};
use odoo_support_server::config::Config;
use odoo_support_server::{app, AppState};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

#[tokio::test]
async fn ws_echoes_text_frames() {
    let app = app(AppState::new(Config::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("failed to connect");

    for text in ["hello", "مرحبا"] {
        ws.send(Message::Text(text.into())).await.unwrap();
        let reply = ws.next().await.unwrap().unwrap();
        assert_eq!(reply.into_text().unwrap().as_str(), format!("Echo: {}", text));
    }

    ws.close(None).await.unwrap();
}
