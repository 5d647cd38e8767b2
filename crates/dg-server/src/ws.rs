use actix_web::web;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use dg_gateway::Gateway;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

/// Upgrades one HTTP connection to a WebSocket and bridges it to the
/// gateway under a freshly minted session handle. Unlike the teacher's
/// `Casino::bridge`, there is no room id in the URL: which room (if any) a
/// session belongs to is established entirely by the `room:create` /
/// `room:join` / `room:reconnect` messages it sends once connected (spec
/// §4.6).
pub async fn connect(
    gateway: web::Data<Arc<Gateway>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let (response, mut session, mut stream) = match actix_ws::handle(&req, body) {
        Ok(parts) => parts,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };

    let gateway = gateway.get_ref().clone();
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, mut rx) = unbounded_channel();
    gateway.connect(session_id.clone(), tx).await;
    log::info!("[session {}] connected", session_id);

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(json) => {
                        if session.text(json).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                inbound = stream.next() => match inbound {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        gateway.handle_message(&session_id, &text).await;
                    }
                    Some(Ok(actix_ws::Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => continue,
                },
            }
        }
        gateway.disconnect(&session_id).await;
        log::info!("[session {}] disconnected", session_id);
    });

    response
}
