// Integration tests for the proctoring signaling relay.
// These run against a live server: start one with `cargo run`, then
// `cargo test -- --ignored`.

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

const BASE_HTTP: &str = "http://127.0.0.1:8080";
const BASE_WS: &str = "ws://127.0.0.1:8080/ws";

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect_as(role: &str, exam_id: &str, participant_id: &str, name: &str) -> Socket {
    let id_param = match role {
        "tutor" => "tutorId",
        _ => "studentId",
    };
    let url = format!(
        "{}?role={}&examId={}&{}={}&name={}",
        BASE_WS, role, exam_id, id_param, participant_id, name
    );
    let (socket, _) = connect_async(url).await.expect("Failed to connect");
    socket
}

async fn next_json(socket: &mut Socket) -> serde_json::Value {
    loop {
        let frame = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("Timed out waiting for message")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("Invalid JSON frame");
        }
    }
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_health_endpoint() {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/health", BASE_HTTP))
        .send()
        .await
        .expect("Server not running; start it with 'cargo run'");

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "proctor-relay");
    assert!(body["connections"].is_number());
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_config_endpoint() {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/config", BASE_HTTP))
        .send()
        .await
        .expect("Server not running");

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body.is_object());
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_websocket_connects_with_metadata() {
    let socket = connect_as("student", "exam-it-0", "stu-0", "Probe").await;
    drop(socket);
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_offer_answer_round_trip() {
    let mut tutor = connect_as("tutor", "exam-it-1", "tut-1", "Dr. Test").await;
    sleep(Duration::from_millis(100)).await;
    let mut student = connect_as("student", "exam-it-1", "stu-1", "Jane").await;
    sleep(Duration::from_millis(100)).await;

    // Student offers; tutor should see it with the student's connection id.
    student
        .send(Message::Text(
            json!({
                "type": "webrtc:offer",
                "examId": "exam-it-1",
                "studentId": "stu-1",
                "offer": { "sdp": "v=0...", "type": "offer" },
                "name": "Jane"
            })
            .to_string(),
        ))
        .await
        .expect("Failed to send offer");

    let offer = next_json(&mut tutor).await;
    assert_eq!(offer["type"], "webrtc:offer");
    assert_eq!(offer["studentId"], "stu-1");
    let from = offer["fromConnectionId"]
        .as_str()
        .expect("Offer missing fromConnectionId")
        .to_string();

    // Tutor answers the connection id from the offer.
    tutor
        .send(Message::Text(
            json!({
                "type": "webrtc:answer",
                "toConnectionId": from,
                "answer": { "sdp": "v=0...", "type": "answer" }
            })
            .to_string(),
        ))
        .await
        .expect("Failed to send answer");

    let answer = next_json(&mut student).await;
    assert_eq!(answer["type"], "webrtc:answer");
    assert!(answer["fromConnectionId"].is_string());
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_tutor_refresh_requests_student_offers() {
    let mut student = connect_as("student", "exam-it-2", "stu-2", "Jane").await;
    sleep(Duration::from_millis(100)).await;
    let mut tutor = connect_as("tutor", "exam-it-2", "tut-2", "Dr. Test").await;

    tutor
        .send(Message::Text(
            json!({ "type": "tutor-joined-or-refreshed", "examId": "exam-it-2" }).to_string(),
        ))
        .await
        .expect("Failed to send join notification");

    let request = next_json(&mut student).await;
    assert_eq!(request["type"], "request-student-offer");
    assert_eq!(request["examId"], "exam-it-2");
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_cheat_event_reaches_tutor() {
    let mut tutor = connect_as("tutor", "exam-it-3", "tut-3", "Dr. Test").await;
    sleep(Duration::from_millis(100)).await;
    let mut student = connect_as("student", "exam-it-3", "stu-3", "Jane").await;
    sleep(Duration::from_millis(100)).await;

    student
        .send(Message::Text(
            json!({
                "type": "cheat-event",
                "examId": "exam-it-3",
                "studentId": "stu-3",
                "kind": "tab-switch",
                "message": "Student switched tabs",
                "time": 1724900000000u64,
                "name": "Jane"
            })
            .to_string(),
        ))
        .await
        .expect("Failed to send cheat event");

    let event = next_json(&mut tutor).await;
    assert_eq!(event["type"], "cheat-event");
    assert_eq!(event["kind"], "tab-switch");
    assert_eq!(event["studentId"], "stu-3");
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_disconnect_notifies_room() {
    let mut tutor = connect_as("tutor", "exam-it-4", "tut-4", "Dr. Test").await;
    sleep(Duration::from_millis(100)).await;
    let student = connect_as("student", "exam-it-4", "stu-4", "Jane").await;
    sleep(Duration::from_millis(100)).await;

    drop(student);

    let departed = next_json(&mut tutor).await;
    assert_eq!(departed["type"], "participant-disconnected");
    assert_eq!(departed["participantId"], "stu-4");
    assert!(departed["connectionId"].is_string());
}

#[tokio::test]
#[ignore] // Requires running server
async fn test_malformed_message_does_not_close_connection() {
    let mut tutor = connect_as("tutor", "exam-it-5", "tut-5", "Dr. Test").await;
    sleep(Duration::from_millis(100)).await;
    let mut student = connect_as("student", "exam-it-5", "stu-5", "Jane").await;
    sleep(Duration::from_millis(100)).await;

    // Unknown event type and a truncated payload: both dropped server-side.
    student
        .send(Message::Text("{\"type\":\"unknown-event\"}".to_string()))
        .await
        .unwrap();
    student
        .send(Message::Text("not json at all".to_string()))
        .await
        .unwrap();

    // The connection still routes afterwards.
    tutor
        .send(Message::Text(
            json!({ "type": "tutor-joined-or-refreshed", "examId": "exam-it-5" }).to_string(),
        ))
        .await
        .unwrap();

    let request = next_json(&mut student).await;
    assert_eq!(request["type"], "request-student-offer");
}
