#![allow(clippy::unwrap_used)]
// Integration tests for `SrmClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

use srm_api::{Error, SrmClient, TrafficWindow};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SrmClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = SrmClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/webapi/auth.cgi"))
        .and(body_string_contains("method=Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "sid": "sid-123" }
        })))
        .mount(server)
        .await;
}

async fn logged_in() -> (MockServer, SrmClient) {
    let (server, client) = setup().await;
    mount_login(&server).await;
    let secret: secrecy::SecretString = "pw".to_string().into();
    client.login("admin", &secret).await.unwrap();
    (server, client)
}

fn entry(api: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/webapi/entry.cgi"))
        .and(body_string_contains(format!("api={api}")))
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (_server, client) = logged_in().await;
    assert!(client.is_logged_in());
}

#[tokio::test]
async fn test_login_rejected_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/webapi/auth.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": { "code": 400 }
        })))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("admin", &secret).await;

    match result {
        Err(Error::Authentication { message }) => {
            assert!(message.contains("code 400"), "message: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_login_http_forbidden_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/webapi/auth.cgi"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("admin", &secret).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_call_before_login_is_not_connected() {
    let (server, client) = setup().await;

    let result = client.mesh_nodes().await;
    assert!(matches!(result, Err(Error::NotConnected)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/webapi/auth.cgi"))
        .and(body_string_contains("method=Logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
    assert!(!client.is_logged_in());

    // Second logout has nothing to end.
    client.logout().await.unwrap();
}

// ── Envelope tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_session_lost_code_maps_to_not_connected() {
    let (server, client) = logged_in().await;

    entry("SYNO.Mesh.Node.List")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": { "code": 119 }
        })))
        .mount(&server)
        .await;

    let err = client.mesh_nodes().await.unwrap_err();
    assert!(err.is_not_connected(), "got: {err:?}");
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_other_error_code_maps_to_api_error() {
    let (server, client) = logged_in().await;

    entry("SYNO.Core.Network.Router.ConnectionStatus")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": { "code": 103 }
        })))
        .mount(&server)
        .await;

    let err = client.connection_status().await.unwrap_err();
    assert_eq!(err.api_error_code(), Some(103));
    assert!(client.is_logged_in());
}

#[tokio::test]
async fn test_http_unauthorized_maps_to_not_connected() {
    let (server, client) = logged_in().await;

    entry("SYNO.Core.Network.NSM.Device")
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.devices().await.unwrap_err();
    assert!(err.is_not_connected());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = logged_in().await;

    entry("SYNO.Mesh.Node.List")
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.mesh_nodes().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

// ── Endpoint tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_requests_carry_session_id() {
    let (server, client) = logged_in().await;

    entry("SYNO.Mesh.Node.List")
        .and(body_string_contains("_sid=sid-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "nodes": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.mesh_nodes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connection_status() {
    let (server, client) = logged_in().await;

    entry("SYNO.Core.Network.Router.ConnectionStatus")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "ipv4": { "conn_status": "connected", "ip": "203.0.113.7" },
                "ipv6": { "conn_status": "disconnected" }
            }
        })))
        .mount(&server)
        .await;

    let status = client.connection_status().await.unwrap();
    assert_eq!(status.ipv4.conn_status, "connected");
    assert_eq!(status.ipv4.ip, "203.0.113.7");
    assert_eq!(status.ipv6.conn_status, "disconnected");
    assert!(status.ipv6.ip.is_empty());
}

#[tokio::test]
async fn test_devices() {
    let (server, client) = logged_in().await;

    entry("SYNO.Core.Network.NSM.Device")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "devices": [
                { "mac": "aa:bb:cc:dd:ee:01", "hostname": "laptop", "is_online": true, "is_wireless": true },
                { "mac": "aa:bb:cc:dd:ee:02", "is_online": false, "dev_type": "tv" }
            ] }
        })))
        .mount(&server)
        .await;

    let devices = client.devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].hostname.as_deref(), Some("laptop"));
    assert!(devices[0].is_wireless);
    assert!(!devices[1].is_online);
    assert_eq!(devices[1].extra["dev_type"], "tv");
}

#[tokio::test]
async fn test_mesh_nodes() {
    let (server, client) = logged_in().await;

    entry("SYNO.Mesh.Node.List")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "nodes": [{
                "name": "MR2200ac",
                "band": "5G",
                "connected_devices": 4,
                "current_rate_rx": 866_000,
                "current_rate_tx": 433_000,
                "network_status": "online",
                "node_id": 1,
                "node_status": "normal",
                "parent_node_id": 0,
                "signalstrength": 80
            }] }
        })))
        .mount(&server)
        .await;

    let nodes = client.mesh_nodes().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "MR2200ac");
    assert_eq!(nodes[0].connected_devices, 4);
    assert!((nodes[0].current_rate_rx - 866_000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_wifi_settings_and_set() {
    let (server, client) = logged_in().await;

    entry("SYNO.Wifi.Network.Setting")
        .and(body_string_contains("method=get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "profiles": [{
                "radio_list": [{
                    "ssid": "Home",
                    "enable": true,
                    "hide_ssid": false,
                    "mac_filter": { "profile_id": 1 },
                    "schedule": { "enable": false }
                }]
            }] }
        })))
        .mount(&server)
        .await;

    entry("SYNO.Wifi.Network.Setting")
        .and(body_string_contains("method=set"))
        .and(body_string_contains("profiles="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = client.wifi_settings().await.unwrap();
    assert_eq!(settings.profiles.len(), 1);
    let radio = settings.profiles[0].primary_radio_mut().unwrap();
    assert_eq!(radio.ssid, "Home");
    assert_eq!(radio.mac_filter.profile_id, json!(1));
    radio.hide_ssid = true;

    client.set_wifi_settings(&settings.profiles).await.unwrap();
}

#[tokio::test]
async fn test_traffic_sends_window() {
    let (server, client) = logged_in().await;

    entry("SYNO.Core.NGFW.Traffic")
        .and(body_string_contains("interval=%22live%22"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "deviceID": "aa:bb", "download": 10, "upload": 2 }]
        })))
        .mount(&server)
        .await;

    let traffic = client.traffic(TrafficWindow::Live).await.unwrap();
    assert_eq!(traffic[0]["download"], 10);
}
