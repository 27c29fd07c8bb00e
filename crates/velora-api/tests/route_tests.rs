//! Route-level tests that need no database
//!
//! The pool is created lazily and never connected; only routes that do not
//! touch PostgreSQL are exercised here.

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use velora_api::{PgCampaignService, PgChatService};
use velora_core::config::{ElevenLabsConfig, IssabelConfig, LlmConfig, MmConfig, SippyConfig};
use velora_db::{
    PgCallLogRepository, PgCampaignRepository, PgChatMessageRepository, PgPool, PgScriptRepository,
};
use velora_integrations::{ElevenLabsClient, IssabelClient, LlmClient, MmClient};
use velora_services::{constants::NOT_CONFIGURED_REPLY, CampaignService, ChatService};
use velora_sippy::SippyClient;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Vendor configuration of one test app
#[derive(Default)]
struct Vendors {
    sippy: SippyConfig,
    elevenlabs: ElevenLabsConfig,
    mm: MmConfig,
}

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://velora@localhost/velora_test")
        .unwrap()
}

macro_rules! init_app {
    ($vendors:expr) => {{
        let vendors: Vendors = $vendors;
        let pool = lazy_pool();
        let campaigns: PgCampaignService = CampaignService::new(
            Arc::new(PgScriptRepository::new(pool.clone())),
            Arc::new(PgCampaignRepository::new(pool.clone())),
            Arc::new(PgCallLogRepository::new(pool.clone())),
        );
        let llm = LlmClient::new(&LlmConfig::default()).unwrap();
        let chat: PgChatService = ChatService::new(
            Arc::new(PgChatMessageRepository::new(pool.clone())),
            Arc::new(llm),
            "system".to_string(),
            20,
        );

        test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(SippyClient::new(&vendors.sippy).unwrap()))
                .app_data(web::Data::new(
                    ElevenLabsClient::new(&vendors.elevenlabs).unwrap(),
                ))
                .app_data(web::Data::new(
                    IssabelClient::new(&IssabelConfig::default()).unwrap(),
                ))
                .app_data(web::Data::new(MmClient::new(&vendors.mm).unwrap()))
                .app_data(web::Data::new(campaigns))
                .app_data(web::Data::new(chat))
                .configure(velora_api::configure),
        )
        .await
    }};
}

fn elevenlabs_at(server: &MockServer) -> ElevenLabsConfig {
    ElevenLabsConfig {
        api_key: Some("xi-test".to_string()),
        base_url: server.uri(),
        default_voice_id: "voice-default".to_string(),
        timeout_secs: 5,
    }
}

#[actix_web::test]
async fn test_root_and_health() {
    let app = init_app!(Vendors::default());

    let req = test::TestRequest::get().uri("/api/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"message": "Hello World"}));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "velora-crm");
}

#[actix_web::test]
async fn test_sippy_routes_without_credentials() {
    let app = init_app!(Vendors::default());

    let req = test::TestRequest::get().uri("/api/sippy/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);

    let req = test::TestRequest::get()
        .uri("/api/sippy/cdrs?limit=10")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let req = test::TestRequest::post()
        .uri("/api/sippy/call-method")
        .set_json(json!({"method": "system.listMethods"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

fn sippy_at(server: &MockServer) -> SippyConfig {
    SippyConfig {
        rpc_url: format!("{}/xmlapi/xmlapi", server.uri()),
        username: "ssp-root".to_string(),
        password: "secret".to_string(),
        disable_tls_verify: false,
        timeout_secs: 5,
    }
}

fn xmlrpc_response(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        r#"<?xml version="1.0"?><methodResponse><params><param><value>{}</value></param></params></methodResponse>"#,
        value
    ))
}

fn string_array(items: impl Iterator<Item = String>) -> String {
    let values: String = items
        .map(|item| format!("<value><string>{}</string></value>", item))
        .collect();
    format!("<array><data>{}</data></array>", values)
}

#[actix_web::test]
async fn test_sippy_cdrs_are_paged_by_query() {
    let server = MockServer::start().await;
    let calls: String = (1..=10)
        .map(|i| {
            format!(
                "<value><struct>\
                 <member><name>CALL_ID</name><value><string>call-{i}</string></value></member>\
                 <member><name>CLI</name><value><string>90555000000{i}</string></value></member>\
                 <member><name>DURATION</name><value><int>{i}</int></value></member>\
                 </struct></value>"
            )
        })
        .collect();
    Mock::given(method("POST"))
        .and(path("/xmlapi/xmlapi"))
        .and(body_string_contains("<methodName>listAllCalls</methodName>"))
        .respond_with(xmlrpc_response(&format!("<array><data>{}</data></array>", calls)))
        .expect(1)
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        sippy: sippy_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::get()
        .uri("/api/sippy/cdrs?offset=3&limit=4")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["call_id"], "call-4");
    assert_eq!(records[0]["caller"], "905550000004");
    assert_eq!(records[0]["duration"], 4);
    assert_eq!(records[3]["call_id"], "call-7");
    assert!(records[3]["end_time"].is_null());
}

#[actix_web::test]
async fn test_sippy_health_lists_ten_methods() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<methodName>system.listMethods</methodName>"))
        .respond_with(xmlrpc_response(&string_array(
            (1..=15).map(|i| format!("method{}", i)),
        )))
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        sippy: sippy_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::get().uri("/api/sippy/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["ok"], true);
    assert_eq!(body["details"]["authMode"], "digest");
    let methods = body["details"]["availableMethods"].as_array().unwrap();
    assert_eq!(methods.len(), 10);
    assert_eq!(methods[0], "method1");
    assert_eq!(methods[9], "method10");
}

#[actix_web::test]
async fn test_sippy_health_reports_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        sippy: sippy_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::get().uri("/api/sippy/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);
    assert!(body["details"]["error"].as_str().unwrap().contains("502"));
}

#[actix_web::test]
async fn test_sippy_call_method_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<methodName>getCustomerInfo</methodName>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0"?><methodResponse><fault><value><struct>
<member><name>faultCode</name><value><int>404</int></value></member>
<member><name>faultString</name><value><string>No such customer</string></value></member>
</struct></value></fault></methodResponse>"#,
        ))
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        sippy: sippy_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::post()
        .uri("/api/sippy/call-method")
        .set_json(json!({"method": "getCustomerInfo", "params": [{"i_customer": 7}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Failed to call method"));
    assert!(message.contains("No such customer"));
}

#[actix_web::test]
async fn test_sippy_call_method_passthrough() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<methodName>system.listMethods</methodName>"))
        .respond_with(xmlrpc_response(&string_array(
            ["listAllCalls".to_string()].into_iter(),
        )))
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        sippy: sippy_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::post()
        .uri("/api/sippy/call-method")
        .set_json(json!({"method": "system.listMethods"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["ok"], true);
    assert_eq!(body["method"], "system.listMethods");
    assert_eq!(body["result"], json!(["listAllCalls"]));
}

#[actix_web::test]
async fn test_tts_rejects_bad_text() {
    let app = init_app!(Vendors::default());

    let req = test::TestRequest::post()
        .uri("/api/elevenlabs/tts")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "BAD_REQUEST");

    let req = test::TestRequest::post()
        .uri("/api/elevenlabs/tts")
        .set_json(json!({"text": "a".repeat(5001)}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");

    // Valid text but no API key
    let req = test::TestRequest::post()
        .uri("/api/elevenlabs/tts")
        .set_json(json!({"text": "Merhaba"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "MISCONFIG");
}

#[actix_web::test]
async fn test_tts_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-default"))
        .and(query_param("output_format", "mp3_44100_128"))
        .and(header("xi-api-key", "xi-test"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        elevenlabs: elevenlabs_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::post()
        .uri("/api/elevenlabs/tts")
        .set_json(json!({"text": "Merhaba"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["code"], "OK");
    assert_eq!(body["data"]["audio"], "YWJj");
    assert_eq!(body["data"]["format"], "mp3_44100_128");
    assert_eq!(body["data"]["voice_id"], "voice-default");
    assert_eq!(body["data"]["text_length"], 7);
}

#[actix_web::test]
async fn test_tts_vendor_status_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "invalid key"})))
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        elevenlabs: elevenlabs_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::post()
        .uri("/api/elevenlabs/tts")
        .set_json(json!({"text": "Merhaba"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["details"], "invalid key");
}

#[actix_web::test]
async fn test_outbound_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/convai/twilio/outbound-call"))
        .and(body_json(json!({
            "agent_id": "agent_1",
            "agent_phone_number_id": "phone_1",
            "to_number": "+905551112233",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": "conv_1",
            "callSid": "CA1",
            "success": true,
        })))
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        elevenlabs: elevenlabs_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::post()
        .uri("/api/elevenlabs/outbound-call")
        .set_json(json!({
            "agentId": "agent_1",
            "agentPhoneNumberId": "phone_1",
            "toNumber": "+905551112233",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["conversationId"], "conv_1");
    assert_eq!(body["data"]["callSid"], "CA1");
    assert_eq!(body["data"]["status"], "initiated");
}

#[actix_web::test]
async fn test_outbound_call_vendor_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "bad number"})))
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        elevenlabs: elevenlabs_at(&server),
        ..Vendors::default()
    });

    let req = test::TestRequest::post()
        .uri("/api/elevenlabs/outbound-call")
        .set_json(json!({
            "agentId": "agent_1",
            "agentPhoneNumberId": "phone_1",
            "toNumber": "1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ElevenLabs API error");
    assert_eq!(body["details"], json!({"detail": "bad number"}));
}

#[actix_web::test]
async fn test_issabel_health_misconfigured() {
    let app = init_app!(Vendors::default());

    let req = test::TestRequest::get().uri("/api/issabel/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "MISCONFIG");
}

#[actix_web::test]
async fn test_mm_add_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_api/add_numbers_to_call.php"))
        .and(header("X-API-Key", "mm-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "added": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let app = init_app!(Vendors {
        mm: MmConfig {
            base_url: server.uri(),
            api_key: Some("mm-key".to_string()),
            timeout_secs: 5,
        },
        ..Vendors::default()
    });

    let req = test::TestRequest::post()
        .uri("/api/mm/add_numbers_to_call")
        .set_json(json!({
            "aiid": "42",
            "content": "905551112233\n905551112234",
            "stime": "09:00",
            "etime": "18:00",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"status": "OK", "added": 2}));
}

#[actix_web::test]
async fn test_mm_without_key() {
    let app = init_app!(Vendors::default());

    let req = test::TestRequest::post()
        .uri("/api/mm/add_numbers_to_call")
        .set_json(json!({
            "aiid": "42",
            "content": "905551112233",
            "stime": "09:00",
            "etime": "18:00",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_chat_without_llm_key() {
    let app = init_app!(Vendors::default());

    let req = test::TestRequest::post()
        .uri("/api/chatbot/chat")
        .set_json(json!({"message": "Merhaba", "session_id": "s-1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["response"], NOT_CONFIGURED_REPLY);
    assert_eq!(body["session_id"], "s-1");

    let req = test::TestRequest::post()
        .uri("/api/chatbot/chat")
        .set_json(json!({"message": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
