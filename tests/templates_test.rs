//! Rendering through minijinja end to end.

#![cfg(feature = "templates")]

use letterbox::transports::MemoryTransport;
use letterbox::{MailError, Mailer, MiniJinjaEngine};
use serde_json::json;

fn engine() -> MiniJinjaEngine {
    MiniJinjaEngine::new()
        .template(
            "welcome.html",
            "<h1>Welcome, {{ name }}</h1><p>Sent to {{ message.to[0].email }}</p>",
        )
        .unwrap()
        .template("welcome.txt", "Welcome, {{ name }}. Re: {{ message.subject }}")
        .unwrap()
}

#[tokio::test]
async fn templates_can_read_the_message() {
    let transport = MemoryTransport::new();
    let mailer = Mailer::new(transport.clone(), engine());
    mailer.always_from("noreply@example.com");

    mailer
        .send(
            ("welcome.html", "welcome.txt"),
            json!({ "name": "Peter" }),
            |m| {
                m.to("peter.parker@example.com").subject("Your account");
                Ok(())
            },
        )
        .await
        .unwrap();

    let envelope = transport.last().unwrap().envelope;
    let html = envelope.html().unwrap();
    assert!(html.starts_with("<h1>Welcome, Peter</h1>"));
    assert!(html.contains("peter.parker@example.com"));
    assert_eq!(envelope.text(), Some("Welcome, Peter. Re: Your account"));
}

#[tokio::test]
async fn html_templates_escape_data() {
    let transport = MemoryTransport::new();
    let mailer = Mailer::new(transport.clone(), engine());
    mailer.always_from("noreply@example.com");

    mailer
        .send("welcome.html", json!({ "name": "<script>" }), |m| {
            m.to("peter.parker@example.com");
            Ok(())
        })
        .await
        .unwrap();

    let html = transport.last().unwrap().envelope.html().unwrap().to_string();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn unknown_template_is_render_error() {
    let transport = MemoryTransport::new();
    let mailer = Mailer::new(transport.clone(), engine());
    mailer.always_from("noreply@example.com");

    let result = mailer
        .send("goodbye.html", json!({}), |m| {
            m.to("peter.parker@example.com");
            Ok(())
        })
        .await;

    assert!(matches!(
        result,
        Err(MailError::TemplateRender { ref template, .. }) if template == "goodbye.html"
    ));
    assert!(transport.is_empty());
}

#[tokio::test]
async fn templates_load_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("receipt.html"), "<p>Total: {{ total }}</p>").unwrap();

    let transport = MemoryTransport::new();
    let mailer = Mailer::new(transport.clone(), MiniJinjaEngine::from_dir(dir.path()));
    mailer.always_from("billing@example.com");

    mailer
        .send("receipt.html", json!({ "total": "$12.00" }), |m| {
            m.to("customer@example.com");
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(
        transport.last().unwrap().envelope.html(),
        Some("<p>Total: $12.00</p>")
    );
}
