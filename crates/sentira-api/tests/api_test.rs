// Integration tests for the Sentira API
// Run with: cargo test --test api_test
//
// These tests need a running server with a live database and archive:
//   DATABASE_URL=postgres://... cargo run -p sentira-api

use serde_json::json;

const API_BASE_URL: &str = "http://localhost:8000";

#[tokio::test]
#[ignore] // Run with: cargo test --test api_test -- --ignored
async fn test_full_analysis_workflow() {
    let client = reqwest::Client::new();

    println!("🧪 Testing full analysis workflow...");

    // Step 1: Analyze a clearly positive text
    println!("\n📝 Step 1: Analyzing text...");
    let analyze_response = client
        .post(format!("{}/v1/analyze", API_BASE_URL))
        .json(&json!({
            "text": "Quarterly results beat expectations and the outlook was raised",
            "metadata": { "source": "integration-test" }
        }))
        .send()
        .await
        .expect("Failed to analyze text");

    assert_eq!(
        analyze_response.status(),
        201,
        "Expected 201 Created, got {}",
        analyze_response.status()
    );

    let analysis: serde_json::Value = analyze_response
        .json()
        .await
        .expect("Failed to parse analysis response");

    let record_id = analysis["id"].as_i64().expect("Missing record id");
    println!(
        "✅ Classified as {} (confidence {})",
        analysis["sentiment"], analysis["confidence"]
    );
    assert!(analysis["confidence"].as_f64().unwrap() >= 0.0);
    assert!(analysis["confidence"].as_f64().unwrap() <= 1.0);

    // Step 2: Today's summary includes the label we just wrote
    println!("\n📊 Step 2: Fetching today's summary...");
    let today_response = client
        .get(format!("{}/v1/sentiment/today", API_BASE_URL))
        .send()
        .await
        .expect("Failed to fetch today's summary");

    assert_eq!(today_response.status(), 200);
    let today: serde_json::Value = today_response
        .json()
        .await
        .expect("Failed to parse summary");
    let label = analysis["sentiment"].as_str().unwrap();
    assert!(
        today["summary"].get(label).is_some(),
        "Expected label {} in today's summary",
        label
    );
    println!("✅ Summary contains {}", label);

    // Step 3: History contains the record
    println!("\n📜 Step 3: Fetching history...");
    let history_response = client
        .get(format!("{}/v1/sentiment/history?days=1", API_BASE_URL))
        .send()
        .await
        .expect("Failed to fetch history");

    assert_eq!(history_response.status(), 200);
    let history: serde_json::Value = history_response
        .json()
        .await
        .expect("Failed to parse history");
    let found = history["records"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"].as_i64() == Some(record_id));
    assert!(found, "Record {} missing from history", record_id);
    println!("✅ History contains record {}", record_id);

    // Step 4: Trend covers the requested window
    println!("\n📈 Step 4: Fetching 7-day trend...");
    let trend_response = client
        .get(format!("{}/v1/sentiment/trend?window_days=7", API_BASE_URL))
        .send()
        .await
        .expect("Failed to fetch trend");

    assert_eq!(trend_response.status(), 200);
    let trend: serde_json::Value = trend_response.json().await.expect("Failed to parse trend");
    assert_eq!(trend["days"].as_array().unwrap().len(), 7);
    println!("✅ Trend covers 7 days");

    // Step 5: Archived raw text shows up in the listing
    println!("\n🗄️  Step 5: Listing archived objects...");
    let list_response = client
        .get(format!(
            "{}/v1/archive/objects?prefix=raw/text/&limit=100",
            API_BASE_URL
        ))
        .send()
        .await
        .expect("Failed to list archive");

    assert_eq!(list_response.status(), 200);
    let listing: serde_json::Value = list_response
        .json()
        .await
        .expect("Failed to parse listing");
    assert!(listing["count"].as_u64().unwrap() >= 1);
    println!("✅ Archive holds {} raw object(s)", listing["count"]);

    println!("\n🎉 Full analysis workflow passed");
}

#[tokio::test]
#[ignore] // Run with: cargo test --test api_test -- --ignored
async fn test_validation_errors() {
    let client = reqwest::Client::new();

    println!("🧪 Testing validation errors...");

    // Empty text is rejected before any backend call
    let response = client
        .post(format!("{}/v1/analyze", API_BASE_URL))
        .json(&json!({ "text": "   " }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    println!("✅ Empty text rejected");

    // Oversized text is rejected
    let response = client
        .post(format!("{}/v1/analyze", API_BASE_URL))
        .json(&json!({ "text": "x".repeat(5001) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    println!("✅ Oversized text rejected");

    // Non-positive trend window is rejected
    let response = client
        .get(format!("{}/v1/sentiment/trend?window_days=0", API_BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    println!("✅ Non-positive window rejected");

    // History longer than a year is rejected
    let response = client
        .get(format!("{}/v1/sentiment/history?days=400", API_BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    println!("✅ Year-long history cap enforced");
}

#[tokio::test]
#[ignore] // Run with: cargo test --test api_test -- --ignored
async fn test_health_endpoints() {
    let client = reqwest::Client::new();

    println!("🧪 Testing health endpoints...");

    let response = client
        .get(format!("{}/health", API_BASE_URL))
        .send()
        .await
        .expect("Failed to reach liveness endpoint");
    assert_eq!(response.status(), 200);
    println!("✅ Liveness endpoint up");

    let response = client
        .get(format!("{}/v1/health", API_BASE_URL))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(response.status(), 200);

    let health: serde_json::Value = response.json().await.expect("Failed to parse health");
    println!(
        "✅ Health: {} (database={}, archive={})",
        health["status"], health["database"], health["archive"]
    );
    assert!(["healthy", "degraded", "unhealthy"]
        .contains(&health["status"].as_str().unwrap_or_default()));
}
