use scout_backend::client::{table_url, token_url};
use scout_backend::{BackendError, Product, Session};

#[test]
fn products_decode_from_rest_rows() {
    let body = r#"[
        {"id":"1","title":"Mechanical keyboard","name":"Keychron K2",
         "created_at":"2024-03-01T10:00:00Z","updated_at":"2024-03-02T10:00:00Z"},
        {"id":"2","title":"Mouse","name":"MX Master",
         "created_at":"2024-03-01T10:00:00Z","updated_at":"2024-03-01T10:00:00Z","extra":true}
    ]"#;
    let products: Vec<Product> = serde_json::from_str(body).unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Keychron K2");
    assert_eq!(products[1].id, "2");
    assert_eq!(products[0].to_string(), "🛒 Mechanical keyboard (Keychron K2) - ID: 1");
}

#[test]
fn sessions_tolerate_missing_id_lists() {
    let body = r#"[
        {"id":"s1","cron_schedule":"*/5 * * * *","provider_ids":["p1","p2"],"product_ids":["1"],
         "created_at":"c","updated_at":"u"},
        {"id":"s2","cron_schedule":"0 * * * *","created_at":"c","updated_at":"u"}
    ]"#;
    let sessions: Vec<Session> = serde_json::from_str(body).unwrap();
    assert_eq!(sessions[0].provider_ids, vec!["p1", "p2"]);
    assert!(sessions[1].product_ids.is_empty());
    assert_eq!(sessions[0].to_string(), "🗓 s1 [*/5 * * * *] - 2 provider(s), 1 product(s)");
}

#[test]
fn product_json_keeps_field_names() {
    let p = Product {
        id:         "7".into(),
        title:      "t".into(),
        name:       "n".into(),
        created_at: "c".into(),
        updated_at: "u".into(),
    };
    let v = serde_json::to_value(&p).unwrap();
    for key in ["id", "title", "name", "created_at", "updated_at"] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn urls_ignore_trailing_slash() {
    assert_eq!(
        token_url("https://x.supabase.co/", "password"),
        "https://x.supabase.co/auth/v1/token?grant_type=password",
    );
    assert_eq!(
        table_url("https://x.supabase.co", "products"),
        "https://x.supabase.co/rest/v1/products?select=*&order=id.asc",
    );
}

#[test]
fn decode_errors_map_to_decode() {
    let err: BackendError = serde_json::from_str::<Vec<Product>>("{}").unwrap_err().into();
    assert!(matches!(err, BackendError::Decode(_)));
    let status = BackendError::Status { status: 401, body: "nope".into() };
    assert_eq!(status.to_string(), "backend returned HTTP 401: nope");
}
