use api_lib::web::ApiDoc;
use serde_json::Value;
use utoipa::OpenApi;

fn document() -> Value {
    serde_json::from_str(&ApiDoc::openapi().to_json().unwrap()).unwrap()
}

#[test]
fn every_route_is_documented() {
    let doc = document();
    let paths = doc["paths"].as_object().unwrap();
    let expected = [
        ("/register", "post"),
        ("/login", "post"),
        ("/user/{username}", "get"),
        ("/user/{username}", "put"),
        ("/schedule", "post"),
        ("/schedule", "get"),
        ("/schedule/{trip_id}", "get"),
        ("/schedule/{trip_id}", "delete"),
        ("/additional_schedule", "post"),
        ("/additional_schedule", "get"),
        ("/additional_schedule/{trip_id}", "get"),
        ("/additional_schedule/{trip_id}", "delete"),
        ("/feedback", "post"),
        ("/feedback", "get"),
        ("/photos", "post"),
        ("/photos", "get"),
    ];
    for (path, method) in expected {
        assert!(
            paths.get(path).and_then(|p| p.get(method)).is_some(),
            "{method} {path} is missing from the document"
        );
    }
}

#[test]
fn username_is_a_query_parameter_on_lists() {
    let doc = document();
    let params = doc["paths"]["/schedule"]["get"]["parameters"].as_array().unwrap();
    assert!(params
        .iter()
        .any(|p| p["name"] == "username" && p["in"] == "query"));
}
