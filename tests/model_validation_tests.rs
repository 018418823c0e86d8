use service_hub::models::{
    CreatePurchasedItemRequest, InsertResult, LoginRequest, ServiceListing, ServiceStatus,
    StatusUpdateRequest, UpdateServiceRequest,
};
use serde_json::json;
use uuid::Uuid;

// The HTTP surface is consumed by a frontend that exchanges camelCase
// documents; these tests pin the wire shapes so a field rename inside the
// Rust models cannot silently break the contract.

#[test]
fn test_service_listing_serializes_camel_case() {
    let listing = ServiceListing {
        id: Uuid::from_u128(7),
        service_provider_email: "alice@example.com".to_string(),
        service_provider_name: "Alice".to_string(),
        service_provider_image: None,
        service_name: "Lawn mowing".to_string(),
        price: 30.0,
        service_area: "Limerick".to_string(),
        description: "Weekly mowing".to_string(),
        image_url: Some("https://img.example/lawn.jpg".to_string()),
    };

    let value = serde_json::to_value(&listing).unwrap();

    assert_eq!(value["serviceProviderEmail"], "alice@example.com");
    assert_eq!(value["serviceName"], "Lawn mowing");
    assert_eq!(value["imageUrl"], "https://img.example/lawn.jpg");
    // The snake_case spellings must not leak onto the wire
    assert!(value.get("service_provider_email").is_none());
}

#[test]
fn test_service_status_wire_values() {
    assert_eq!(
        serde_json::to_value(ServiceStatus::InProgress).unwrap(),
        json!("in-progress")
    );
    assert_eq!(
        serde_json::to_value(ServiceStatus::Pending).unwrap(),
        json!("pending")
    );

    let parsed: ServiceStatus = serde_json::from_value(json!("cancelled")).unwrap();
    assert_eq!(parsed, ServiceStatus::Cancelled);
}

#[test]
fn test_status_update_request_field_name() {
    let req: StatusUpdateRequest =
        serde_json::from_value(json!({ "serviceStatus": "completed" })).unwrap();
    assert_eq!(req.service_status, ServiceStatus::Completed);
}

#[test]
fn test_purchase_request_status_defaults_to_pending() {
    let req: CreatePurchasedItemRequest = serde_json::from_value(json!({
        "currentUserEmail": "bob@example.com",
        "serviceProviderEmail": "alice@example.com",
        "serviceId": Uuid::from_u128(9),
        "serviceName": "Lawn mowing",
        "price": 30.0
    }))
    .unwrap();

    assert_eq!(req.status, ServiceStatus::Pending);
}

#[test]
fn test_update_request_skips_absent_fields() {
    let req = UpdateServiceRequest {
        price: Some(45.0),
        ..UpdateServiceRequest::default()
    };

    let value = serde_json::to_value(&req).unwrap();
    let obj = value.as_object().unwrap();

    // Only the provided field is serialized; partial update payloads stay partial.
    assert_eq!(obj.len(), 1);
    assert_eq!(value["price"], 45.0);
}

#[test]
fn test_insert_result_wire_shape() {
    let result = InsertResult {
        acknowledged: true,
        inserted_id: Uuid::from_u128(3),
    };

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["acknowledged"], true);
    assert!(value.get("insertedId").is_some());
}

#[test]
fn test_login_request_ignores_extra_fields() {
    // The client posts its whole user object; only the email matters.
    let req: LoginRequest = serde_json::from_value(json!({
        "email": "alice@example.com",
        "displayName": "Alice",
        "photoURL": "https://img.example/alice.png"
    }))
    .unwrap();

    assert_eq!(req.email, "alice@example.com");
}
