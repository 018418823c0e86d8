use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use service_hub::{
    AppState,
    auth::Claims,
    config::{AppConfig, Env},
    create_router,
    models::{
        CreatePurchasedItemRequest, CreateServiceRequest, DeleteResult, InsertResult,
        PurchasedItem, ServiceListing, ServiceStatus, UpdateResult, UpdateServiceRequest,
    },
    repository::{ResourceStore, StoreError, StoreState},
};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tokio::net::TcpListener;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "api-test-secret-value-0987654321";
const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

// --- In-Memory Store ---

// A stateful stand-in for the Postgres store with the same observable
// semantics: store-assigned ids, COALESCE-style partial updates, zero-count
// deletes. Lets the full router run with no external services.
#[derive(Default)]
struct InMemoryStore {
    services: Mutex<Vec<ServiceListing>>,
    items: Mutex<Vec<PurchasedItem>>,
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn list_services(
        &self,
        provider_email: Option<&str>,
    ) -> Result<Vec<ServiceListing>, StoreError> {
        let services = self.services.lock().unwrap();
        Ok(match provider_email {
            Some(email) => services
                .iter()
                .filter(|s| s.service_provider_email == email)
                .cloned()
                .collect(),
            None => services.clone(),
        })
    }

    async fn create_service(
        &self,
        doc: CreateServiceRequest,
    ) -> Result<InsertResult, StoreError> {
        let new_id = Uuid::new_v4();
        self.services.lock().unwrap().push(ServiceListing {
            id: new_id,
            service_provider_email: doc.service_provider_email,
            service_provider_name: doc.service_provider_name,
            service_provider_image: doc.service_provider_image,
            service_name: doc.service_name,
            price: doc.price,
            service_area: doc.service_area,
            description: doc.description,
            image_url: doc.image_url,
        });
        Ok(InsertResult {
            acknowledged: true,
            inserted_id: new_id,
        })
    }

    async fn update_service(
        &self,
        id: Uuid,
        fields: UpdateServiceRequest,
    ) -> Result<UpdateResult, StoreError> {
        let mut services = self.services.lock().unwrap();
        let matched = match services.iter_mut().find(|s| s.id == id) {
            Some(service) => {
                if let Some(v) = fields.service_provider_email {
                    service.service_provider_email = v;
                }
                if let Some(v) = fields.service_provider_name {
                    service.service_provider_name = v;
                }
                if let Some(v) = fields.service_provider_image {
                    service.service_provider_image = Some(v);
                }
                if let Some(v) = fields.service_name {
                    service.service_name = v;
                }
                if let Some(v) = fields.price {
                    service.price = v;
                }
                if let Some(v) = fields.service_area {
                    service.service_area = v;
                }
                if let Some(v) = fields.description {
                    service.description = v;
                }
                if let Some(v) = fields.image_url {
                    service.image_url = Some(v);
                }
                1
            }
            None => 0,
        };
        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched,
            modified_count: matched,
        })
    }

    async fn delete_service(&self, id: Uuid) -> Result<DeleteResult, StoreError> {
        let mut services = self.services.lock().unwrap();
        let before = services.len();
        services.retain(|s| s.id != id);
        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: (before - services.len()) as u64,
        })
    }

    async fn list_purchased_items(
        &self,
        buyer_email: Option<&str>,
    ) -> Result<Vec<PurchasedItem>, StoreError> {
        let items = self.items.lock().unwrap();
        Ok(match buyer_email {
            Some(email) => items
                .iter()
                .filter(|i| i.current_user_email == email)
                .cloned()
                .collect(),
            None => items.clone(),
        })
    }

    async fn list_provider_tasks(
        &self,
        provider_email: Option<&str>,
    ) -> Result<Vec<PurchasedItem>, StoreError> {
        let items = self.items.lock().unwrap();
        Ok(match provider_email {
            Some(email) => items
                .iter()
                .filter(|i| i.service_provider_email == email)
                .cloned()
                .collect(),
            None => items.clone(),
        })
    }

    async fn create_purchased_item(
        &self,
        doc: CreatePurchasedItemRequest,
    ) -> Result<InsertResult, StoreError> {
        let new_id = Uuid::new_v4();
        self.items.lock().unwrap().push(PurchasedItem {
            id: new_id,
            current_user_email: doc.current_user_email,
            service_provider_email: doc.service_provider_email,
            service_id: doc.service_id,
            service_name: doc.service_name,
            price: doc.price,
            service_taking_date: doc.service_taking_date,
            special_instruction: doc.special_instruction,
            status: doc.status,
        });
        Ok(InsertResult {
            acknowledged: true,
            inserted_id: new_id,
        })
    }

    async fn update_purchase_status(
        &self,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<UpdateResult, StoreError> {
        let mut items = self.items.lock().unwrap();
        let matched = match items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.status = status;
                1
            }
            None => 0,
        };
        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched,
            modified_count: matched,
        })
    }
}

// --- Test App Scaffolding ---

struct TestApp {
    address: String,
    store: Arc<InMemoryStore>,
}

async fn spawn_app() -> TestApp {
    let store = Arc::new(InMemoryStore::default());

    // Production config so the local identity bypass cannot interfere with
    // the cookie flows under test.
    let mut config = AppConfig::default();
    config.env = Env::Production;
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    let state = AppState {
        store: store.clone() as StoreState,
        config,
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, store }
}

fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client build failed")
}

async fn login(client: &reqwest::Client, app: &TestApp, email: &str) {
    let response = client
        .post(format!("{}/jwt", app.address))
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}

fn seed_service(app: &TestApp, email: &str, name: &str, price: f64) -> Uuid {
    let id = Uuid::new_v4();
    app.store.services.lock().unwrap().push(ServiceListing {
        id,
        service_provider_email: email.to_string(),
        service_provider_name: "Provider".to_string(),
        service_provider_image: None,
        service_name: name.to_string(),
        price,
        service_area: "Limerick".to_string(),
        description: "desc".to_string(),
        image_url: None,
    });
    id
}

fn seed_purchase(app: &TestApp, buyer: &str, provider: &str) -> Uuid {
    let id = Uuid::new_v4();
    app.store.items.lock().unwrap().push(PurchasedItem {
        id,
        current_user_email: buyer.to_string(),
        service_provider_email: provider.to_string(),
        service_id: Uuid::new_v4(),
        service_name: "Lawn mowing".to_string(),
        price: 30.0,
        service_taking_date: None,
        special_instruction: Some("side gate".to_string()),
        status: ServiceStatus::Pending,
    });
    id
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_guarded_route_rejects_anonymous_caller() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/manage-services?email={}", app.address, ALICE))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "unauthorized access");
}

#[tokio::test]
async fn test_manage_services_ownership_scenario() {
    let app = spawn_app().await;
    seed_service(&app, ALICE, "Lawn mowing", 30.0);
    seed_service(&app, ALICE, "Gutter clearing", 55.0);
    seed_service(&app, BOB, "Window cleaning", 20.0);

    let client = cookie_client();
    login(&client, &app, ALICE).await;

    // Asserting someone else's identity: valid session, wrong subject -> 403
    let response = client
        .get(format!("{}/manage-services?email={}", app.address, BOB))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "forbidden access");

    // Matching identity: 200, and only Alice-owned listings come back
    let response = client
        .get(format!("{}/manage-services?email={}", app.address, ALICE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let listings: Vec<ServiceListing> = response.json().await.unwrap();
    assert_eq!(listings.len(), 2);
    assert!(listings.iter().all(|s| s.service_provider_email == ALICE));
}

#[tokio::test]
async fn test_purchased_items_filter_and_fallback() {
    let app = spawn_app().await;
    seed_purchase(&app, ALICE, BOB);
    seed_purchase(&app, BOB, ALICE);

    let client = cookie_client();
    login(&client, &app, ALICE).await;

    // Scoped to the buyer when the email parameter is present
    let response = client
        .get(format!("{}/purchased-items?email={}", app.address, ALICE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let items: Vec<PurchasedItem> = response.json().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].current_user_email, ALICE);

    // Omitted email falls back to the unfiltered collection (preserved
    // upstream behavior; see DESIGN.md)
    let response = client
        .get(format!("{}/purchased-items", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let items: Vec<PurchasedItem> = response.json().await.unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_provider_task_queue_scoping() {
    let app = spawn_app().await;
    seed_purchase(&app, ALICE, BOB);
    seed_purchase(&app, BOB, ALICE);

    let client = cookie_client();
    login(&client, &app, BOB).await;

    let response = client
        .get(format!("{}/servicestodo-items?email={}", app.address, BOB))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let items: Vec<PurchasedItem> = response.json().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].service_provider_email, BOB);
}

#[tokio::test]
async fn test_create_then_list_round_trip() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let doc = serde_json::json!({
        "serviceProviderEmail": ALICE,
        "serviceProviderName": "Alice",
        "serviceName": "Hedge trimming",
        "price": 42.5,
        "serviceArea": "Limerick",
        "description": "Front and back hedges",
        "imageUrl": "https://img.example/hedge.jpg"
    });

    let response = client
        .post(format!("{}/services", app.address))
        .json(&doc)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let insert: InsertResult = response.json().await.unwrap();
    assert!(insert.acknowledged);

    let response = client
        .get(format!("{}/services", app.address))
        .send()
        .await
        .unwrap();
    let listings: Vec<ServiceListing> = response.json().await.unwrap();

    // The stored record matches the submitted fields; only the id is store-assigned
    let created = listings
        .iter()
        .find(|s| s.id == insert.inserted_id)
        .expect("created listing not listed");
    assert_eq!(created.service_provider_email, ALICE);
    assert_eq!(created.service_name, "Hedge trimming");
    assert_eq!(created.price, 42.5);
    assert_eq!(created.description, "Front and back hedges");
    assert_eq!(created.image_url.as_deref(), Some("https://img.example/hedge.jpg"));
}

#[tokio::test]
async fn test_partial_update_replaces_only_given_fields() {
    let app = spawn_app().await;
    let id = seed_service(&app, ALICE, "Lawn mowing", 30.0);

    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/services/{}", app.address, id))
        .json(&serde_json::json!({ "price": 99.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let update: UpdateResult = response.json().await.unwrap();
    assert_eq!(update.matched_count, 1);

    let services = app.store.services.lock().unwrap();
    let updated = services.iter().find(|s| s.id == id).unwrap();
    assert_eq!(updated.price, 99.0);
    // Untouched fields survive the partial update
    assert_eq!(updated.service_name, "Lawn mowing");
    assert_eq!(updated.service_provider_email, ALICE);
}

#[tokio::test]
async fn test_status_transition_touches_only_status() {
    let app = spawn_app().await;
    let id = seed_purchase(&app, ALICE, BOB);

    let client = reqwest::Client::new();
    let response = client
        .patch(format!("{}/servicestodo-items/{}", app.address, id))
        .json(&serde_json::json!({ "serviceStatus": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let update: UpdateResult = response.json().await.unwrap();
    assert_eq!(update.modified_count, 1);

    let items = app.store.items.lock().unwrap();
    let item = items.iter().find(|i| i.id == id).unwrap();
    assert_eq!(item.status, ServiceStatus::Completed);
    // Buyer/provider/instruction fields are untouched by the transition
    assert_eq!(item.current_user_email, ALICE);
    assert_eq!(item.service_provider_email, BOB);
    assert_eq!(item.special_instruction.as_deref(), Some("side gate"));
}

#[tokio::test]
async fn test_delete_service_is_idempotent() {
    let app = spawn_app().await;
    let id = seed_service(&app, ALICE, "Lawn mowing", 30.0);

    let client = reqwest::Client::new();

    let response = client
        .delete(format!("{}/services/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let delete: DeleteResult = response.json().await.unwrap();
    assert_eq!(delete.deleted_count, 1);

    // Second delete of the same id: success with a zero count, never an error
    let response = client
        .delete(format!("{}/services/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let delete: DeleteResult = response.json().await.unwrap();
    assert_eq!(delete.deleted_count, 0);
}

#[tokio::test]
async fn test_malformed_id_is_a_client_error() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/services/not-a-valid-id", app.address))
        .json(&serde_json::json!({ "price": 10.0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "invalid id");
}

#[tokio::test]
async fn test_logout_clears_the_session_cookie() {
    let app = spawn_app().await;
    seed_service(&app, ALICE, "Lawn mowing", 30.0);

    let client = cookie_client();
    login(&client, &app, ALICE).await;

    // Session works before logout
    let response = client
        .get(format!("{}/manage-services?email={}", app.address, ALICE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    // The browser-side copy of the token is gone; the guard rejects again
    let response = client
        .get(format!("{}/manage-services?email={}", app.address, ALICE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_expired_token_is_rejected_at_the_guard() {
    let app = spawn_app().await;

    // Hand-craft a token already past its expiry (beyond the validation leeway)
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = Claims {
        sub: ALICE.to_string(),
        iat: (now - 7200) as usize,
        exp: (now - 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/purchased-items", app.address))
        .header(reqwest::header::COOKIE, format!("token={}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "unauthorized access");
}
