//! Product lookup tests against a mock catalog server

use serde_json::{json, Value};
use shelfaware_common::db::init_in_memory;
use shelfaware_server::db::ProductCache;
use shelfaware_server::services::{FoodProduct, OpenFoodsClient, OpenFoodsError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OATS_BARCODE: &str = "4099100207149";
const OATS_IMAGE: &str =
    "https://images.openfoodfacts.org/images/products/409/910/020/7149/front_en.3.400.jpg";

fn rolled_oats_response() -> Value {
    json!({
        "code": OATS_BARCODE,
        "product": {
            "product_name": "Rolled Oats",
            "brands_tags": ["millville", "aldi"],
            "categories_tags": [
                "en:plant-based-foods-and-beverages",
                "en:plant-based-foods",
                "en:breakfasts",
                "en:cereals-and-potatoes",
                "en:cereals-and-their-products",
                "en:breakfast-cereals",
                "en:flakes",
                "en:cereal-flakes",
                "en:rolled-flakes",
                "en:rolled-oats"
            ],
            "image_front_url": OATS_IMAGE
        },
        "status": 1
    })
}

fn client_for(server: &MockServer) -> OpenFoodsClient {
    OpenFoodsClient::new(format!("{}/api/v0/product", server.uri())).unwrap()
}

fn product_path(barcode: &str) -> String {
    format!("/api/v0/product/{}.json", barcode)
}

#[tokio::test]
async fn test_fetch_product_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(product_path(OATS_BARCODE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rolled_oats_response()))
        .mount(&server)
        .await;

    let product = client_for(&server)
        .fetch_product(OATS_BARCODE)
        .await
        .unwrap()
        .expect("product should be found");

    assert_eq!(product.product_name.as_deref(), Some("Rolled Oats"));
    assert_eq!(product.brands, vec!["millville", "aldi"]);
    assert_eq!(
        product.categories,
        vec![
            "plant-based-foods-and-beverages",
            "plant-based-foods",
            "breakfasts",
            "cereals-and-potatoes",
            "cereals-and-their-products",
            "breakfast-cereals",
            "flakes",
            "cereal-flakes",
            "rolled-flakes",
            "rolled-oats",
        ]
    );
    assert!(product.categories.iter().all(|c| !c.starts_with("en:")));
    assert_eq!(product.image_url.as_deref(), Some(OATS_IMAGE));
}

#[tokio::test]
async fn test_fetch_product_status_zero_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(product_path("0000000000000")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0000000000000",
            "status": 0,
            "status_verbose": "product not found"
        })))
        .mount(&server)
        .await;

    let product = client_for(&server).fetch_product("0000000000000").await.unwrap();
    assert!(product.is_none());
}

#[tokio::test]
async fn test_fetch_product_http_404_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let product = client_for(&server).fetch_product("123").await.unwrap();
    assert!(product.is_none());
}

#[tokio::test]
async fn test_fetch_product_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_product("123").await.unwrap_err();
    match err {
        OpenFoodsError::Api(status, body) => {
            assert_eq!(status, 500);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_product_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_product("123").await.unwrap_err();
    assert!(matches!(err, OpenFoodsError::Parse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_fetch_product_unreachable_is_transport_error() {
    // Port 9 (discard) is closed on test machines
    let client = OpenFoodsClient::new("http://127.0.0.1:9/api/v0/product/").unwrap();

    let err = client.fetch_product("123").await.unwrap_err();
    assert!(matches!(err, OpenFoodsError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_cached_lookup_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(product_path(OATS_BARCODE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rolled_oats_response()))
        .expect(1)
        .mount(&server)
        .await;

    let pool = init_in_memory().await.unwrap();
    let client = client_for(&server).with_cache(ProductCache::new(pool.clone()));

    let first = client.fetch_product(OATS_BARCODE).await.unwrap();
    let second = client.fetch_product(OATS_BARCODE).await.unwrap();
    assert_eq!(first, second);
    assert!(second.is_some());

    let cached = ProductCache::new(pool).get(OATS_BARCODE).await.unwrap();
    assert!(cached.is_some());
}

#[tokio::test]
async fn test_fetch_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/front.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xd8, 0xff, 0xe0]))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut product = FoodProduct {
        product_name: Some("Rolled Oats".to_string()),
        brands: vec![],
        categories: vec![],
        image_url: None,
    };

    assert_eq!(client.fetch_image(&product).await.unwrap(), None);

    product.image_url = Some(format!("{}/images/front.jpg", server.uri()));
    let bytes = client.fetch_image(&product).await.unwrap();
    assert_eq!(bytes, Some(vec![0xff, 0xd8, 0xff, 0xe0]));
}
