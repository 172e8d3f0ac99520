//! Customer store: CRUD, uniqueness and cascade.

#![allow(clippy::unwrap_used)]

use crm_core::CustomerId;
use crm_integration_tests::{TestApp, new_customer, phone};
use crm_server::db::RepositoryError;
use crm_server::models::CustomerChanges;

#[tokio::test]
async fn create_and_get() {
    let app = TestApp::new().await;
    let created = app.create_customer("Asha", "Rao", "+919876543210").await;

    let fetched = app.customers().get_by_id(created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.phone_number.as_str(), "+919876543210");
}

#[tokio::test]
async fn duplicate_phone_is_conflict_and_inserts_nothing() {
    let app = TestApp::new().await;
    app.create_customer("Asha", "Rao", &phone(1)).await;

    let err = app
        .customers()
        .create(&new_customer("Other", "Person", &phone(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let stats = app.queries().stats().await.unwrap();
    assert_eq!(stats.customers, 1);
}

#[tokio::test]
async fn partial_update_keeps_unspecified_fields() {
    let app = TestApp::new().await;
    let created = app.create_customer("Asha", "Rao", &phone(1)).await;

    let changes = CustomerChanges {
        last_name: Some("Iyer".to_owned()),
        ..Default::default()
    };
    let updated = app.customers().update(created.id, &changes).await.unwrap();
    assert_eq!(updated.first_name, "Asha");
    assert_eq!(updated.last_name, "Iyer");
    assert_eq!(updated.phone_number, created.phone_number);
}

#[tokio::test]
async fn update_to_taken_phone_is_conflict() {
    let app = TestApp::new().await;
    app.create_customer("Asha", "Rao", &phone(1)).await;
    let other = app.create_customer("Vikram", "Iyer", &phone(2)).await;

    let changes = CustomerChanges {
        phone_number: Some(phone(1).parse().unwrap()),
        ..Default::default()
    };
    let err = app.customers().update(other.id, &changes).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(
        app.customers().get_by_id(other.id).await.unwrap().phone_number.as_str(),
        phone(2)
    );
}

#[tokio::test]
async fn missing_customer_is_not_found() {
    let app = TestApp::new().await;
    let id = CustomerId::new(7);

    assert!(matches!(
        app.customers().get_by_id(id).await,
        Err(RepositoryError::NotFound("customer"))
    ));
    assert!(matches!(
        app.customers().update(id, &CustomerChanges::default()).await,
        Err(RepositoryError::NotFound("customer"))
    ));
    assert!(matches!(
        app.customers().delete(id).await,
        Err(RepositoryError::NotFound("customer"))
    ));
    assert!(matches!(
        app.customers().get_with_addresses(id).await,
        Err(RepositoryError::NotFound("customer"))
    ));
}

#[tokio::test]
async fn delete_cascades_to_addresses() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Asha", "Rao", &phone(1)).await;
    let keep = app.create_customer("Vikram", "Iyer", &phone(2)).await;
    let a = app.create_address(customer.id, "Pune", true).await;
    app.create_address(customer.id, "Mumbai", false).await;
    app.create_address(keep.id, "Chennai", true).await;

    app.customers().delete(customer.id).await.unwrap();

    assert!(app.addresses().list_for_customer(customer.id).await.unwrap().is_empty());
    assert!(app.addresses().get(a.id).await.is_err());
    assert_eq!(app.addresses().list_for_customer(keep.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_with_addresses_orders_by_insertion() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Asha", "Rao", &phone(1)).await;
    let a = app.create_address(customer.id, "Pune", false).await;
    let b = app.create_address(customer.id, "Mumbai", true).await;

    let details = app.customers().get_with_addresses(customer.id).await.unwrap();
    assert_eq!(details.customer, customer);
    let ids: Vec<_> = details.addresses.iter().map(|address| address.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn clear_all_removes_customers_and_addresses() {
    let app = TestApp::new().await;
    for n in 0..3 {
        let customer = app.create_customer("Test", "Customer", &phone(n)).await;
        app.create_address(customer.id, "Pune", true).await;
    }

    assert_eq!(app.customers().clear_all().await.unwrap(), 3);
    let stats = app.queries().stats().await.unwrap();
    assert_eq!(stats.customers, 0);
    assert_eq!(stats.addresses, 0);
}
