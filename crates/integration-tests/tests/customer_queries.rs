//! Query service: filters, sorting, pagination and partitions.

#![allow(clippy::unwrap_used)]

use crm_integration_tests::{TestApp, phone};
use crm_server::models::{
    CustomerFilters, CustomerSort, CustomerSummary, Pagination, SortField, SortOrder,
};

fn ids(items: &[CustomerSummary]) -> Vec<i64> {
    items.iter().map(|summary| summary.customer.id.as_i64()).collect()
}

#[tokio::test]
async fn second_page_of_fifteen() {
    let app = TestApp::new().await;
    for n in 0..15 {
        app.create_customer("Test", "Customer", &phone(n)).await;
    }

    let page = app
        .queries()
        .list_customers(&CustomerFilters::default(), CustomerSort::default(), Pagination::new(2, 10))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 15);
    assert_eq!(page.total_pages, 2);
    assert!(!page.has_next);
}

#[tokio::test]
async fn city_filter_is_case_insensitive() {
    let app = TestApp::new().await;
    let pune = app.create_customer("Asha", "Rao", &phone(1)).await;
    let mumbai = app.create_customer("Vikram", "Iyer", &phone(2)).await;
    app.create_address(pune.id, "Pune", false).await;
    app.create_address(mumbai.id, "Mumbai", false).await;

    let filters = CustomerFilters {
        city: Some("pune".to_owned()),
        ..Default::default()
    };
    let page = app
        .queries()
        .list_customers(&filters, CustomerSort::default(), Pagination::default())
        .await
        .unwrap();

    assert_eq!(ids(&page.items), vec![pune.id.as_i64()]);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn search_matches_names_phone_and_address_details() {
    let app = TestApp::new().await;
    let asha = app.create_customer("Asha", "Rao", "9876500001").await;
    let vikram = app.create_customer("Vikram", "Iyer", "9123400002").await;
    let meera = app.create_customer("Meera", "Kapoor", "9000000003").await;
    app.create_address(meera.id, "Pune", false).await;

    let search = |term: &str| CustomerFilters {
        search: Some(term.to_owned()),
        ..Default::default()
    };

    for (term, expected) in [
        ("asha", vec![asha.id.as_i64()]),
        ("IYER", vec![vikram.id.as_i64()]),
        ("91234", vec![vikram.id.as_i64()]),
        ("main street", vec![meera.id.as_i64()]),
    ] {
        let page = app
            .queries()
            .list_customers(&search(term), CustomerSort::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&page.items), expected, "search {term:?}");
    }
}

#[tokio::test]
async fn wildcards_in_input_match_literally() {
    let app = TestApp::new().await;
    app.create_customer("Asha", "Rao", &phone(1)).await;
    let literal = app.create_customer("50%_off", "Rao", &phone(2)).await;

    for term in ["%", "_", "0%_"] {
        let filters = CustomerFilters {
            search: Some(term.to_owned()),
            ..Default::default()
        };
        let page = app
            .queries()
            .list_customers(&filters, CustomerSort::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![literal.id.as_i64()], "search {term:?}");
    }
}

#[tokio::test]
async fn filters_combine_with_and() {
    let app = TestApp::new().await;
    let both = app.create_customer("Asha", "Rao", &phone(1)).await;
    let city_only = app.create_customer("Vikram", "Iyer", &phone(2)).await;
    app.create_address(both.id, "Pune", false).await;
    app.create_address(city_only.id, "Pune", false).await;
    sqlx::query("UPDATE addresses SET state = 'Goa' WHERE customer_id = ?")
        .bind(city_only.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let filters = CustomerFilters {
        city: Some("pune".to_owned()),
        state: Some("maha".to_owned()),
        pin_code: Some("4110".to_owned()),
        search: None,
    };
    let page = app
        .queries()
        .list_customers(&filters, CustomerSort::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(ids(&page.items), vec![both.id.as_i64()]);
}

#[tokio::test]
async fn sort_by_address_count_descending_breaks_ties_by_id() {
    let app = TestApp::new().await;
    let a = app.create_customer("Ann", "Zed", &phone(1)).await;
    let b = app.create_customer("Bob", "Yu", &phone(2)).await;
    let c = app.create_customer("Cid", "Xo", &phone(3)).await;
    app.create_address(b.id, "Pune", false).await;
    app.create_address(b.id, "Mumbai", false).await;
    app.create_address(a.id, "Pune", false).await;
    app.create_address(c.id, "Pune", false).await;

    let sort = CustomerSort {
        field: SortField::AddressCount,
        order: SortOrder::Desc,
    };
    let page = app
        .queries()
        .list_customers(&CustomerFilters::default(), sort, Pagination::default())
        .await
        .unwrap();

    assert_eq!(
        ids(&page.items),
        vec![b.id.as_i64(), a.id.as_i64(), c.id.as_i64()]
    );
    assert_eq!(page.items[0].address_count, 2);
}

#[tokio::test]
async fn sort_by_last_name() {
    let app = TestApp::new().await;
    let a = app.create_customer("Ann", "Zed", &phone(1)).await;
    let b = app.create_customer("Bob", "Yu", &phone(2)).await;

    let sort = CustomerSort {
        field: SortField::LastName,
        order: SortOrder::Asc,
    };
    let page = app
        .queries()
        .list_customers(&CustomerFilters::default(), sort, Pagination::default())
        .await
        .unwrap();
    assert_eq!(ids(&page.items), vec![b.id.as_i64(), a.id.as_i64()]);
}

#[tokio::test]
async fn partitions_by_address_count() {
    let app = TestApp::new().await;
    let none = app.create_customer("No", "Address", &phone(1)).await;
    let single = app.create_customer("One", "Address", &phone(2)).await;
    let multiple = app.create_customer("Two", "Addresses", &phone(3)).await;
    let only = app.create_address(single.id, "Pune", true).await;
    app.create_address(multiple.id, "Pune", false).await;
    app.create_address(multiple.id, "Mumbai", false).await;

    let singles = app.queries().list_by_single_address().await.unwrap();
    let multiples = app.queries().list_by_multiple_addresses().await.unwrap();
    assert_eq!(ids(&singles), vec![single.id.as_i64()]);
    assert_eq!(singles[0].address_count, 1);
    assert_eq!(ids(&multiples), vec![multiple.id.as_i64()]);
    assert_eq!(multiples[0].address_count, 2);
    assert!(!ids(&singles).contains(&none.id.as_i64()));
    assert!(!ids(&multiples).contains(&none.id.as_i64()));

    // Removing the only address drops the customer from both partitions
    app.addresses().delete(only.id).await.unwrap();
    let singles = app.queries().list_by_single_address().await.unwrap();
    let multiples = app.queries().list_by_multiple_addresses().await.unwrap();
    assert!(!ids(&singles).contains(&single.id.as_i64()));
    assert!(!ids(&multiples).contains(&single.id.as_i64()));
}

#[tokio::test]
async fn stats_counts_everything() {
    let app = TestApp::new().await;
    let a = app.create_customer("Ann", "Zed", &phone(1)).await;
    let b = app.create_customer("Bob", "Yu", &phone(2)).await;
    app.create_customer("Cid", "Xo", &phone(3)).await;
    app.create_address(a.id, "Pune", true).await;
    app.create_address(b.id, "Pune", true).await;
    app.create_address(b.id, "Mumbai", false).await;

    let stats = app.queries().stats().await.unwrap();
    assert_eq!(stats.customers, 3);
    assert_eq!(stats.addresses, 3);
    assert_eq!(stats.default_addresses, 2);
    assert_eq!(stats.single_address_customers, 1);
    assert_eq!(stats.multiple_address_customers, 1);
}
