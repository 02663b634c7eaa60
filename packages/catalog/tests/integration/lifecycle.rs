use std::time::Duration;

use catalog::CatalogError;
use serde_json::json;
use tokio::time::timeout;

use crate::common::TestCatalog;

mod create_flow {
    use super::*;

    #[tokio::test]
    async fn create_without_image_stores_empty_url() {
        let catalog = TestCatalog::new();
        let created = catalog
            .service
            .create_category("Beverages", None)
            .await
            .unwrap();

        let record = catalog.raw_record(created.id.as_str()).await.unwrap();
        assert_eq!(
            record,
            json!({
                "id": created.id.as_str(),
                "generalName": "Beverages",
                "genType": "Product Group",
                "generalCode": 0,
                "companyID": "FC",
                "imageUrl": "",
            })
        );
    }

    #[tokio::test]
    async fn create_with_image_stores_resolvable_url() {
        let catalog = TestCatalog::new();
        let url = catalog.upload("snacks.png").await;
        let created = catalog
            .service
            .create_category("Snacks", Some(url))
            .await
            .unwrap();

        let stored_url = created.image_url.as_deref().unwrap();
        assert!(stored_url.contains("alt=media"));
        assert!(catalog.image_exists(stored_url).await);
    }

    #[tokio::test]
    async fn create_appears_in_live_list() {
        let catalog = TestCatalog::new();
        let mut watch = catalog.service.watch_categories().await.unwrap();
        assert!(watch.current().is_empty());

        catalog
            .service
            .create_category("Fresh", None)
            .await
            .unwrap();

        let list = timeout(Duration::from_secs(1), watch.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].general_name, "Fresh");
    }

    #[tokio::test]
    async fn create_with_blank_name_is_rejected() {
        let catalog = TestCatalog::new();
        let result = catalog.service.create_category("   ", None).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert!(catalog.service.categories().await.unwrap().is_empty());
    }
}

mod edit_flow {
    use super::*;

    #[tokio::test]
    async fn rename_preserves_id_and_image() {
        let catalog = TestCatalog::new();
        let url = catalog.upload("keep.png").await;
        let created = catalog
            .service
            .create_category("Old name", Some(url))
            .await
            .unwrap();

        catalog
            .service
            .update_category(&created.id, "New name", created.image_url.clone())
            .await
            .unwrap();

        let stored = catalog.service.category(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.id, created.id);
        assert_eq!(stored.general_name, "New name");
        assert_eq!(stored.image_url, created.image_url);
        assert!(catalog.image_exists(stored.image_url.as_deref().unwrap()).await);
    }

    #[tokio::test]
    async fn replace_image_rewrites_url() {
        let catalog = TestCatalog::new();
        let old_url = catalog.upload("old.png").await;
        let created = catalog
            .service
            .create_category("Pics", Some(old_url.clone()))
            .await
            .unwrap();

        let new_url = catalog.upload("new.png").await;
        catalog
            .service
            .update_category(&created.id, "Pics", Some(new_url.clone()))
            .await
            .unwrap();

        let stored = catalog.service.category(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.image_url.as_deref(), Some(new_url.as_str()));
        assert!(catalog.image_exists(&new_url).await);

        // The replaced blob is left behind; nothing references it any more.
        assert!(catalog.image_exists(&old_url).await);
    }

    #[tokio::test]
    async fn removed_image_reads_back_as_none() {
        let catalog = TestCatalog::new();
        let url = catalog.upload("temp.png").await;
        let created = catalog
            .service
            .create_category("Pics", Some(url.clone()))
            .await
            .unwrap();

        catalog.service.remove_image(&url).await.unwrap();
        catalog
            .service
            .update_category(&created.id, "Pics", None)
            .await
            .unwrap();

        let stored = catalog.service.category(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.image_url, None);
        assert!(!catalog.image_exists(&url).await);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let catalog = TestCatalog::new();
        let result = catalog
            .service
            .update_category(&"1716000000000".into(), "Ghost", None)
            .await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_is_visible_in_live_list() {
        let catalog = TestCatalog::new();
        let created = catalog
            .service
            .create_category("Before", None)
            .await
            .unwrap();

        let mut watch = catalog.service.watch_categories().await.unwrap();
        catalog
            .service
            .update_category(&created.id, "After", None)
            .await
            .unwrap();

        let list = timeout(Duration::from_secs(1), watch.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(list[0].general_name, "After");
    }
}

mod delete_flow {
    use super::*;

    #[tokio::test]
    async fn delete_removes_record_and_blob() {
        let catalog = TestCatalog::new();
        let url = catalog.upload("doomed.png").await;
        let created = catalog
            .service
            .create_category("Doomed", Some(url.clone()))
            .await
            .unwrap();

        catalog.service.delete_category(&created.id).await.unwrap();

        assert!(catalog.service.category(&created.id).await.unwrap().is_none());
        assert!(!catalog.image_exists(&url).await);
    }

    #[tokio::test]
    async fn delete_without_image_touches_no_blobs() {
        let catalog = TestCatalog::new();
        let created = catalog
            .service
            .create_category("Plain", None)
            .await
            .unwrap();

        let removed = catalog.service.delete_category(&created.id).await.unwrap();
        assert_eq!(removed.image_url, None);
        assert!(catalog.service.category(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_id_is_not_found_and_changes_nothing() {
        let catalog = TestCatalog::new();
        let created = catalog
            .service
            .create_category("Bystander", None)
            .await
            .unwrap();

        let result = catalog.service.delete_category(&"1716000000000".into()).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));

        let list = catalog.service.categories().await.unwrap();
        assert_eq!(list, vec![created]);
    }

    #[tokio::test]
    async fn delete_empties_live_list() {
        let catalog = TestCatalog::new();
        let created = catalog
            .service
            .create_category("Only", None)
            .await
            .unwrap();

        let mut watch = catalog.service.watch_categories().await.unwrap();
        assert_eq!(watch.current().len(), 1);

        catalog.service.delete_category(&created.id).await.unwrap();

        let list = timeout(Duration::from_secs(1), watch.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(list.is_empty());
    }
}
