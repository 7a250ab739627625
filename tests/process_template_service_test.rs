//! Process template gateway behavior against recording collaborators.

mod common;

use cmdb_core::auth::AuthAction;
use cmdb_core::context::{Metadata, RequestContext};
use cmdb_core::models::{
    CreateProcessTemplateBatchInput, DeleteProcessTemplateBatchInput,
    ListProcessTemplateWithServiceTemplateInput, ProcessProperty, UpdateProcessTemplateInput,
};
use cmdb_core::query_builder::BasePage;
use cmdb_core::services::ProcessTemplateService;
use cmdb_core::store::{ProcessTemplateStore, StoreError};
use cmdb_core::CmdbError;
use common::{cpu_spec, spec_with, RecordingAuthorizer, RecordingTemplateStore};
use serde_json::json;
use std::sync::Arc;

struct Harness {
    store: Arc<RecordingTemplateStore>,
    authorizer: Arc<RecordingAuthorizer>,
    service: ProcessTemplateService,
}

impl Harness {
    fn with(store: RecordingTemplateStore, authorizer: RecordingAuthorizer) -> Self {
        let store = Arc::new(store);
        let authorizer = Arc::new(authorizer);
        let service = ProcessTemplateService::new(store.clone(), authorizer.clone());
        Self {
            store,
            authorizer,
            service,
        }
    }

    fn allowing() -> Self {
        Self::with(RecordingTemplateStore::new(), RecordingAuthorizer::allowing())
    }

    /// Seed templates directly through the inner store, bypassing the gateway
    async fn seed(&self, biz: i64, service_template_id: i64, count: usize) -> Vec<i64> {
        let mut ids = Vec::new();
        for _ in 0..count {
            let created = self
                .store
                .inner
                .create_process_template(cmdb_core::models::NewProcessTemplate {
                    bk_biz_id: biz,
                    service_template_id,
                    property: ProcessProperty::new(),
                    creator: "seed".to_string(),
                    bk_supplier_account: "0".to_string(),
                })
                .await
                .unwrap();
            ids.push(created.id);
        }
        ids
    }
}

fn ctx() -> RequestContext {
    RequestContext::for_business("alice", 10)
}

#[tokio::test]
async fn test_create_batch_returns_ids_in_input_order() {
    let harness = Harness::allowing();

    let ids = harness
        .service
        .create_process_template_batch(
            &ctx(),
            CreateProcessTemplateBatchInput {
                service_template_id: 5,
                processes: vec![cpu_spec("low"), cpu_spec("high")],
            },
        )
        .await
        .unwrap();

    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    let first = harness.store.inner.get_process_template(ids[0]).await.unwrap();
    let second = harness.store.inner.get_process_template(ids[1]).await.unwrap();
    assert_eq!(first.property.get("cpu"), Some(&json!("low")));
    assert_eq!(second.property.get("cpu"), Some(&json!("high")));
    assert_eq!(first.bk_biz_id, 10);
    assert_eq!(first.service_template_id, 5);
    assert_eq!(first.creator, "alice");

    assert_eq!(harness.authorizer.calls(), vec![(AuthAction::Update, vec![5])]);
}

#[tokio::test]
async fn test_create_batch_with_no_specs_still_authorizes() {
    let harness = Harness::allowing();

    let ids = harness
        .service
        .create_process_template_batch(
            &ctx(),
            CreateProcessTemplateBatchInput {
                service_template_id: 5,
                processes: vec![],
            },
        )
        .await
        .unwrap();

    assert!(ids.is_empty());
    assert_eq!(harness.authorizer.calls().len(), 1);
    assert_eq!(harness.store.count_of("create_process_template"), 0);
}

#[tokio::test]
async fn test_create_batch_denied_never_touches_store() {
    let harness = Harness::with(RecordingTemplateStore::new(), RecordingAuthorizer::denying());

    let err = harness
        .service
        .create_process_template_batch(
            &ctx(),
            CreateProcessTemplateBatchInput {
                service_template_id: 5,
                processes: vec![cpu_spec("low"), cpu_spec("high")],
            },
        )
        .await
        .unwrap_err();

    match err {
        CmdbError::AuthorizationFailed {
            action,
            service_template_ids,
            ..
        } => {
            assert_eq!(action, AuthAction::Update);
            assert_eq!(service_template_ids, vec![5]);
        }
        other => panic!("expected authorization failure, got {other:?}"),
    }
    assert!(harness.store.calls().is_empty());
}

#[tokio::test]
async fn test_create_batch_stops_at_first_failure_and_keeps_earlier_records() {
    let harness = Harness::with(
        RecordingTemplateStore::failing_on_create(2),
        RecordingAuthorizer::allowing(),
    );

    let err = harness
        .service
        .create_process_template_batch(
            &ctx(),
            CreateProcessTemplateBatchInput {
                service_template_id: 5,
                processes: vec![cpu_spec("a"), cpu_spec("b"), cpu_spec("c")],
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_backend());
    assert!(matches!(
        err.store_error(),
        Some(StoreError::Query { operation, .. }) if operation == "create_process_template"
    ));
    assert_eq!(harness.store.count_of("create_process_template"), 2);
    assert_eq!(harness.store.inner.len(), 1);
}

#[tokio::test]
async fn test_missing_business_rejected_before_any_call() {
    let harness = Harness::allowing();
    let ctx = RequestContext::new("alice", Metadata::default());

    let err = harness
        .service
        .create_process_template_batch(
            &ctx,
            CreateProcessTemplateBatchInput {
                service_template_id: 5,
                processes: vec![cpu_spec("low")],
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_input_invalid());

    let err = harness
        .service
        .delete_process_template_batch(
            &ctx,
            DeleteProcessTemplateBatchInput {
                process_templates: vec![1],
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_input_invalid());

    assert!(harness.authorizer.calls().is_empty());
    assert!(harness.store.calls().is_empty());
}

#[tokio::test]
async fn test_delete_authorizes_union_of_distinct_owners() {
    let harness = Harness::allowing();
    let under_five = harness.seed(10, 5, 2).await;
    let under_seven = harness.seed(10, 7, 1).await;

    let targets: Vec<i64> = under_five.iter().chain(&under_seven).copied().collect();
    harness
        .service
        .delete_process_template_batch(
            &ctx(),
            DeleteProcessTemplateBatchInput {
                process_templates: targets.clone(),
            },
        )
        .await
        .unwrap();

    let calls = harness.authorizer.calls();
    assert_eq!(calls.len(), 1);
    let (action, mut owners) = calls[0].clone();
    owners.sort_unstable();
    assert_eq!(action, AuthAction::Update);
    assert_eq!(owners, vec![5, 7]);

    assert_eq!(
        harness.store.calls(),
        vec!["list_process_templates", "delete_process_template_batch"]
    );
    assert!(harness.store.inner.is_empty());
}

#[tokio::test]
async fn test_delete_denied_leaves_templates_in_place() {
    let harness = Harness::with(RecordingTemplateStore::new(), RecordingAuthorizer::denying());
    let ids = harness.seed(10, 5, 2).await;

    let err = harness
        .service
        .delete_process_template_batch(
            &ctx(),
            DeleteProcessTemplateBatchInput {
                process_templates: ids,
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_authorization_failed());
    assert_eq!(harness.store.count_of("delete_process_template_batch"), 0);
    assert_eq!(harness.store.inner.len(), 2);
}

#[tokio::test]
async fn test_delete_with_other_business_template_is_rejected() {
    let harness = Harness::allowing();
    let own = harness.seed(10, 5, 1).await;
    let foreign = harness.seed(99, 5, 1).await;

    let err = harness
        .service
        .delete_process_template_batch(
            &ctx(),
            DeleteProcessTemplateBatchInput {
                process_templates: vec![own[0], foreign[0]],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.store_error(),
        Some(StoreError::NotFound { id, .. }) if *id == foreign[0]
    ));
    assert!(harness.authorizer.calls().is_empty());
    assert_eq!(harness.store.count_of("delete_process_template_batch"), 0);
    assert_eq!(harness.store.inner.len(), 2);
}

#[tokio::test]
async fn test_delete_of_empty_list_is_a_no_op() {
    let harness = Harness::allowing();
    harness.seed(10, 5, 1).await;

    harness
        .service
        .delete_process_template_batch(
            &ctx(),
            DeleteProcessTemplateBatchInput {
                process_templates: vec![],
            },
        )
        .await
        .unwrap();

    assert_eq!(harness.authorizer.calls(), vec![(AuthAction::Update, vec![])]);
    assert_eq!(harness.store.inner.len(), 1);
}

#[tokio::test]
async fn test_update_of_other_business_template_is_not_found() {
    let harness = Harness::allowing();
    let foreign = harness.seed(99, 5, 1).await;

    let err = harness
        .service
        .update_process_template(
            &ctx(),
            UpdateProcessTemplateInput {
                process_template_id: foreign[0],
                process_property: Some(spec_with("port", json!(8080)).spec),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.store_error(),
        Some(StoreError::NotFound { id, .. }) if *id == foreign[0]
    ));
    assert!(harness.authorizer.calls().is_empty());
    assert_eq!(harness.store.count_of("update_process_template"), 0);

    let stored = harness.store.inner.get_process_template(foreign[0]).await.unwrap();
    assert_eq!(stored.modifier, "seed");
    assert!(stored.property.is_empty());
}

#[tokio::test]
async fn test_update_requires_property_and_positive_id() {
    let harness = Harness::allowing();

    for input in [
        UpdateProcessTemplateInput {
            process_template_id: 1,
            process_property: None,
        },
        UpdateProcessTemplateInput {
            process_template_id: 0,
            process_property: Some(ProcessProperty::new()),
        },
    ] {
        let err = harness
            .service
            .update_process_template(&ctx(), input)
            .await
            .unwrap_err();
        assert!(err.is_input_invalid());
    }

    assert!(harness.authorizer.calls().is_empty());
    assert!(harness.store.calls().is_empty());
}

#[tokio::test]
async fn test_update_checks_owner_then_writes() {
    let harness = Harness::allowing();
    let ids = harness.seed(10, 7, 1).await;

    let updated = harness
        .service
        .update_process_template(
            &ctx(),
            UpdateProcessTemplateInput {
                process_template_id: ids[0],
                process_property: Some(spec_with("port", json!(8080)).spec),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.property.get("port"), Some(&json!(8080)));
    assert_eq!(updated.modifier, "alice");
    assert_eq!(harness.authorizer.calls(), vec![(AuthAction::Update, vec![7])]);
    assert_eq!(
        harness.store.calls(),
        vec!["list_process_templates", "update_process_template"]
    );
}

#[tokio::test]
async fn test_update_denied_does_not_write() {
    let harness = Harness::with(RecordingTemplateStore::new(), RecordingAuthorizer::denying());
    let ids = harness.seed(10, 7, 1).await;

    let err = harness
        .service
        .update_process_template(
            &ctx(),
            UpdateProcessTemplateInput {
                process_template_id: ids[0],
                process_property: Some(spec_with("port", json!(8080)).spec),
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_authorization_failed());
    assert_eq!(harness.store.count_of("update_process_template"), 0);
}

#[tokio::test]
async fn test_reads_are_not_authorized() {
    let harness = Harness::with(RecordingTemplateStore::new(), RecordingAuthorizer::denying());
    let ids = harness.seed(10, 5, 3).await;

    let template = harness
        .service
        .get_process_template(&ctx(), ids[1])
        .await
        .unwrap();
    assert_eq!(template.id, ids[1]);

    let page = harness
        .service
        .list_process_templates(
            &ctx(),
            ListProcessTemplateWithServiceTemplateInput {
                service_template_id: Some(5),
                process_template_ids: None,
                page: BasePage::new(0, 2),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.info.len(), 2);

    assert!(harness.authorizer.calls().is_empty());
}

#[tokio::test]
async fn test_get_rejects_non_positive_id() {
    let harness = Harness::allowing();

    let err = harness
        .service
        .get_process_template(&ctx(), -3)
        .await
        .unwrap_err();

    assert!(err.is_input_invalid());
    assert!(harness.store.calls().is_empty());
}

#[tokio::test]
async fn test_get_missing_template_surfaces_store_error() {
    let harness = Harness::allowing();

    let err = harness
        .service
        .get_process_template(&ctx(), 42)
        .await
        .unwrap_err();

    assert!(matches!(
        err.store_error(),
        Some(StoreError::NotFound { id: 42, .. })
    ));
}

#[tokio::test]
async fn test_created_templates_are_listed_under_their_service_template() {
    let harness = Harness::allowing();
    harness.seed(10, 6, 1).await;
    harness.seed(11, 5, 1).await;

    let ids = harness
        .service
        .create_process_template_batch(
            &ctx(),
            CreateProcessTemplateBatchInput {
                service_template_id: 5,
                processes: vec![cpu_spec("high"), cpu_spec("low")],
            },
        )
        .await
        .unwrap();
    assert!(ids[0] < ids[1]);

    let page = harness
        .service
        .list_process_templates(
            &ctx(),
            ListProcessTemplateWithServiceTemplateInput {
                service_template_id: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let listed: Vec<i64> = page.info.iter().map(|t| t.id).collect();
    assert_eq!(page.count, 2);
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_get_returns_property_as_created() {
    let harness = Harness::allowing();
    let mut spec = cpu_spec("high");
    spec.spec.insert("bk_func_name", json!("nginx"));
    spec.spec.insert("bind_info", json!([{"ip": "127.0.0.1", "port": "80"}]));

    let ids = harness
        .service
        .create_process_template_batch(
            &ctx(),
            CreateProcessTemplateBatchInput {
                service_template_id: 5,
                processes: vec![spec.clone()],
            },
        )
        .await
        .unwrap();

    let template = harness
        .service
        .get_process_template(&ctx(), ids[0])
        .await
        .unwrap();
    assert_eq!(template.property, spec.spec);
}
