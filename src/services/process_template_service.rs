use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::auth::{AuthAction, Authorizer, CapabilityGate};
use crate::constants::collections;
use crate::context::{BizIdResolver, LabelBizIdResolver, RequestContext};
use crate::error::{CmdbError, Result};
use crate::logging::log_template_operation;
use crate::models::{
    CreateProcessTemplateBatchInput, DeleteProcessTemplateBatchInput,
    ListProcessTemplateWithServiceTemplateInput, ListProcessTemplatesOption, NewProcessTemplate,
    ProcessTemplate, ProcessTemplatePage, UpdateProcessTemplateInput,
};
use crate::query_builder::BasePage;
use crate::store::{ProcessTemplateStore, StoreError};

/// Mutation gateway for process templates
///
/// Every write resolves the owning service templates, authorizes the caller
/// for `update` over them, and only then touches the store. Reads are scoped
/// by business id only.
///
/// Batch writes are not transactional: a batch create that fails part way
/// leaves the templates created before the failure in place.
#[derive(Clone)]
pub struct ProcessTemplateService {
    store: Arc<dyn ProcessTemplateStore>,
    gate: CapabilityGate,
    biz_resolver: Arc<dyn BizIdResolver>,
}

impl ProcessTemplateService {
    /// Create new process template service
    pub fn new(store: Arc<dyn ProcessTemplateStore>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            store,
            gate: CapabilityGate::new(authorizer),
            biz_resolver: Arc::new(LabelBizIdResolver),
        }
    }

    /// Replace the business id resolver
    pub fn with_biz_resolver(mut self, biz_resolver: Arc<dyn BizIdResolver>) -> Self {
        self.biz_resolver = biz_resolver;
        self
    }

    fn business_id(&self, ctx: &RequestContext, operation: &str) -> Result<i64> {
        self.biz_resolver.resolve(&ctx.metadata).map_err(|reason| {
            debug!(
                request_id = %ctx.request_id,
                operation = operation,
                reason = %reason,
                "Business id not resolvable"
            );
            CmdbError::input_invalid(operation, format!("get business id failed: {reason}"))
        })
    }

    /// Owning service template of every listed template, in listing order.
    ///
    /// Every requested id must resolve inside the caller's business; an id
    /// that does not is reported as `NotFound` before anything is authorized.
    async fn owning_service_templates(
        &self,
        ctx: &RequestContext,
        business_id: i64,
        template_ids: &[i64],
    ) -> Result<Vec<i64>> {
        let option = ListProcessTemplatesOption {
            business_id,
            service_template_id: None,
            process_template_ids: Some(template_ids.to_vec()),
            page: BasePage::unbounded(),
        };

        let templates = ctx
            .run(
                "list_process_templates",
                self.store.list_process_templates(&option),
            )
            .await??;

        debug!(
            request_id = %ctx.request_id,
            bk_biz_id = business_id,
            requested = template_ids.len(),
            found = templates.info.len(),
            "Resolved owning service templates"
        );

        let found: HashSet<i64> = templates.info.iter().map(|template| template.id).collect();
        if let Some(missing) = template_ids.iter().copied().find(|id| !found.contains(id)) {
            warn!(
                request_id = %ctx.request_id,
                bk_biz_id = business_id,
                process_template_id = missing,
                "Process template not found in business"
            );
            return Err(StoreError::NotFound {
                collection: collections::PROCESS_TEMPLATE.to_string(),
                id: missing,
            }
            .into());
        }

        Ok(templates
            .info
            .iter()
            .map(|template| template.service_template_id)
            .collect())
    }

    /// Create one template per spec under a single service template.
    ///
    /// Specs are persisted sequentially. The first store failure aborts the
    /// batch and is returned as is; templates persisted before it remain.
    pub async fn create_process_template_batch(
        &self,
        ctx: &RequestContext,
        input: CreateProcessTemplateBatchInput,
    ) -> Result<Vec<i64>> {
        const OPERATION: &str = "create_process_template_batch";
        let business_id = self.business_id(ctx, OPERATION)?;
        let service_template_id = input.service_template_id;

        self.gate
            .authorize_resolved(ctx, AuthAction::Update, || async move {
                Ok(vec![service_template_id])
            })
            .await?;

        let mut ids = Vec::with_capacity(input.processes.len());
        for (position, process) in input.processes.into_iter().enumerate() {
            let template = NewProcessTemplate {
                bk_biz_id: business_id,
                service_template_id,
                property: process.spec,
                creator: ctx.user.clone(),
                bk_supplier_account: ctx.supplier_account.clone(),
            };

            let created = ctx
                .run(
                    "create_process_template",
                    self.store.create_process_template(template),
                )
                .await?
                .map_err(|err| {
                    error!(
                        request_id = %ctx.request_id,
                        bk_biz_id = business_id,
                        service_template_id = service_template_id,
                        position = position,
                        committed = ids.len(),
                        error = %err,
                        "Create process template failed"
                    );
                    CmdbError::from(err)
                })?;

            ids.push(created.id);
        }

        log_template_operation(
            OPERATION,
            business_id,
            Some(service_template_id),
            "success",
            Some(&format!("created {}", ids.len())),
        );
        Ok(ids)
    }

    /// Delete templates after authorizing `update` over all of their owners.
    ///
    /// Lookup, authorization and deletion are strictly ordered; nothing is
    /// deleted unless every id belongs to the caller's business and
    /// authorization passes.
    pub async fn delete_process_template_batch(
        &self,
        ctx: &RequestContext,
        input: DeleteProcessTemplateBatchInput,
    ) -> Result<()> {
        const OPERATION: &str = "delete_process_template_batch";
        let business_id = self.business_id(ctx, OPERATION)?;
        let template_ids = input.process_templates;

        let owners = self
            .gate
            .authorize_resolved(ctx, AuthAction::Update, || {
                self.owning_service_templates(ctx, business_id, &template_ids)
            })
            .await?;

        ctx.run(
            "delete_process_template_batch",
            self.store.delete_process_template_batch(&template_ids),
        )
        .await?
        .map_err(|err| {
            error!(
                request_id = %ctx.request_id,
                bk_biz_id = business_id,
                process_template_ids = ?template_ids,
                error = %err,
                "Delete process template batch failed"
            );
            CmdbError::from(err)
        })?;

        log_template_operation(
            OPERATION,
            business_id,
            None,
            "success",
            Some(&format!(
                "deleted {:?} owned by service templates {:?}",
                template_ids, owners
            )),
        );
        Ok(())
    }

    /// Update the property of one template and return the stored result
    pub async fn update_process_template(
        &self,
        ctx: &RequestContext,
        input: UpdateProcessTemplateInput,
    ) -> Result<ProcessTemplate> {
        const OPERATION: &str = "update_process_template";
        let business_id = self.business_id(ctx, OPERATION)?;

        let template_id = input.process_template_id;
        let property = match input.process_property {
            Some(property) if template_id > 0 => property,
            _ => {
                return Err(CmdbError::input_invalid(
                    OPERATION,
                    format!(
                        "process template id must be positive and property present, got id {template_id}"
                    ),
                ))
            }
        };

        let lookup_ids = [template_id];
        let owners = self
            .gate
            .authorize_resolved(ctx, AuthAction::Update, || {
                self.owning_service_templates(ctx, business_id, &lookup_ids)
            })
            .await?;

        let updated = ctx
            .run(
                "update_process_template",
                self.store
                    .update_process_template(template_id, property, &ctx.user),
            )
            .await?
            .map_err(|err| {
                error!(
                    request_id = %ctx.request_id,
                    bk_biz_id = business_id,
                    process_template_id = template_id,
                    error = %err,
                    "Update process template failed"
                );
                CmdbError::from(err)
            })?;

        log_template_operation(
            OPERATION,
            business_id,
            owners.first().copied(),
            "success",
            Some(&format!("updated {template_id}")),
        );
        Ok(updated)
    }

    /// Fetch one template. Not gated by authorization.
    pub async fn get_process_template(
        &self,
        ctx: &RequestContext,
        template_id: i64,
    ) -> Result<ProcessTemplate> {
        const OPERATION: &str = "get_process_template";
        self.business_id(ctx, OPERATION)?;

        if template_id <= 0 {
            return Err(CmdbError::input_invalid(
                OPERATION,
                format!("invalid process template id {template_id}"),
            ));
        }

        let template = ctx
            .run(
                "get_process_template",
                self.store.get_process_template(template_id),
            )
            .await??;
        Ok(template)
    }

    /// List templates of the caller's business. Not gated by authorization.
    pub async fn list_process_templates(
        &self,
        ctx: &RequestContext,
        input: ListProcessTemplateWithServiceTemplateInput,
    ) -> Result<ProcessTemplatePage> {
        const OPERATION: &str = "list_process_templates";
        let business_id = self.business_id(ctx, OPERATION)?;

        let option = ListProcessTemplatesOption {
            business_id,
            service_template_id: input.service_template_id,
            process_template_ids: input.process_template_ids,
            page: input.page,
        };

        let page = ctx
            .run(
                "list_process_templates",
                self.store.list_process_templates(&option),
            )
            .await??;

        debug!(
            request_id = %ctx.request_id,
            bk_biz_id = business_id,
            count = page.count,
            returned = page.info.len(),
            "Listed process templates"
        );
        Ok(page)
    }
}
