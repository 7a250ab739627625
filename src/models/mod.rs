pub mod process_template;
pub mod statistics;

// Re-export models for easy access
pub use process_template::{
    CreateProcessTemplateBatchInput, DeleteProcessTemplateBatchInput,
    ListProcessTemplateWithServiceTemplateInput, ListProcessTemplatesOption, NewProcessTemplate,
    ProcessProperty, ProcessTemplate, ProcessTemplatePage, ProcessTemplateSpec,
    UpdateProcessTemplateInput,
};
pub use statistics::StringIdCount;
