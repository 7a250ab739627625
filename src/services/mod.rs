pub mod process_template_service;

pub use process_template_service::ProcessTemplateService;
