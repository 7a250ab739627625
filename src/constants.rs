//! # System Constants
//!
//! Collection names, well-known field names and report selectors shared by the
//! template gateway and the statistics engine.

/// Page limit sentinel meaning "no limit"
pub const NO_LIMIT: u64 = 999_999_999;

/// Metadata label holding the owning business id
pub const BIZ_ID_LABEL: &str = "bk_biz_id";

/// Document collections
pub mod collections {
    pub const HOST_BASE: &str = "cc_HostBase";
    pub const OBJECT_BASE: &str = "cc_ObjectBase";
    pub const MODULE_HOST_CONFIG: &str = "cc_ModuleHostConfig";
    pub const PROCESS_TEMPLATE: &str = "cc_ProcessTemplate";
}

/// Well-known document fields
pub mod fields {
    pub const BK_BIZ_ID: &str = "bk_biz_id";
    pub const BK_OBJ_ID: &str = "bk_obj_id";
    pub const BK_CLOUD_ID: &str = "bk_cloud_id";
    pub const BK_OS_TYPE: &str = "bk_os_type";

    /// Group key emitted by a group stage
    pub const GROUP_ID: &str = "_id";
    /// Accumulator emitted by a count stage
    pub const COUNT: &str = "count";
}

/// Report type selectors as they arrive on the wire
pub mod report_selectors {
    pub const HOST_CLOUD_CHART: &str = "host_cloud_chart";
    pub const HOST_BIZ_CHART: &str = "host_biz_chart";
    pub const HOST_OS_CHART: &str = "host_os_chart";
    pub const MODEL_INSTANCE: &str = "model_instance";
}
