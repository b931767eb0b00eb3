use std::borrow::Cow;
use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use rag_core::services::ServiceError;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

pub fn map_service_err(err: &ServiceError) -> ErrorData {
    mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string())
}
