pub mod audit_service;
pub use audit_service::AuditService;
pub mod document_service;
pub use document_service::DocumentService;
pub mod identity;
pub mod saga;
pub mod user_service;
pub use user_service::UserService;
