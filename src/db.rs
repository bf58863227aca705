pub mod backend;
pub use backend::{Backend, Query, Record};
pub mod pg_backend;
pub use pg_backend::PgBackend;
pub mod memory_backend;
pub use memory_backend::MemoryBackend;
pub mod repository;
pub use repository::{Coded, Entity, Repository, Scoped};
pub mod code_generator;
pub use code_generator::CodeGenerator;
