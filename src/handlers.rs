pub mod audit;
pub mod documents;
pub mod resource;
pub mod users;
