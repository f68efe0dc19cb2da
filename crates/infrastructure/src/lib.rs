pub mod database;

pub use database::postgres::PostgresTaskRepository;
