pub mod postgres;

pub use postgres::PostgresAdapter;
