pub mod memory_db;
