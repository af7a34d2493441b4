//! tests/mod.rs
//! Pruebas unitarias. Base SQLite en memoria con las migraciones reales;
//! navegador y Telegram reemplazados por fakes.

mod support;

mod store_tests;
