pub mod campaign;
pub mod export;
pub mod persistence;
pub mod storage;
