pub mod nord_pool;
