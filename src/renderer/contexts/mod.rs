pub mod resource_ctx;
