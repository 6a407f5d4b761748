#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/kelp/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod memory;
pub use memory::MemoryCache;

mod redis;
pub use redis::RedisCache;

mod store;
pub use store::CacheStore;

mod rpc_cache;
pub use rpc_cache::{CachePolicy, RpcCache};
