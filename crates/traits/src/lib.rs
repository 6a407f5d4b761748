#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/kelp/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod backend;
pub use backend::Backend;

mod cache;
pub use cache::{Cache, CacheError};

mod head;
pub use head::HeadSource;
