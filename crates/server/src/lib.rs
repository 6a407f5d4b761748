#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/kelp/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod pipeline;
pub use pipeline::Pipeline;

mod http;
pub use http::{AppState, RpcPacket, create_router, handle_rpc, health_check};
