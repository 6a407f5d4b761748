#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/kelp/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod rpc;
pub use rpc::{RpcErrorPayload, RpcRequest, RpcResponse};

mod error;
pub use error::{KelpError, error_codes};

pub mod hex;
