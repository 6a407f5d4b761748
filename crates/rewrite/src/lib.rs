#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/kelp/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod context;
pub use context::RewriteContext;

mod error;
pub use error::RewriteError;

mod resolve;
pub use resolve::{resolve_block_ref, resolve_tag};

mod rewrite;
pub use rewrite::{
    ParamRewrite, RewriteOutcome, rewrite_descriptor, rewrite_request, rewrite_response,
    rewrite_tags,
};
