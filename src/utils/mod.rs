pub(crate) mod domain;
pub(crate) mod html;
pub mod http;
pub mod names;
pub mod patterns;
