mod client;
mod response;

pub use client::{DetectionClient, RawResponse, UploadedFile};
pub use response::decode_body;
