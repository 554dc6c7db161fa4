// AWS service clients
//
// SigV4-signed reqwest clients for the two managed services the pipeline
// uses:
// - ComprehendClassifier: DetectSentiment over the JSON 1.1 protocol
// - S3Archive: PutObject / ListObjectsV2 / HeadBucket for the text archive
//
// Both implement core traits, so nothing above this crate sees AWS types.
// AwsConfig::from_env reads the standard AWS variables plus an endpoint
// override for local stacks.

pub mod comprehend;
pub mod config;
pub mod s3;
pub mod sigv4;

pub use comprehend::ComprehendClassifier;
pub use config::AwsConfig;
pub use s3::S3Archive;
