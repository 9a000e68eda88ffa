//! cs-aws: AWS SDK adapter for cloudstash
//!
//! This crate provides the implementation of the ObjectStore trait using
//! aws-sdk-s3, and of the InstanceService trait using aws-sdk-ec2. It is the
//! only crate that directly depends on the AWS SDK.

pub mod client;
pub mod ec2;
mod error;

pub use client::S3Client;
pub use ec2::Ec2Client;
